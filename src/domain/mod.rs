pub mod command;
pub mod countdown;
pub mod input;
pub mod terminal;
pub mod writer;
