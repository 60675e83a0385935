pub mod host;
pub mod input;
pub mod intro;
pub mod renderer;
pub mod sound;
