/// Events emitted by the game for each operation.
/// The presentation layer consumes these for sound and host signaling.

use super::game::GameEnding;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    ConsoleOpened,
    CharEchoed(char),
    CharRemoved,
    LineSubmitted(String),
    HelpShown { cursor: usize },
    CommandNotFound(String),
    WrongCode { attempts_remaining: u32 },
    TimerTick(u32),
    Ended(GameEnding),
    QuitRequested,
}
