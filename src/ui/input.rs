/// Keyboard event collector.
///
/// Drains every pending crossterm event without blocking and keeps the key
/// presses in arrival order. The game consumes them one at a time, each
/// processed to completion before the next.
///
/// Release events are dropped: a key counts once, when it goes down (or
/// auto-repeats).

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::warn;

pub struct InputState {
    /// Key presses collected during the most recent `drain_events()`.
    events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { events: Vec::with_capacity(8) }
    }

    /// Read all available terminal events. Call once per frame.
    pub fn drain_events(&mut self) {
        self.events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                    self.events.push(key);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "terminal event read failed");
                    break;
                }
            }
        }
    }

    /// Hand over this frame's key presses, oldest first.
    pub fn take_events(&mut self) -> Vec<KeyEvent> {
        std::mem::take(&mut self.events)
    }

    /// Check if any key this frame is Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.events.iter().any(is_ctrl_c)
    }
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
}

/// Keys that skip a skippable intro.
pub fn is_skip_key(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' '))
}
