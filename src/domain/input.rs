/// Input interpreter: raw key events → code-entry actions.
///
/// Owns the code buffer. Everything it decides is returned as an
/// `InputAction`; echoing and prompting are left to the caller, which
/// routes them through the SlowWriter.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

/// Fixed console prompt.
pub const PROMPT: &str = "$ ";

/// Prompt width in columns. Backspace never erases at or left of this.
pub const PROMPT_WIDTH: usize = 2;

/// Navigation keys that are never treated as printable.
const RESERVED_KEYS: &[KeyCode] = &[
    KeyCode::Up,
    KeyCode::Down,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Tab,
    KeyCode::BackTab,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyClass {
    Enter,
    Backspace,
    Printable(char),
    Ignored,
}

/// Classify a key event. Printable means: no alt/ctrl/super/meta held,
/// not a reserved navigation key, and a character key.
pub fn classify(key: &KeyEvent) -> KeyClass {
    match key.code {
        KeyCode::Enter => KeyClass::Enter,
        KeyCode::Backspace => KeyClass::Backspace,
        code if RESERVED_KEYS.contains(&code) => KeyClass::Ignored,
        KeyCode::Char(c) if !has_blocking_modifier(key.modifiers) && !c.is_control() => {
            KeyClass::Printable(c)
        }
        _ => KeyClass::Ignored,
    }
}

fn has_blocking_modifier(mods: KeyModifiers) -> bool {
    mods.intersects(
        KeyModifiers::ALT | KeyModifiers::CONTROL | KeyModifiers::SUPER | KeyModifiers::META,
    )
}

// ── Code buffer ──

/// Editable single-line buffer, bounded in characters.
#[derive(Clone, Debug)]
pub struct CodeBuffer {
    chars: Vec<char>,
    max_len: usize,
}

impl CodeBuffer {
    pub fn new(max_len: usize) -> Self {
        CodeBuffer { chars: Vec::with_capacity(max_len), max_len }
    }

    /// Append if there is room. Returns false when full.
    pub fn push(&mut self, ch: char) -> bool {
        if self.is_full() {
            return false;
        }
        self.chars.push(ch);
        true
    }

    pub fn pop(&mut self) -> Option<char> {
        self.chars.pop()
    }

    /// Take the content out, leaving the buffer empty.
    pub fn take(&mut self) -> String {
        self.chars.drain(..).collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.chars.len() >= self.max_len
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    #[cfg(test)]
    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }
}

// ── Interpreter ──

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputAction {
    /// Nothing changed, nothing to echo.
    Ignored,
    /// Character accepted into the buffer; echo it.
    Appended(char),
    /// Backspace. `erase` asks for a visual `"\b \b"`.
    Removed { erase: bool },
    /// Enter on a non-empty buffer. The buffer has been cleared.
    Submitted(String),
    /// Enter on an empty buffer: re-prompt only.
    EmptyLine,
}

pub struct InputInterpreter {
    buffer: CodeBuffer,
}

impl InputInterpreter {
    pub fn new(max_len: usize) -> Self {
        InputInterpreter { buffer: CodeBuffer::new(max_len) }
    }

    #[cfg(test)]
    pub fn buffer(&self) -> &CodeBuffer {
        &self.buffer
    }

    /// Interpret one key.
    ///
    /// `cursor_col` is where the cursor will sit once all queued output is
    /// drawn; it only decides whether a backspace may erase on screen.
    pub fn on_key(&mut self, key: &KeyEvent, locked: bool, cursor_col: usize) -> InputAction {
        let class = classify(key);
        if locked {
            trace!(?class, "key ignored: terminal locked");
            return InputAction::Ignored;
        }

        match class {
            KeyClass::Enter => {
                if self.buffer.is_empty() {
                    InputAction::EmptyLine
                } else {
                    InputAction::Submitted(self.buffer.take())
                }
            }
            KeyClass::Backspace => {
                let removed = self.buffer.pop().is_some();
                let erase = cursor_col > PROMPT_WIDTH;
                if removed || erase {
                    InputAction::Removed { erase }
                } else {
                    InputAction::Ignored
                }
            }
            KeyClass::Printable(c) => {
                if self.buffer.push(c) {
                    InputAction::Appended(c)
                } else {
                    trace!(max = self.buffer.max_len(), "key ignored: buffer full");
                    InputAction::Ignored
                }
            }
            KeyClass::Ignored => {
                trace!(code = ?key.code, "key ignored");
                InputAction::Ignored
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ch(c: char) -> KeyEvent {
        key(KeyCode::Char(c))
    }

    fn type_str(ii: &mut InputInterpreter, s: &str) {
        for c in s.chars() {
            ii.on_key(&ch(c), false, PROMPT_WIDTH + ii.buffer().len());
        }
    }

    // ── classify ──

    #[test]
    fn plain_and_shifted_chars_are_printable() {
        assert_eq!(classify(&ch('7')), KeyClass::Printable('7'));
        let shifted = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(classify(&shifted), KeyClass::Printable('A'));
    }

    #[test]
    fn modifier_chords_are_not_printable() {
        for m in [KeyModifiers::ALT, KeyModifiers::CONTROL, KeyModifiers::SUPER, KeyModifiers::META] {
            assert_eq!(classify(&KeyEvent::new(KeyCode::Char('c'), m)), KeyClass::Ignored);
        }
    }

    #[test]
    fn navigation_keys_are_reserved() {
        for code in RESERVED_KEYS {
            assert_eq!(classify(&key(*code)), KeyClass::Ignored);
        }
        assert_eq!(classify(&key(KeyCode::F(1))), KeyClass::Ignored);
    }

    // ── buffer editing ──

    #[test]
    fn printable_appends_and_echoes() {
        let mut ii = InputInterpreter::new(7);
        assert_eq!(ii.on_key(&ch('4'), false, 2), InputAction::Appended('4'));
        assert_eq!(ii.buffer().text(), "4");
    }

    #[test]
    fn buffer_never_exceeds_max() {
        let mut ii = InputInterpreter::new(3);
        type_str(&mut ii, "12345678");
        assert_eq!(ii.buffer().len(), 3);
        assert_eq!(ii.on_key(&ch('9'), false, 5), InputAction::Ignored);
        assert_eq!(ii.buffer().text(), "123");
    }

    #[test]
    fn enter_submits_and_clears() {
        let mut ii = InputInterpreter::new(7);
        type_str(&mut ii, "0000");
        let action = ii.on_key(&key(KeyCode::Enter), false, 6);
        assert_eq!(action, InputAction::Submitted("0000".into()));
        assert!(ii.buffer().is_empty());
    }

    #[test]
    fn enter_on_empty_buffer_only_reprompts() {
        let mut ii = InputInterpreter::new(7);
        assert_eq!(ii.on_key(&key(KeyCode::Enter), false, 2), InputAction::EmptyLine);
    }

    #[test]
    fn backspace_removes_last_and_erases_past_prompt() {
        let mut ii = InputInterpreter::new(7);
        type_str(&mut ii, "12");
        let action = ii.on_key(&key(KeyCode::Backspace), false, 4);
        assert_eq!(action, InputAction::Removed { erase: true });
        assert_eq!(ii.buffer().text(), "1");
    }

    #[test]
    fn backspace_never_erases_the_prompt() {
        let mut ii = InputInterpreter::new(7);
        type_str(&mut ii, "1");
        // cursor right after the prompt
        let action = ii.on_key(&key(KeyCode::Backspace), false, PROMPT_WIDTH);
        assert_eq!(action, InputAction::Removed { erase: false });
        assert!(ii.buffer().is_empty());
        assert_eq!(ii.on_key(&key(KeyCode::Backspace), false, PROMPT_WIDTH), InputAction::Ignored);
    }

    #[test]
    fn erase_follows_column_not_buffer() {
        let mut ii = InputInterpreter::new(7);
        let action = ii.on_key(&key(KeyCode::Backspace), false, 5);
        assert_eq!(action, InputAction::Removed { erase: true });
    }

    #[test]
    fn locked_ignores_everything() {
        let mut ii = InputInterpreter::new(7);
        type_str(&mut ii, "12");
        for k in [ch('3'), key(KeyCode::Backspace), key(KeyCode::Enter)] {
            assert_eq!(ii.on_key(&k, true, 4), InputAction::Ignored);
        }
        assert_eq!(ii.buffer().text(), "12");
    }
}
