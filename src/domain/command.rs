/// Command resolver: classifies a submitted line.
///
/// Priority order (first match wins):
///   1. quit token        → `Outcome::Quit`
///   2. help token        → `Outcome::Help` (next help string, if any)
///   3. any non-digit     → `Outcome::Malformed`
///   4. digits only       → code check: `Success` or `WrongCode`
///
/// The resolver never touches the attempts counter; applying a wrong code
/// is the game's job.

use crate::config::{MessageConfig, PuzzleConfig, TerminalConfig};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Quit,
    /// `None` once the help list is used up and no exhausted message is set.
    Help(Option<String>),
    /// Carries the full "command not found" message.
    Malformed(String),
    Success,
    WrongCode,
}

pub struct CommandResolver {
    activation_code: String,
    quit_token: String,
    help_token: String,
    help_messages: Vec<String>,
    help_exhausted: Option<String>,
    /// Never exceeds `help_messages.len()`.
    help_cursor: usize,
}

impl CommandResolver {
    pub fn new(puzzle: &PuzzleConfig, terminal: &TerminalConfig, messages: &MessageConfig) -> Self {
        CommandResolver {
            activation_code: puzzle.activation_code.clone(),
            quit_token: terminal.quit_token.clone(),
            help_token: terminal.help_token.clone(),
            help_messages: messages.help.clone(),
            help_exhausted: messages.help_exhausted.clone(),
            help_cursor: 0,
        }
    }

    pub fn help_cursor(&self) -> usize {
        self.help_cursor
    }

    pub fn resolve(&mut self, line: &str) -> Outcome {
        if line == self.quit_token {
            return Outcome::Quit;
        }
        if line == self.help_token {
            return Outcome::Help(self.next_help());
        }
        if !line.chars().all(|c| c.is_ascii_digit()) {
            return Outcome::Malformed(format!("{line}: command not found"));
        }
        if line == self.activation_code {
            Outcome::Success
        } else {
            Outcome::WrongCode
        }
    }

    fn next_help(&mut self) -> Option<String> {
        match self.help_messages.get(self.help_cursor) {
            Some(msg) => {
                self.help_cursor += 1;
                Some(msg.clone())
            }
            None => self.help_exhausted.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn resolver_with(help: &[&str], exhausted: Option<&str>) -> CommandResolver {
        let mut cfg = GameConfig::default();
        cfg.puzzle.activation_code = "4158193".into();
        cfg.terminal.help_token = "aiuto".into();
        cfg.terminal.quit_token = "puppa".into();
        cfg.messages.help = help.iter().map(|s| s.to_string()).collect();
        cfg.messages.help_exhausted = exhausted.map(str::to_string);
        CommandResolver::new(&cfg.puzzle, &cfg.terminal, &cfg.messages)
    }

    fn resolver() -> CommandResolver {
        resolver_with(&["first", "second"], None)
    }

    #[test]
    fn quit_token_wins() {
        assert_eq!(resolver().resolve("puppa"), Outcome::Quit);
    }

    #[test]
    fn help_walks_the_list_then_goes_silent() {
        let mut r = resolver();
        assert_eq!(r.resolve("aiuto"), Outcome::Help(Some("first".into())));
        assert_eq!(r.help_cursor(), 1);
        assert_eq!(r.resolve("aiuto"), Outcome::Help(Some("second".into())));
        assert_eq!(r.resolve("aiuto"), Outcome::Help(None));
        assert_eq!(r.resolve("aiuto"), Outcome::Help(None));
        assert_eq!(r.help_cursor(), 2);
    }

    #[test]
    fn exhausted_message_repeats_without_moving_cursor() {
        let mut r = resolver_with(&["only"], Some("no more"));
        r.resolve("aiuto");
        assert_eq!(r.resolve("aiuto"), Outcome::Help(Some("no more".into())));
        assert_eq!(r.resolve("aiuto"), Outcome::Help(Some("no more".into())));
        assert_eq!(r.help_cursor(), 1);
    }

    #[test]
    fn mixed_line_is_malformed() {
        assert_eq!(
            resolver().resolve("12a3"),
            Outcome::Malformed("12a3: command not found".into()),
        );
    }

    #[test]
    fn token_lookalikes_are_malformed() {
        assert!(matches!(resolver().resolve("Puppa"), Outcome::Malformed(_)));
        assert!(matches!(resolver().resolve("aiuto "), Outcome::Malformed(_)));
    }

    #[test]
    fn code_check_is_exact() {
        let mut r = resolver();
        assert_eq!(r.resolve("4158193"), Outcome::Success);
        assert_eq!(r.resolve("0000000"), Outcome::WrongCode);
        assert_eq!(r.resolve("415819"), Outcome::WrongCode);
        assert_eq!(r.resolve("04158193"), Outcome::WrongCode);
    }
}
