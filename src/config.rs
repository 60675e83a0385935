/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to the stock puzzle if the file is missing, incomplete,
/// unparsable or describes a puzzle that cannot be played.

use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, warn};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub puzzle: PuzzleConfig,
    pub terminal: TerminalConfig,
    pub messages: MessageConfig,
    pub intro: IntroConfig,
    pub general: GeneralConfig,
}

#[derive(Clone, Debug)]
pub struct PuzzleConfig {
    pub activation_code: String,
    pub max_code_length: usize,
    pub attempts: u32,
    pub countdown_seconds: u32,
}

#[derive(Clone, Debug)]
pub struct TerminalConfig {
    pub writer_delay_ms: u64,
    pub quit_token: String,
    pub help_token: String,
}

#[derive(Clone, Debug)]
pub struct MessageConfig {
    pub boot: Vec<String>,
    pub instructions: String,
    pub help: Vec<String>,
    pub help_exhausted: Option<String>, // None: stay silent once help runs out
    pub success: String,
    pub out_of_attempts: String,
    pub timeout: String,
    pub wrong_code: String,
}

#[derive(Clone, Debug)]
pub struct IntroConfig {
    pub lines: Vec<String>,
    pub duration_ms: u64,
    pub skippable: bool,
}

#[derive(Clone, Debug)]
pub struct GeneralConfig {
    pub ctrl_c_exits: bool,
    pub sound: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("activation code must be a non-empty string of digits, got {0:?}")]
    ActivationCode(String),

    #[error("activation code has {len} digits but max_code_length is {max}")]
    CodeTooLong { len: usize, max: usize },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{0} must not be empty")]
    EmptyToken(&'static str),

    #[error("{name} has {len} characters but max_code_length is {max}")]
    TokenTooLong { name: &'static str, len: usize, max: usize },

    #[error("{0} must not be all digits")]
    NumericToken(&'static str),

    #[error("quit_token and help_token must differ")]
    TokenClash,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    puzzle: TomlPuzzle,
    #[serde(default)]
    terminal: TomlTerminal,
    #[serde(default)]
    messages: TomlMessages,
    #[serde(default)]
    intro: TomlIntro,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlPuzzle {
    #[serde(default = "default_activation_code")]
    activation_code: String,
    #[serde(default = "default_max_code_length")]
    max_code_length: usize,
    #[serde(default = "default_attempts")]
    attempts: u32,
    #[serde(default = "default_countdown")]
    countdown_seconds: u32,
}

#[derive(Deserialize, Debug)]
struct TomlTerminal {
    #[serde(default = "default_writer_delay")]
    writer_delay_ms: u64,
    #[serde(default = "default_quit_token")]
    quit_token: String,
    #[serde(default = "default_help_token")]
    help_token: String,
}

#[derive(Deserialize, Debug)]
struct TomlMessages {
    #[serde(default = "default_boot")]
    boot: Vec<String>,
    #[serde(default = "default_instructions")]
    instructions: String,
    #[serde(default = "default_help")]
    help: Vec<String>,
    #[serde(default)]
    help_exhausted: String,
    #[serde(default = "default_success")]
    success: String,
    #[serde(default = "default_out_of_attempts")]
    out_of_attempts: String,
    #[serde(default = "default_timeout")]
    timeout: String,
    #[serde(default = "default_wrong_code")]
    wrong_code: String,
}

#[derive(Deserialize, Debug)]
struct TomlIntro {
    #[serde(default = "default_intro_lines")]
    lines: Vec<String>,
    #[serde(default = "default_intro_duration")]
    duration_ms: u64,
    #[serde(default = "default_true")]
    skippable: bool,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    ctrl_c_exits: bool,
    #[serde(default = "default_true")]
    sound: bool,
}

// ── Defaults ──

fn default_activation_code() -> String { "1234567".into() }
fn default_max_code_length() -> usize { 7 }
fn default_attempts() -> u32 { 3 }
fn default_countdown() -> u32 { 120 }

fn default_writer_delay() -> u64 { 30 }
fn default_quit_token() -> String { "puppa".into() }
fn default_help_token() -> String { "help".into() }

fn default_boot() -> Vec<String> {
    vec![
        "remote: Reusing existing pack: 1857, done.".into(),
        "remote: Total 1857 (delta 0), reused 0 (delta 0)".into(),
        "Receiving objects: 100% (1857/1857), 374.35 KiB | 268.00 KiB/s, done.".into(),
        "Resolving deltas: 100% (772/772), done.".into(),
        "Checking connectivity... done.".into(),
    ]
}
fn default_instructions() -> String { "Enter the activation code:".into() }
fn default_help() -> Vec<String> {
    vec![
        "Help message number 1".into(),
        "Help message number 2".into(),
        "Help message number 3".into(),
        "No more help messages, sorry".into(),
    ]
}
fn default_success() -> String { "You made it! The code was correct!!!".into() }
fn default_out_of_attempts() -> String { "No more attempts!".into() }
fn default_timeout() -> String { "Time is up! The system has been locked.".into() }
fn default_wrong_code() -> String { "Wrong activation code".into() }

fn default_intro_lines() -> Vec<String> {
    vec![
        "INCOMING TRANSMISSION".into(),
        "".into(),
        "The facility mainframe has been sealed.".into(),
        "Only the activation code can unlock it.".into(),
        "You have three attempts and very little time.".into(),
        "".into(),
        "Good luck.".into(),
    ]
}
fn default_intro_duration() -> u64 { 8_000 }
fn default_true() -> bool { true }

impl Default for TomlPuzzle {
    fn default() -> Self {
        TomlPuzzle {
            activation_code: default_activation_code(),
            max_code_length: default_max_code_length(),
            attempts: default_attempts(),
            countdown_seconds: default_countdown(),
        }
    }
}

impl Default for TomlTerminal {
    fn default() -> Self {
        TomlTerminal {
            writer_delay_ms: default_writer_delay(),
            quit_token: default_quit_token(),
            help_token: default_help_token(),
        }
    }
}

impl Default for TomlMessages {
    fn default() -> Self {
        TomlMessages {
            boot: default_boot(),
            instructions: default_instructions(),
            help: default_help(),
            help_exhausted: String::new(),
            success: default_success(),
            out_of_attempts: default_out_of_attempts(),
            timeout: default_timeout(),
            wrong_code: default_wrong_code(),
        }
    }
}

impl Default for TomlIntro {
    fn default() -> Self {
        TomlIntro {
            lines: default_intro_lines(),
            duration_ms: default_intro_duration(),
            skippable: true,
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { ctrl_c_exits: false, sound: true }
    }
}

impl From<TomlConfig> for GameConfig {
    fn from(t: TomlConfig) -> Self {
        let help_exhausted = Some(t.messages.help_exhausted).filter(|s| !s.is_empty());
        GameConfig {
            puzzle: PuzzleConfig {
                activation_code: t.puzzle.activation_code,
                max_code_length: t.puzzle.max_code_length,
                attempts: t.puzzle.attempts,
                countdown_seconds: t.puzzle.countdown_seconds,
            },
            terminal: TerminalConfig {
                writer_delay_ms: t.terminal.writer_delay_ms,
                quit_token: t.terminal.quit_token,
                help_token: t.terminal.help_token,
            },
            messages: MessageConfig {
                boot: t.messages.boot,
                instructions: t.messages.instructions,
                help: t.messages.help,
                help_exhausted,
                success: t.messages.success,
                out_of_attempts: t.messages.out_of_attempts,
                timeout: t.messages.timeout,
                wrong_code: t.messages.wrong_code,
            },
            intro: IntroConfig {
                lines: t.intro.lines,
                duration_ms: t.intro.duration_ms,
                skippable: t.intro.skippable,
            },
            general: GeneralConfig {
                ctrl_c_exits: t.general.ctrl_c_exits,
                sound: t.general.sound,
            },
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        TomlConfig::default().into()
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) ~/.local/share/escape-terminal.
    /// Any problem is logged and the stock puzzle is used instead.
    pub fn load() -> Self {
        for dir in candidate_dirs() {
            let path = dir.join("config.toml");
            if !path.exists() {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    return match Self::from_toml_str(&text) {
                        Ok(cfg) => {
                            info!(path = %path.display(), "config loaded");
                            cfg
                        }
                        Err(e) => {
                            warn!(path = %path.display(), error = %e, "using default settings");
                            GameConfig::default()
                        }
                    };
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not read config");
                }
            }
        }
        GameConfig::default()
    }

    /// Parse and validate a `config.toml` document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: GameConfig = toml::from_str::<TomlConfig>(text)?.into();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations the puzzle cannot be played with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.puzzle;
        if p.activation_code.is_empty() || !p.activation_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::ActivationCode(p.activation_code.clone()));
        }
        if p.max_code_length == 0 {
            return Err(ConfigError::Zero("max_code_length"));
        }
        let len = p.activation_code.chars().count();
        if len > p.max_code_length {
            return Err(ConfigError::CodeTooLong { len, max: p.max_code_length });
        }
        if p.attempts == 0 {
            return Err(ConfigError::Zero("attempts"));
        }
        if p.countdown_seconds == 0 {
            return Err(ConfigError::Zero("countdown_seconds"));
        }

        let t = &self.terminal;
        for (name, token) in [("quit_token", &t.quit_token), ("help_token", &t.help_token)] {
            if token.is_empty() {
                return Err(ConfigError::EmptyToken(name));
            }
            let len = token.chars().count();
            if len > p.max_code_length {
                return Err(ConfigError::TokenTooLong { name, len, max: p.max_code_length });
            }
            if token.chars().all(|c| c.is_ascii_digit()) {
                return Err(ConfigError::NumericToken(name));
            }
        }
        if t.quit_token == t.help_token {
            return Err(ConfigError::TokenClash);
        }
        Ok(())
    }
}

/// Candidate directories to search: exe dir + CWD + data home (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a linked binary still finds config next to the real one.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let data = PathBuf::from(&home).join(".local/share/escape-terminal");
        if data.is_dir() && !dirs.iter().any(|d| d == &data) {
            dirs.push(data);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = GameConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.puzzle.max_code_length, 7);
        assert_eq!(cfg.puzzle.attempts, 3);
        assert_eq!(cfg.messages.help.len(), 4);
        assert!(cfg.messages.help_exhausted.is_none());
    }

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.puzzle.activation_code, "1234567");
        assert_eq!(cfg.terminal.help_token, "help");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            r#"
            [puzzle]
            activation_code = "4158193"

            [terminal]
            help_token = "aiuto"

            [messages]
            help_exhausted = "Nothing left."
            "#,
        )
        .unwrap();
        assert_eq!(cfg.puzzle.activation_code, "4158193");
        assert_eq!(cfg.puzzle.countdown_seconds, 120);
        assert_eq!(cfg.terminal.help_token, "aiuto");
        assert_eq!(cfg.terminal.quit_token, "puppa");
        assert_eq!(cfg.messages.help_exhausted.as_deref(), Some("Nothing left."));
    }

    #[test]
    fn non_digit_code_is_rejected() {
        let err = GameConfig::from_toml_str("[puzzle]\nactivation_code = \"12a4\"").unwrap_err();
        assert!(matches!(err, ConfigError::ActivationCode(_)));
    }

    #[test]
    fn code_longer_than_buffer_is_rejected() {
        let err = GameConfig::from_toml_str(
            "[puzzle]\nactivation_code = \"123456789\"\nmax_code_length = 7",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::CodeTooLong { len: 9, max: 7 }));
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let err = GameConfig::from_toml_str("[puzzle]\nattempts = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Zero("attempts")));
    }

    #[test]
    fn clashing_tokens_are_rejected() {
        let err = GameConfig::from_toml_str(
            "[terminal]\nquit_token = \"x\"\nhelp_token = \"x\"",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::TokenClash));
    }

    #[test]
    fn untypeable_token_is_rejected() {
        let err = GameConfig::from_toml_str(
            "[terminal]\nhelp_token = \"assistance\"",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TokenTooLong { name: "help_token", len: 10, max: 7 }
        ));
    }

    #[test]
    fn numeric_token_is_rejected() {
        let err = GameConfig::from_toml_str("[terminal]\nquit_token = \"0000\"").unwrap_err();
        assert!(matches!(err, ConfigError::NumericToken("quit_token")));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = GameConfig::from_toml_str("[puzzle\nattempts = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
