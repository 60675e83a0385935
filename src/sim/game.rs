/// Game: the state machine driving the terminal puzzle.
///
/// ## States
///
/// ```text
///   Intro ──intro_finished──▶ Console ──success / out of attempts / expiry──▶ ConsoleLocked
/// ```
///
/// Each transition is guarded and fires at most once; repeating a trigger
/// is a silent no-op. Once `ending` is Fail or Success it never changes and
/// the terminal stays locked.
///
/// ## Ownership
///   - attempts counter, lock and ending live here
///   - the code buffer lives in the `InputInterpreter`
///   - the help cursor lives in the `CommandResolver`
///   - everything visible goes through the `SlowWriter`
///
/// Every public operation reads the owned clock first, lets the writer and
/// the countdown catch up to that instant, applies its logic, then flushes
/// whatever became due. A line submitted after the countdown hit zero is
/// therefore never resolved.

use crossterm::event::KeyEvent;
use tracing::{debug, info, trace};

use crate::config::{GameConfig, MessageConfig};
use crate::domain::command::{CommandResolver, Outcome};
use crate::domain::countdown::{CountdownTimer, TimerEvent};
use crate::domain::input::{InputAction, InputInterpreter, PROMPT};
use crate::domain::terminal::TerminalView;
use crate::domain::writer::{Message, SlowWriter};
use super::clock::Clock;
use super::event::GameEvent;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    Intro,
    Console,
    ConsoleLocked,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEnding {
    None,
    Fail,
    Success,
}

/// Separator written before every game message.
const BREAK: &str = "\r\n\n";

/// Visual erase of the last echoed character.
const ERASE: &str = "\u{8} \u{8}";

pub struct Game<C: Clock> {
    clock: C,
    state: GameState,
    ending: GameEnding,
    attempts: u32,
    writer: SlowWriter<TerminalView>,
    input: InputInterpreter,
    resolver: CommandResolver,
    timer: CountdownTimer,
    messages: MessageConfig,
}

// ── Construction & queries ──

impl<C: Clock> Game<C> {
    pub fn new(config: &GameConfig, clock: C) -> Self {
        let mut writer = SlowWriter::new(config.terminal.writer_delay_ms);
        writer.subscribe(TerminalView::new());
        Game {
            clock,
            state: GameState::Intro,
            ending: GameEnding::None,
            attempts: config.puzzle.attempts,
            writer,
            input: InputInterpreter::new(config.puzzle.max_code_length),
            resolver: CommandResolver::new(&config.puzzle, &config.terminal, &config.messages),
            timer: CountdownTimer::new(config.puzzle.countdown_seconds),
            messages: config.messages.clone(),
        }
    }

    pub fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn ending(&self) -> GameEnding {
        self.ending
    }

    pub fn is_locked(&self) -> bool {
        self.ending != GameEnding::None
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn countdown(&self) -> &CountdownTimer {
        &self.timer
    }

    #[cfg(test)]
    pub fn input(&self) -> &InputInterpreter {
        &self.input
    }

    #[cfg(test)]
    pub fn help_cursor(&self) -> usize {
        self.resolver.help_cursor()
    }

    pub fn view(&self) -> Option<&TerminalView> {
        self.writer.sink()
    }

    pub fn is_output_idle(&self) -> bool {
        self.writer.is_idle()
    }
}

// ── Operations ──

impl<C: Clock> Game<C> {
    /// External "intro finished" signal. Opens the console once.
    pub fn intro_finished(&mut self) -> Vec<GameEvent> {
        if self.state != GameState::Intro {
            return vec![];
        }
        let mut events = Vec::new();
        let now = self.sync(&mut events);
        self.state = GameState::Console;
        info!(
            attempts = self.attempts,
            countdown = self.timer.remaining(),
            "intro finished, console opened"
        );

        events.push(GameEvent::ConsoleOpened);
        for ev in self.timer.start(now) {
            self.apply_timer(ev, &mut events);
        }

        if !self.messages.boot.is_empty() {
            let banner = format!("\n{}", self.messages.boot.join("\r\n"));
            self.writer.write(Message::new(&banner));
        }
        let instructions = self.messages.instructions.clone();
        self.say(&instructions);
        if !self.is_locked() {
            self.prompt();
        }

        self.flush(now);
        events
    }

    /// One key event, processed to completion.
    pub fn on_key(&mut self, key: &KeyEvent) -> Vec<GameEvent> {
        if self.state == GameState::Intro {
            trace!(code = ?key.code, "key ignored: intro playing");
            return vec![];
        }
        let mut events = Vec::new();
        let now = self.sync(&mut events);
        let col = self.projected_col();
        let locked = self.is_locked();

        match self.input.on_key(key, locked, col) {
            InputAction::Ignored => {}
            InputAction::Appended(c) => {
                self.writer.write(Message::instant(c.encode_utf8(&mut [0; 4])));
                events.push(GameEvent::CharEchoed(c));
            }
            InputAction::Removed { erase } => {
                if erase {
                    self.writer.write(Message::instant(ERASE));
                }
                events.push(GameEvent::CharRemoved);
            }
            InputAction::EmptyLine => self.prompt(),
            InputAction::Submitted(line) => {
                events.push(GameEvent::LineSubmitted(line.clone()));
                let outcome = self.resolver.resolve(&line);
                self.apply_outcome(outcome, &line, &mut events);
                if !self.is_locked() {
                    self.prompt();
                }
            }
        }

        self.flush(now);
        events
    }

    /// Drive the countdown and the writer up to the current time.
    pub fn advance(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let now = self.sync(&mut events);
        self.flush(now);
        events
    }
}

// ── Internals ──

impl<C: Clock> Game<C> {
    fn apply_outcome(&mut self, outcome: Outcome, line: &str, events: &mut Vec<GameEvent>) {
        match outcome {
            Outcome::Quit => {
                info!("quit token entered");
                events.push(GameEvent::QuitRequested);
            }
            Outcome::Help(Some(text)) => {
                let cursor = self.resolver.help_cursor();
                debug!(cursor, "help shown");
                self.say(&text);
                events.push(GameEvent::HelpShown { cursor });
            }
            Outcome::Help(None) => debug!("help exhausted"),
            Outcome::Malformed(text) => {
                debug!(line, "command not found");
                self.say(&text);
                events.push(GameEvent::CommandNotFound(line.to_string()));
            }
            Outcome::Success => {
                let text = self.messages.success.clone();
                self.lock(GameEnding::Success, &text, events);
            }
            Outcome::WrongCode => {
                self.attempts = self.attempts.saturating_sub(1);
                debug!(attempts = self.attempts, "wrong code");
                events.push(GameEvent::WrongCode { attempts_remaining: self.attempts });
                if self.attempts > 0 {
                    let plural = if self.attempts == 1 { "" } else { "s" };
                    let text = format!(
                        "{}\r\n{} attempt{plural} remaining",
                        self.messages.wrong_code, self.attempts,
                    );
                    self.say(&text);
                } else {
                    let text = self.messages.out_of_attempts.clone();
                    self.lock(GameEnding::Fail, &text, events);
                }
            }
        }
    }

    fn apply_timer(&mut self, ev: TimerEvent, events: &mut Vec<GameEvent>) {
        match ev {
            TimerEvent::Tick(remaining) => {
                trace!(remaining, "countdown tick");
                events.push(GameEvent::TimerTick(remaining));
            }
            TimerEvent::Expired => {
                info!("countdown expired");
                let text = self.messages.timeout.clone();
                self.lock(GameEnding::Fail, &text, events);
            }
        }
    }

    /// Console → ConsoleLocked. Only the first call has any effect.
    fn lock(&mut self, ending: GameEnding, text: &str, events: &mut Vec<GameEvent>) {
        if self.state != GameState::Console || self.is_locked() || ending == GameEnding::None {
            return;
        }
        self.state = GameState::ConsoleLocked;
        self.ending = ending;
        self.timer.stop();
        info!(
            ?ending,
            remaining = self.timer.remaining(),
            attempts = self.attempts,
            "terminal locked"
        );
        self.say(text);
        events.push(GameEvent::Ended(ending));
    }

    fn say(&mut self, text: &str) {
        self.writer.write(Message::new(&format!("{BREAK}{text}")));
    }

    fn prompt(&mut self) {
        self.writer.write(Message::new(&format!("{BREAK}{PROMPT}")));
    }

    /// Read the clock and let the writer and the countdown catch up to it.
    fn sync(&mut self, events: &mut Vec<GameEvent>) -> u64 {
        let now = self.clock.now_ms();
        self.writer.advance(now);
        for ev in self.timer.advance(now) {
            self.apply_timer(ev, events);
        }
        now
    }

    /// Cursor column once everything still queued in the writer is drawn.
    fn projected_col(&self) -> usize {
        self.view().map_or(0, |view| view.projected_col(self.writer.pending()))
    }

    fn flush(&mut self, now: u64) {
        self.writer.advance(now);
    }
}
