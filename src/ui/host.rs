/// Host capability: the interactive terminal the game runs in.
///
/// Acquiring the host is the only fatal step of startup. Without an
/// interactive terminal the console cannot be shown and the quit signal has
/// nowhere to go, so the failure is reported before gameplay begins.
///
/// The host also carries the quit request: the game loop polls it and
/// exits, which restores the terminal and ends the process.

use std::io::{self, IsTerminal};

use crossterm::{cursor, execute, style::ResetColor, terminal};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("{stream} is not an interactive terminal")]
    NotATerminal { stream: &'static str },

    #[error("terminal setup failed: {0}")]
    Terminal(#[from] io::Error),
}

pub struct Host {
    active: bool,
    quit_requested: bool,
}

impl Host {
    /// Take over the terminal: raw mode + alternate screen.
    pub fn acquire() -> Result<Self, HostError> {
        if !io::stdin().is_terminal() {
            return Err(HostError::NotATerminal { stream: "stdin" });
        }
        if !io::stdout().is_terminal() {
            return Err(HostError::NotATerminal { stream: "stdout" });
        }

        terminal::enable_raw_mode()?;
        // From here on Drop restores the terminal, even if the next step fails.
        let host = Host { active: true, quit_requested: false };
        execute!(io::stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;
        debug!("terminal acquired");
        Ok(host)
    }

    /// Ask the hosting process to terminate.
    pub fn request_quit(&mut self) {
        if !self.quit_requested {
            info!("quit requested");
        }
        self.quit_requested = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Give the terminal back. Safe to call more than once.
    pub fn release(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        execute!(
            io::stdout(),
            ResetColor,
            cursor::SetCursorStyle::DefaultUserShape,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        let _ = self.release();
    }
}
