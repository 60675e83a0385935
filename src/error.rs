/// Top-level error type for the game binary.

use std::io;

use crate::ui::host::HostError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("host unavailable: {0}")]
    Host(#[from] HostError),

    #[error("terminal output failed: {0}")]
    Render(#[from] io::Error),
}
