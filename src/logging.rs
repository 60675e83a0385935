/// Tracing setup.
///
/// stdout is the game screen, so logs go to a file in the temp directory
/// through a non-blocking writer. Filter with `RUST_LOG` (default `info`).

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "escape-terminal.log";

pub fn log_path() -> PathBuf {
    std::env::temp_dir().join(LOG_FILE)
}

/// Install the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn init() -> Option<WorkerGuard> {
    let appender = tracing_appender::rolling::never(std::env::temp_dir(), LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()
        .map(|()| guard)
}
