use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_DIR: &str = "logs";
pub const LOG_FILE: &str = "spark-clock.log";

/// Routes tracing output to a daily rolling file; the terminal belongs to
/// the TUI. Keep the returned guard alive until exit or buffered lines are
/// lost.
pub fn initialize_logging() -> WorkerGuard {
    if let Err(e) = std::fs::create_dir_all(LOG_DIR) {
        eprintln!("Could not create log directory '{}': {}", LOG_DIR, e);
    }

    let file_appender = tracing_appender::rolling::daily(LOG_DIR, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    tracing::info!("Logging initialized successfully.");
    guard
}
