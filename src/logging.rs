use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// File name prefix of the daily log files
pub const LOG_FILE_NAME: &str = "ai-shell.log";

/// Initialize the logging system
///
/// Logs go to `log_dir` only. The terminal is reserved for the reasoning
/// stream and the confirmation prompt.
pub fn init_logging(log_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    // Daily rotation
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_NAME);

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    // Default to INFO level, can be overridden with RUST_LOG env var
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .context("Failed to install the tracing subscriber")?;

    tracing::info!("Logging system initialized");
    tracing::info!("Log files location: {}", log_dir.join(LOG_FILE_NAME).display());

    Ok(())
}
