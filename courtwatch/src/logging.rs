//! Tracing subscriber setup.
//!
//! Logs go to stderr and, optionally, to a file through a non-blocking
//! writer. `RUST_LOG` takes precedence over the configured level.

use std::path::PathBuf;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Errors from logging initialization.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The level string is not a valid filter directive.
    #[error("invalid log filter '{filter}': {message}")]
    InvalidFilter { filter: String, message: String },

    /// The log file path has no file name component.
    #[error("invalid log file path: {}", .0.display())]
    InvalidPath(PathBuf),

    /// The log directory could not be created.
    #[error("failed to create log directory: {0}")]
    CreateDir(#[from] std::io::Error),

    /// A global subscriber is already installed.
    #[error("logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Logging options.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Level or `EnvFilter` directive (e.g. `info`, `courtwatch=debug`).
    pub level: String,
    /// Also write logs to this file.
    pub file: Option<PathBuf>,
    /// Colorize stderr output.
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: crate::config::DEFAULT_LOG_LEVEL.to_string(),
            file: None,
            ansi: true,
        }
    }
}

impl From<&crate::config::LoggingSettings> for LoggingConfig {
    fn from(settings: &crate::config::LoggingSettings) -> Self {
        Self {
            level: settings.level.clone(),
            file: settings.file.clone(),
            ..Self::default()
        }
    }
}

/// Keeps the file writer alive; dropping it flushes pending log lines.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Build the filter: `RUST_LOG` if set, otherwise `level`.
pub fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|e| LoggingError::InvalidFilter {
        filter: level.to_string(),
        message: e.to_string(),
    })
}

/// Install the global tracing subscriber.
pub fn init_logging(config: &LoggingConfig) -> Result<LogGuard, LoggingError> {
    let filter = build_filter(&config.level)?;
    let timer = LocalTime::new(time::macros::format_description!(
        "[hour]:[minute]:[second].[subsecond digits:3]"
    ));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(timer.clone())
        .with_ansi(config.ansi)
        .with_target(false);

    let (file_layer, file_guard) = match &config.file {
        Some(path) => {
            let file_name = path
                .file_name()
                .ok_or_else(|| LoggingError::InvalidPath(path.clone()))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            std::fs::create_dir_all(&dir)?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_timer(timer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(LogGuard { _file: file_guard })
}
