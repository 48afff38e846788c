//! Core types and utilities for ClosePulse

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::{Config, LoggingConfig};
pub use error::{Error, Result};
pub use types::{
    ActionOutcome, CallId, CallRecord, Outcome, PatternGroup, PatternItem, ProgressTone,
    Sentiment, Session, SessionSnapshot, SessionState,
};

/// Keeps the background log writer alive; drop it only at shutdown
pub use tracing_appender::non_blocking::WorkerGuard;

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over the configured level. When a log file is
/// configured the returned guard must be held until the process exits.
///
/// # Errors
///
/// Returns an error if the level cannot be parsed or a global subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{
        EnvFilter, fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt,
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| Error::configuration(format!("Invalid log level '{}': {e}", config.level)))?;

    let (writer, guard) = match &config.file {
        Some(path) => {
            let directory = path.parent().unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| Error::configuration("logging.file has no file name"))?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(writer))
            .try_init()
    };
    installed.map_err(|e| Error::configuration(format!("Logging already initialized: {e}")))?;

    Ok(guard)
}
