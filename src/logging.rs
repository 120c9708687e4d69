//! Logging setup.
//!
//! Progress and skip notices go through `tracing` to stderr; job reports
//! are printed to stdout by the CLI.

use clap::ValueEnum;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::error::LeafcocoError;

/// Minimum level to display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Installs the global compact subscriber writing to stderr.
pub fn init_logging(level: LogLevel) -> Result<(), LeafcocoError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level.to_tracing_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| LeafcocoError::LoggingInit(e.to_string()))
}
