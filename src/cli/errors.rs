//! # CLI Errors
//!
//! Top-level failures of a run. Everything here is fatal: the process
//! prints the message and exits non-zero.

use thiserror::Error;

use crate::export::ExportError;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    /// The user declined to close Chrome, or it would not exit
    #[error("Cannot sync while Google Chrome is running")]
    BrowserRunning,

    /// A store lock was observed and nothing was recoverable around it
    #[error("Storage appears locked by a running browser and no records could be recovered; close the browser and retry")]
    StoreLocked,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
