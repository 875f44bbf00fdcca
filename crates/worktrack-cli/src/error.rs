//! Error types for the worktrack CLI.

use thiserror::Error;
use worktrack_core::CoreError;

/// Errors raised while preparing or running a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Domain error from the core crate.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A command-line argument could not be interpreted.
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },
}
