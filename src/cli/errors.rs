//! CLI-specific error types
//!
//! All CLI errors are fatal: the process exits with status 1.

use std::io;

use thiserror::Error;

use crate::replay::ReplayError;
use crate::store::StoreError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("HR_CLI_IO: {0}")]
    Io(#[from] io::Error),

    #[error("HR_CLI_JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{}: {0}", .0.code())]
    Replay(#[from] ReplayError),

    #[error("{}: {0}", .0.code())]
    Store(#[from] StoreError),
}

impl CliError {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Io(_) => "HR_CLI_IO",
            CliError::Json(_) => "HR_CLI_JSON",
            CliError::Replay(e) => e.code(),
            CliError::Store(e) => e.code(),
        }
    }
}
