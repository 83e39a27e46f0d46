//! Replay error types
//!
//! Error codes:
//! - HR_REPLAY_CONFIG (FATAL, raised before anything is read)
//! - rewrite, store and schema errors keep their own codes

use thiserror::Error;

use crate::rewrite::RewriteError;
use crate::schema::SchemaError;
use crate::store::StoreError;

/// Result type for replay runs
pub type ReplayResult<T> = Result<T, ReplayError>;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Invalid replay configuration {path}: {reason}")]
    Config { path: String, reason: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ReplayError {
    pub fn config(path: impl Into<String>, reason: impl Into<String>) -> Self {
        ReplayError::Config {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ReplayError::Config { .. } => "HR_REPLAY_CONFIG",
            ReplayError::Schema(e) => e.code(),
            ReplayError::Rewrite(e) => e.code(),
            ReplayError::Store(e) => e.code(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        match self {
            ReplayError::Config { .. } | ReplayError::Schema(_) => true,
            ReplayError::Rewrite(e) => e.is_fatal(),
            ReplayError::Store(e) => e.is_fatal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_pass_through() {
        let err: ReplayError = RewriteError::configuration("bad").into();
        assert_eq!(err.code(), "HR_REWRITE_CONFIGURATION");
        let err = ReplayError::config("replay.json", "stop before start");
        assert_eq!(err.code(), "HR_REPLAY_CONFIG");
        assert!(err.to_string().contains("replay.json"));
    }
}
