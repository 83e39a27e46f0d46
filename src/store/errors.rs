//! Store error types
//!
//! Error codes:
//! - HR_STORE_IO (FATAL)
//! - HR_STORE_CORRUPTION (FATAL)
//! - HR_STORE_SERIALIZATION (FATAL)
//! - HR_STORE_OUT_OF_ORDER (FATAL)
//! - HR_STORE_CLOSED (FATAL)
//! - HR_STORE_COMMIT_FAILED (ERROR, destination left at the last good commit)

use std::io;

use thiserror::Error;

use crate::event::Revision;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by source and destination stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("Store corruption at line {line}: {reason}")]
    Corruption { line: u64, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Change-set for revision {revision} arrives after revision {last_committed}")]
    OutOfOrder {
        last_committed: Revision,
        revision: Revision,
    },

    #[error("{0} already closed")]
    Closed(&'static str),

    #[error("Commit failed after revision {last_committed}: {reason}")]
    CommitFailed {
        last_committed: Revision,
        reason: String,
    },
}

impl StoreError {
    /// Wrap an I/O error with context
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        StoreError::Io {
            context: context.into(),
            source,
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Io { .. } => "HR_STORE_IO",
            StoreError::Corruption { .. } => "HR_STORE_CORRUPTION",
            StoreError::Serialization(_) => "HR_STORE_SERIALIZATION",
            StoreError::OutOfOrder { .. } => "HR_STORE_OUT_OF_ORDER",
            StoreError::Closed(_) => "HR_STORE_CLOSED",
            StoreError::CommitFailed { .. } => "HR_STORE_COMMIT_FAILED",
        }
    }

    /// Commit failures leave the destination consistent; everything else is fatal.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, StoreError::CommitFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_failure_is_not_fatal() {
        let err = StoreError::CommitFailed {
            last_committed: 4,
            reason: "disk full".into(),
        };
        assert!(!err.is_fatal());
        assert_eq!(err.code(), "HR_STORE_COMMIT_FAILED");
        assert!(err.to_string().contains("after revision 4"));
    }

    #[test]
    fn test_corruption_is_fatal() {
        let err = StoreError::Corruption {
            line: 3,
            reason: "checksum mismatch".into(),
        };
        assert!(err.is_fatal());
    }
}
