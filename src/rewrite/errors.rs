//! Rewrite error types
//!
//! Error codes:
//! - HR_REWRITE_DESYNCHRONIZED (FATAL)
//! - HR_REWRITE_INVALID_REMAP (FATAL)
//! - HR_REWRITE_FUTURE_REVISION (FATAL)
//! - HR_REWRITE_INVALID_VALUE (FATAL)
//! - HR_REWRITE_ATTRIBUTE_COLLISION (FATAL)
//! - HR_REWRITE_UNKNOWN_TYPE (ERROR, the driver decides)
//! - HR_REWRITE_CONFIGURATION (FATAL, raised before any event is processed)
//! - HR_REWRITE_INVALID_STATE (FATAL)
//! - HR_REWRITE_INVALID_ARGUMENT (FATAL)
//! - sink errors carry the code of the underlying store error

use thiserror::Error;

use crate::event::Revision;
use crate::schema::SchemaError;
use crate::store::StoreError;

/// Result type for rewriting
pub type RewriteResult<T> = Result<T, RewriteError>;

/// Errors raised while rewriting change-sets
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("Expected {what} with revision {expected}, got {actual}")]
    Desynchronized {
        what: &'static str,
        expected: Revision,
        actual: Revision,
    },

    #[error("Remapped {what} is out of range: {value} with modification {modification}")]
    InvalidRemap {
        what: &'static str,
        value: i64,
        modification: i64,
    },

    #[error("Revision {revision} points to a future revision, current is {expected}")]
    FutureRevision { revision: Revision, expected: Revision },

    #[error("Attribute '{attribute}' of {object} holds a {found} value, not a revision number")]
    InvalidValue {
        attribute: String,
        object: String,
        found: &'static str,
    },

    #[error("Renamed attribute '{attribute}' of {object} collides with an existing attribute")]
    AttributeCollision { attribute: String, object: String },

    #[error("Type '{type_name}' is unknown in the destination schema ({context})")]
    UnknownType { type_name: String, context: String },

    #[error("Invalid rewriter configuration: {0}")]
    Configuration(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Sink(#[from] StoreError),
}

impl RewriteError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        RewriteError::Configuration(message.into())
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            RewriteError::Desynchronized { .. } => "HR_REWRITE_DESYNCHRONIZED",
            RewriteError::InvalidRemap { .. } => "HR_REWRITE_INVALID_REMAP",
            RewriteError::FutureRevision { .. } => "HR_REWRITE_FUTURE_REVISION",
            RewriteError::InvalidValue { .. } => "HR_REWRITE_INVALID_VALUE",
            RewriteError::AttributeCollision { .. } => "HR_REWRITE_ATTRIBUTE_COLLISION",
            RewriteError::UnknownType { .. } => "HR_REWRITE_UNKNOWN_TYPE",
            RewriteError::Configuration(_) => "HR_REWRITE_CONFIGURATION",
            RewriteError::InvalidState(_) => "HR_REWRITE_INVALID_STATE",
            RewriteError::InvalidArgument(_) => "HR_REWRITE_INVALID_ARGUMENT",
            RewriteError::Schema(e) => e.code(),
            RewriteError::Sink(e) => e.code(),
        }
    }

    /// Unknown types may be skipped by policy; store errors keep their own severity.
    pub fn is_fatal(&self) -> bool {
        match self {
            RewriteError::UnknownType { .. } => false,
            RewriteError::Sink(e) => e.is_fatal(),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desync_message() {
        let err = RewriteError::Desynchronized {
            what: "change-set",
            expected: 3,
            actual: 4,
        };
        assert_eq!(err.code(), "HR_REWRITE_DESYNCHRONIZED");
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "Expected change-set with revision 3, got 4");
    }

    #[test]
    fn test_sink_error_keeps_store_code() {
        let err: RewriteError = StoreError::CommitFailed {
            last_committed: 2,
            reason: "disk full".into(),
        }
        .into();
        assert_eq!(err.code(), "HR_STORE_COMMIT_FAILED");
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_unknown_type_not_fatal() {
        let err = RewriteError::UnknownType {
            type_name: "Ghost".into(),
            context: "creation".into(),
        };
        assert!(!err.is_fatal());
    }
}
