//! Type registry errors
//!
//! Error codes:
//! - HR_SCHEMA_UNKNOWN_TYPE
//! - HR_SCHEMA_DUPLICATE_TYPE
//! - HR_SCHEMA_UNKNOWN_SUPERTYPE
//! - HR_SCHEMA_CYCLIC_HIERARCHY
//! - HR_SCHEMA_MALFORMED

use thiserror::Error;

/// Result type for type registry operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Type registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Unknown type: '{0}'")]
    UnknownType(String),

    #[error("Type '{0}' is already registered")]
    DuplicateType(String),

    #[error("Type '{type_name}' extends unknown supertype '{supertype}'")]
    UnknownSupertype { type_name: String, supertype: String },

    #[error("Type hierarchy of '{0}' contains a cycle")]
    CyclicHierarchy(String),

    #[error("Malformed schema '{path}': {reason}")]
    Malformed { path: String, reason: String },
}

impl SchemaError {
    /// Create a malformed schema error
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::UnknownType(_) => "HR_SCHEMA_UNKNOWN_TYPE",
            SchemaError::DuplicateType(_) => "HR_SCHEMA_DUPLICATE_TYPE",
            SchemaError::UnknownSupertype { .. } => "HR_SCHEMA_UNKNOWN_SUPERTYPE",
            SchemaError::CyclicHierarchy(_) => "HR_SCHEMA_CYCLIC_HIERARCHY",
            SchemaError::Malformed { .. } => "HR_SCHEMA_MALFORMED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaError::UnknownType("A".into()).code(), "HR_SCHEMA_UNKNOWN_TYPE");
        assert_eq!(SchemaError::malformed("x.json", "bad").code(), "HR_SCHEMA_MALFORMED");
    }

    #[test]
    fn test_error_display() {
        let err = SchemaError::UnknownSupertype {
            type_name: "B".into(),
            supertype: "A".into(),
        };
        assert_eq!(err.to_string(), "Type 'B' extends unknown supertype 'A'");
    }
}
