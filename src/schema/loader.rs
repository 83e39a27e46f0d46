//! Schema loader for type registry documents
//!
//! A schema file is a JSON document of the form:
//!
//! ```json
//! { "types": [ { "name": "Doc", "supertype": "Item", "attributes": [ { "name": "rev", "kind": "revision" } ] } ] }
//! ```
//!
//! Malformed files, duplicate types and broken hierarchies fail the load.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{SchemaError, SchemaResult};
use super::registry::SchemaRegistry;
use super::types::TypeDescriptor;

/// On-disk form of a schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub types: Vec<TypeDescriptor>,
}

/// Loads type registries from disk.
pub struct SchemaLoader;

impl SchemaLoader {
    /// Loads and validates a schema file.
    pub fn load_file(path: &Path) -> SchemaResult<SchemaRegistry> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed(path.display().to_string(), format!("Failed to read file: {}", e))
        })?;

        Self::load_str(&content).map_err(|e| match e {
            SchemaError::Malformed { reason, .. } => {
                SchemaError::malformed(path.display().to_string(), reason)
            }
            other => other,
        })
    }

    /// Parses and validates a schema document held in memory.
    pub fn load_str(content: &str) -> SchemaResult<SchemaRegistry> {
        let document: SchemaDocument = serde_json::from_str(content)
            .map_err(|e| SchemaError::malformed("<in-memory>", format!("Invalid JSON: {}", e)))?;

        for ty in &document.types {
            if ty.name.trim().is_empty() {
                return Err(SchemaError::malformed("<in-memory>", "Type with empty name"));
            }
        }

        SchemaRegistry::from_types(document.types)
    }
}
