//! Type registry subsystem
//!
//! Rewriters consult the registry to:
//! - validate type names used in their configuration
//! - find revision-valued attributes, inherited down the supertype chain
//! - translate identities into the destination schema
//!
//! The registry is built once before any event is processed and is read-only
//! afterwards.

mod errors;
mod loader;
mod registry;
mod types;

pub use errors::{SchemaError, SchemaResult};
pub use loader::{SchemaDocument, SchemaLoader};
pub use registry::{SchemaRegistry, TypeRegistry};
pub use types::{AttributeDef, AttributeKind, TypeDescriptor};
