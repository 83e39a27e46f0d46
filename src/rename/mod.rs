//! Schema-level rewriters
//!
//! Renaming types and attributes, and excluding types altogether. Every type
//! named in the configuration is checked against the source registry when
//! the rewriter is built.

mod attribute;
mod exclude;
mod type_name;

pub use attribute::AttributeRenamer;
pub use exclude::TypeFilter;
pub use type_name::TypeRenamer;

use crate::rewrite::{RewriteError, RewriteResult};
use crate::schema::TypeRegistry;

fn require_types<'a>(
    registry: &dyn TypeRegistry,
    names: impl IntoIterator<Item = &'a String>,
    purpose: &str,
) -> RewriteResult<()> {
    for name in names {
        if !registry.contains_type(name) {
            return Err(RewriteError::configuration(format!("cannot {} unknown type '{}'", purpose, name)));
        }
    }
    Ok(())
}
