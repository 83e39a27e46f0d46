//! Branch renumbering
//!
//! - [`BranchModificator`] shifts branch ids by a signed delta
//! - [`BranchTypeFilter`] prunes and extends the types a new branch copies

mod modificator;
mod types;

pub use modificator::BranchModificator;
pub use types::BranchTypeFilter;
