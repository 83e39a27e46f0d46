//! Per-event visiting of change-sets
//!
//! Rewriters that inspect single events implement [`EventVisitor`] and
//! override only the kinds they care about. The traversal order is fixed:
//!
//! branches → deletions → creations → updates → commit
//!
//! Events answered with [`Outcome::Skip`] are removed from their group.
//! Updates left without values are removed as well. The surviving change-set
//! is written to the sink exactly once.

mod visitor;

pub use visitor::{dispatch, rewrite_visiting, visit_change_set, EventVisitor, Outcome};
