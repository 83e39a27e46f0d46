//! Event model for versioned object store history
//!
//! A `ChangeSet` is one unit of history and owns its events:
//! - `BranchEvent` - creation of a branch
//! - `ItemDeletion` / `ItemCreation` / `ItemUpdate` - per-object changes
//! - `CommitEvent` - end-of-revision marker
//!
//! Change-sets are streamed one at a time: read from a source store,
//! mutated in place by rewriters and handed to a writer.

mod branch;
mod change_set;
mod commit;
mod ids;
mod item;
mod value;

pub use branch::BranchEvent;
pub use change_set::{ChangeSet, EventKind, EventMut, EventRef, KnowledgeEvent};
pub use commit::CommitEvent;
pub use ids::{
    is_concrete, BranchId, ObjectBranchId, ObjectKey, Revision, CURRENT_REVISION, FIRST_REVISION,
    TRUNK_BRANCH, UNASSIGNED_REVISION,
};
pub use item::{ItemCreation, ItemDeletion, ItemUpdate};
pub use value::{Value, Values};
