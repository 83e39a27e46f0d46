//! Revision renumbering engine
//!
//! [`RevisionModificator`] rewrites change-set revisions, event revisions,
//! revision-valued attributes and the revision component of object keys so
//! that the output forms one gapless timeline. Three modes are supported:
//! - replay: input is original history
//! - faking-history: input is synthetic and taken as is
//! - auto: drops and inserts are inferred from the input revisions
//!
//! An engine instance owns its state and must see every change-set of a run
//! exactly once, in order.

mod attributes;
mod modification;
mod modificator;

pub use attributes::RevisionAttributes;
pub use modification::ModificationTable;
pub use modificator::{Mode, RevisionModificator};
