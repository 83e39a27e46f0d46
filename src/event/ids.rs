//! Object identities and revision sentinels
//!
//! Two identities exist for a versioned object:
//! - `ObjectBranchId`: the object within one branch, no revision component.
//!   Item events are addressed by this identity.
//! - `ObjectKey`: one specific revision of the object. Appears as an attribute
//!   value whenever one object references another.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A point in the global history timeline.
pub type Revision = i64;

/// Identifier of a branch.
pub type BranchId = i64;

/// The first revision a store ever assigns.
pub const FIRST_REVISION: Revision = 1;

/// "Current / latest". Compares greater than every concrete revision.
pub const CURRENT_REVISION: Revision = i64::MAX;

/// Placeholder for a revision that has not been assigned yet.
pub const UNASSIGNED_REVISION: Revision = 0;

/// The root branch every other branch descends from.
pub const TRUNK_BRANCH: BranchId = 1;

/// Returns true for revisions that denote a concrete commit.
///
/// Unassigned revisions and `CURRENT_REVISION` are sentinels and pass
/// through every renumbering step untouched.
#[inline]
pub fn is_concrete(revision: Revision) -> bool {
    revision >= FIRST_REVISION && revision != CURRENT_REVISION
}

/// Identity of an object within a branch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectBranchId {
    /// Branch the object lives on
    pub branch: BranchId,
    /// Name of the object's type
    pub object_type: String,
    /// Local name of the object, unique per type and branch
    pub object_name: String,
}

impl ObjectBranchId {
    /// Create a new branch-scoped identity.
    pub fn new(branch: BranchId, object_type: impl Into<String>, object_name: impl Into<String>) -> Self {
        Self {
            branch,
            object_type: object_type.into(),
            object_name: object_name.into(),
        }
    }

    /// The key of this object at the given revision.
    pub fn at(&self, revision: Revision) -> ObjectKey {
        ObjectKey {
            branch_context: self.branch,
            history_context: revision,
            object_type: self.object_type.clone(),
            object_name: self.object_name.clone(),
        }
    }
}

impl fmt::Display for ObjectBranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}@b{}", self.object_type, self.object_name, self.branch)
    }
}

/// Identity of one revision of one object on one branch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectKey {
    /// Branch the referenced object lives on
    pub branch_context: BranchId,
    /// Revision of the referenced object, `CURRENT_REVISION` for "latest"
    pub history_context: Revision,
    /// Name of the object's type
    pub object_type: String,
    /// Local name of the object
    pub object_name: String,
}

impl ObjectKey {
    /// Create a new object key.
    pub fn new(
        branch_context: BranchId,
        history_context: Revision,
        object_type: impl Into<String>,
        object_name: impl Into<String>,
    ) -> Self {
        Self {
            branch_context,
            history_context,
            object_type: object_type.into(),
            object_name: object_name.into(),
        }
    }

    /// The identity of the referenced object without its revision.
    pub fn branch_id(&self) -> ObjectBranchId {
        ObjectBranchId::new(self.branch_context, self.object_type.clone(), self.object_name.clone())
    }

    /// Whether this key references the current state rather than a historic one.
    pub fn is_current(&self) -> bool {
        self.history_context == CURRENT_REVISION
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_current() {
            write!(f, "{}:{}@b{}/current", self.object_type, self.object_name, self.branch_context)
        } else {
            write!(
                f,
                "{}:{}@b{}/r{}",
                self.object_type, self.object_name, self.branch_context, self.history_context
            )
        }
    }
}
