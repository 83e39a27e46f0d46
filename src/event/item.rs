//! Per-object events: creation, update, deletion

use serde::{Deserialize, Serialize};

use super::ids::{ObjectBranchId, Revision};
use super::value::{Value, Values};

/// Creation of a versioned object, carrying its full value set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCreation {
    /// Revision of the change-set this event belongs to
    pub revision: Revision,
    /// Created object
    pub object_id: ObjectBranchId,
    /// Initial attribute values
    #[serde(default)]
    pub values: Values,
}

impl ItemCreation {
    /// Create a creation event without values.
    pub fn new(revision: Revision, object_id: ObjectBranchId) -> Self {
        Self {
            revision,
            object_id,
            values: Values::new(),
        }
    }

    /// Builder-style value setter.
    pub fn with_value(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(attribute.into(), value.into());
        self
    }
}

/// Change of some attributes of an existing object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemUpdate {
    /// Revision of the change-set this event belongs to
    pub revision: Revision,
    /// Changed object
    pub object_id: ObjectBranchId,
    /// New values of the changed attributes only
    #[serde(default)]
    pub values: Values,
    /// Previous values of the changed attributes, if the store tracks them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_values: Option<Values>,
}

impl ItemUpdate {
    /// Create an update. With `track_old_values` the event records previous values.
    pub fn new(revision: Revision, object_id: ObjectBranchId, track_old_values: bool) -> Self {
        Self {
            revision,
            object_id,
            values: Values::new(),
            old_values: track_old_values.then(Values::new),
        }
    }

    /// Record a changed attribute. The old value is dropped if old values are not tracked.
    pub fn set_value(&mut self, attribute: impl Into<String>, old: impl Into<Value>, new: impl Into<Value>) {
        let attribute = attribute.into();
        if let Some(old_values) = self.old_values.as_mut() {
            old_values.insert(attribute.clone(), old.into());
        }
        self.values.insert(attribute, new.into());
    }

    /// Builder-style variant of [`ItemUpdate::set_value`].
    pub fn with_value(mut self, attribute: impl Into<String>, old: impl Into<Value>, new: impl Into<Value>) -> Self {
        self.set_value(attribute, old, new);
        self
    }

    /// An update that changes nothing.
    pub fn is_noop(&self) -> bool {
        self.values.is_empty()
    }
}

/// Deletion of an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDeletion {
    /// Revision of the change-set this event belongs to
    pub revision: Revision,
    /// Deleted object
    pub object_id: ObjectBranchId,
    /// Unused by deletions, kept for symmetry with the other item events
    #[serde(default, skip_serializing_if = "Values::is_empty")]
    pub values: Values,
}

impl ItemDeletion {
    /// Create a deletion event.
    pub fn new(revision: Revision, object_id: ObjectBranchId) -> Self {
        Self {
            revision,
            object_id,
            values: Values::new(),
        }
    }
}
