//! Branch creation event

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::ids::{BranchId, Revision};

/// Creation of a new branch forked from `base_branch_id` at `base_revision_number`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchEvent {
    /// Revision of the change-set this event belongs to
    pub revision: Revision,
    /// The newly created branch
    pub branch_id: BranchId,
    /// Branch the new branch forks from
    pub base_branch_id: BranchId,
    /// Revision on the base branch at which the fork happens
    pub base_revision_number: Revision,
    /// Types whose instances are copied onto the new branch
    #[serde(default)]
    pub branched_type_names: BTreeSet<String>,
}

impl BranchEvent {
    /// Create a branch event without branched types.
    pub fn new(revision: Revision, branch_id: BranchId, base_branch_id: BranchId, base_revision_number: Revision) -> Self {
        Self {
            revision,
            branch_id,
            base_branch_id,
            base_revision_number,
            branched_type_names: BTreeSet::new(),
        }
    }

    /// Builder-style setter for the branched types.
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.branched_type_names = types.into_iter().map(Into::into).collect();
        self
    }
}
