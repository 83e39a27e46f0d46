//! Branch id remapping
//!
//! Every branch id met in identities, keys and branch events is shifted by a
//! fixed delta.

use std::collections::HashMap;

use tracing::debug;

use crate::event::{
    BranchEvent, BranchId, ChangeSet, ItemCreation, ItemDeletion, ItemUpdate, ObjectBranchId, Value, Values,
};
use crate::rewrite::{EventRewriter, EventSink, RewriteError, RewriteResult};
use crate::visit::{rewrite_visiting, EventVisitor, Outcome};

/// Remaps branch ids by a fixed delta.
///
/// Remapped ids are memoized the first time a branch id is seen.
#[derive(Debug, Clone)]
pub struct BranchModificator {
    delta: i64,
    mapping: HashMap<BranchId, BranchId>,
}

impl BranchModificator {
    pub fn new(delta: i64) -> Self {
        Self {
            delta,
            mapping: HashMap::new(),
        }
    }

    pub fn increase_branch_id(by: i64) -> Self {
        Self::new(by)
    }

    pub fn decrease_branch_id(by: i64) -> Self {
        Self::new(-by)
    }

    pub fn delta(&self) -> i64 {
        self.delta
    }

    /// New id of `branch`.
    pub fn map_branch(&mut self, branch: BranchId) -> RewriteResult<BranchId> {
        if let Some(mapped) = self.mapping.get(&branch) {
            return Ok(*mapped);
        }
        let mapped = branch
            .checked_add(self.delta)
            .filter(|mapped| *mapped >= 0)
            .ok_or(RewriteError::InvalidRemap {
                what: "branch id",
                value: branch,
                modification: self.delta,
            })?;
        debug!(from = branch, to = mapped, "Branch remapped");
        self.mapping.insert(branch, mapped);
        Ok(mapped)
    }

    /// Number of distinct branch ids remapped so far.
    pub fn remapped_count(&self) -> usize {
        self.mapping.len()
    }

    fn map_id(&mut self, id: &mut ObjectBranchId) -> RewriteResult<()> {
        id.branch = self.map_branch(id.branch)?;
        Ok(())
    }

    fn map_values(&mut self, values: &mut Values) -> RewriteResult<()> {
        for value in values.values_mut() {
            if let Value::Key(key) = value {
                key.branch_context = self.map_branch(key.branch_context)?;
            }
        }
        Ok(())
    }
}

impl EventVisitor for BranchModificator {
    fn visit_branch(&mut self, event: &mut BranchEvent) -> RewriteResult<Outcome> {
        event.branch_id = self.map_branch(event.branch_id)?;
        event.base_branch_id = self.map_branch(event.base_branch_id)?;
        Ok(Outcome::Apply)
    }

    fn visit_deletion(&mut self, event: &mut ItemDeletion) -> RewriteResult<Outcome> {
        self.map_id(&mut event.object_id)?;
        self.map_values(&mut event.values)?;
        Ok(Outcome::Apply)
    }

    fn visit_creation(&mut self, event: &mut ItemCreation) -> RewriteResult<Outcome> {
        self.map_id(&mut event.object_id)?;
        self.map_values(&mut event.values)?;
        Ok(Outcome::Apply)
    }

    fn visit_update(&mut self, event: &mut ItemUpdate) -> RewriteResult<Outcome> {
        self.map_id(&mut event.object_id)?;
        self.map_values(&mut event.values)?;
        if let Some(old_values) = event.old_values.as_mut() {
            self.map_values(old_values)?;
        }
        Ok(Outcome::Apply)
    }
}

impl EventRewriter for BranchModificator {
    fn rewrite(&mut self, change_set: ChangeSet, sink: &mut dyn EventSink) -> RewriteResult<()> {
        rewrite_visiting(self, change_set, sink)
    }
}
