//! Type exclusion
//!
//! Events of excluded types are dropped, along with keys that point at them.

use std::collections::BTreeSet;

use tracing::trace;

use crate::event::{BranchEvent, ChangeSet, ItemCreation, ItemDeletion, ItemUpdate, Value, Values};
use crate::rewrite::{EventRewriter, EventSink, RewriteResult};
use crate::schema::TypeRegistry;
use crate::visit::{rewrite_visiting, EventVisitor, Outcome};

use super::require_types;

/// Removes every trace of the excluded types: their item events, their
/// entries in branched type sets, and references to them.
#[derive(Debug, Clone)]
pub struct TypeFilter {
    excluded: BTreeSet<String>,
}

impl TypeFilter {
    pub fn new(excluded: BTreeSet<String>) -> Self {
        Self { excluded }
    }

    pub fn checked(excluded: BTreeSet<String>, registry: &dyn TypeRegistry) -> RewriteResult<Self> {
        require_types(registry, &excluded, "exclude")?;
        Ok(Self::new(excluded))
    }

    fn outcome(&self, type_name: &str) -> Outcome {
        if self.excluded.contains(type_name) {
            trace!(type_name, "Excluded event dropped");
            Outcome::Skip
        } else {
            Outcome::Apply
        }
    }

    fn drop_references(&self, values: &mut Values) {
        values.retain(|_, value| match value {
            Value::Key(key) => !self.excluded.contains(&key.object_type),
            _ => true,
        });
    }
}

impl EventVisitor for TypeFilter {
    fn visit_branch(&mut self, event: &mut BranchEvent) -> RewriteResult<Outcome> {
        event.branched_type_names.retain(|name| !self.excluded.contains(name));
        Ok(Outcome::Apply)
    }

    fn visit_deletion(&mut self, event: &mut ItemDeletion) -> RewriteResult<Outcome> {
        Ok(self.outcome(&event.object_id.object_type))
    }

    fn visit_creation(&mut self, event: &mut ItemCreation) -> RewriteResult<Outcome> {
        let outcome = self.outcome(&event.object_id.object_type);
        if outcome == Outcome::Apply {
            self.drop_references(&mut event.values);
        }
        Ok(outcome)
    }

    fn visit_update(&mut self, event: &mut ItemUpdate) -> RewriteResult<Outcome> {
        let outcome = self.outcome(&event.object_id.object_type);
        if outcome == Outcome::Apply {
            self.drop_references(&mut event.values);
            if let Some(old_values) = event.old_values.as_mut() {
                self.drop_references(old_values);
            }
        }
        Ok(outcome)
    }
}

impl EventRewriter for TypeFilter {
    fn rewrite(&mut self, change_set: ChangeSet, sink: &mut dyn EventSink) -> RewriteResult<()> {
        rewrite_visiting(self, change_set, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ObjectBranchId, TRUNK_BRANCH};

    #[test]
    fn test_excluded_types_vanish() {
        let mut filter = TypeFilter::new(BTreeSet::from(["Audit".to_string()]));
        let audit = ObjectBranchId::new(TRUNK_BRANCH, "Audit", "a");
        let doc = ObjectBranchId::new(TRUNK_BRANCH, "Doc", "d");
        let cs = ChangeSet::new(3)
            .with_branch(BranchEvent::new(3, 2, TRUNK_BRANCH, 2).with_types(["Audit", "Doc"]))
            .with_creation(ItemCreation::new(3, audit.clone()))
            .with_creation(ItemCreation::new(3, doc.clone()).with_value("log", audit.at(3)).with_value("t", "x"))
            .with_update(ItemUpdate::new(3, doc.clone(), false).with_value("log", audit.at(2), audit.at(3)));

        let mut out = Vec::new();
        filter.rewrite(cs, &mut out).unwrap();
        let cs = &out[0];
        assert_eq!(cs.branch_events[0].branched_type_names, BTreeSet::from(["Doc".to_string()]));
        assert_eq!(cs.creations.len(), 1);
        assert_eq!(cs.creations[0].object_id, doc);
        assert!(!cs.creations[0].values.contains_key("log"));
        assert!(cs.updates.is_empty(), "update left without values is dropped");
    }
}
