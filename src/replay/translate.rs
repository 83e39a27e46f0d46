//! Identity translation into the destination schema
//!
//! The last stage of every replay. Each type name reaching the destination,
//! whether in an object identity, an object key or a branched type set, must
//! resolve in the destination registry.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::event::{BranchEvent, ChangeSet, ItemCreation, ItemDeletion, ItemUpdate, ObjectBranchId, Value, Values};
use crate::rewrite::{EventRewriter, EventSink, RewriteError, RewriteResult};
use crate::schema::TypeRegistry;
use crate::visit::{rewrite_visiting, EventVisitor, Outcome};

/// What to do with events whose type the destination does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownTypePolicy {
    /// Abort the replay.
    #[default]
    Fail,
    /// Drop the event and keep going.
    Skip,
}

pub struct IdentityTranslator {
    known_types: BTreeSet<String>,
    policy: UnknownTypePolicy,
    skipped: u64,
}

impl IdentityTranslator {
    pub fn new(destination: &dyn TypeRegistry, policy: UnknownTypePolicy) -> Self {
        Self {
            known_types: destination.type_names().into_iter().map(str::to_string).collect(),
            policy,
            skipped: 0,
        }
    }

    /// Events dropped so far under [`UnknownTypePolicy::Skip`].
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    fn unknown(&mut self, type_name: &str, context: String) -> RewriteResult<Outcome> {
        match self.policy {
            UnknownTypePolicy::Fail => Err(RewriteError::UnknownType {
                type_name: type_name.to_string(),
                context,
            }),
            UnknownTypePolicy::Skip => {
                warn!(type_name, context = %context, "Skipping event of unknown type");
                self.skipped += 1;
                Ok(Outcome::Skip)
            }
        }
    }

    fn translate_item(
        &mut self,
        id: &ObjectBranchId,
        values: &Values,
        old_values: Option<&Values>,
        kind: &str,
    ) -> RewriteResult<Outcome> {
        if !self.known_types.contains(&id.object_type) {
            return self.unknown(&id.object_type, format!("{} of {}", kind, id));
        }
        let dangling = values
            .iter()
            .chain(old_values.into_iter().flatten())
            .find_map(|(name, value)| match value {
                Value::Key(key) if !self.known_types.contains(&key.object_type) => Some((name, key)),
                _ => None,
            });
        if let Some((name, key)) = dangling {
            let type_name = key.object_type.clone();
            return self.unknown(&type_name, format!("attribute '{}' of {} {}", name, kind, id));
        }
        Ok(Outcome::Apply)
    }
}

impl EventVisitor for IdentityTranslator {
    fn visit_branch(&mut self, event: &mut BranchEvent) -> RewriteResult<Outcome> {
        let unknown: Vec<String> = event
            .branched_type_names
            .iter()
            .filter(|name| !self.known_types.contains(*name))
            .cloned()
            .collect();
        for type_name in unknown {
            if self.policy == UnknownTypePolicy::Fail {
                return Err(RewriteError::UnknownType {
                    type_name,
                    context: format!("branch {}", event.branch_id),
                });
            }
            warn!(type_name = %type_name, branch = event.branch_id, "Unknown type removed from branch");
            event.branched_type_names.remove(&type_name);
        }
        Ok(Outcome::Apply)
    }

    fn visit_deletion(&mut self, event: &mut ItemDeletion) -> RewriteResult<Outcome> {
        self.translate_item(&event.object_id, &event.values, None, "deletion")
    }

    fn visit_creation(&mut self, event: &mut ItemCreation) -> RewriteResult<Outcome> {
        self.translate_item(&event.object_id, &event.values, None, "creation")
    }

    fn visit_update(&mut self, event: &mut ItemUpdate) -> RewriteResult<Outcome> {
        self.translate_item(&event.object_id, &event.values, event.old_values.as_ref(), "update")
    }
}

impl EventRewriter for IdentityTranslator {
    fn rewrite(&mut self, change_set: ChangeSet, sink: &mut dyn EventSink) -> RewriteResult<()> {
        rewrite_visiting(self, change_set, sink)
    }
}
