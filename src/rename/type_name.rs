//! Type renaming in identities, keys and branched types

use std::collections::BTreeMap;

use crate::event::{
    BranchEvent, ChangeSet, ItemCreation, ItemDeletion, ItemUpdate, ObjectBranchId, Value, Values,
};
use crate::rewrite::{EventRewriter, EventSink, RewriteResult};
use crate::schema::TypeRegistry;
use crate::visit::{rewrite_visiting, EventVisitor, Outcome};

use super::require_types;

/// Renames object types in identities, object keys and branched type sets.
#[derive(Debug, Clone)]
pub struct TypeRenamer {
    renames: BTreeMap<String, String>,
}

impl TypeRenamer {
    pub fn new(renames: BTreeMap<String, String>) -> Self {
        Self { renames }
    }

    /// Rejects renames of types the registry does not know.
    pub fn checked(renames: BTreeMap<String, String>, registry: &dyn TypeRegistry) -> RewriteResult<Self> {
        require_types(registry, renames.keys(), "rename")?;
        Ok(Self::new(renames))
    }

    fn rename(&self, type_name: &mut String) {
        if let Some(target) = self.renames.get(type_name.as_str()) {
            type_name.clone_from(target);
        }
    }

    fn rename_id(&self, id: &mut ObjectBranchId) {
        self.rename(&mut id.object_type);
    }

    fn rename_values(&self, values: &mut Values) {
        for value in values.values_mut() {
            if let Value::Key(key) = value {
                self.rename(&mut key.object_type);
            }
        }
    }
}

impl EventVisitor for TypeRenamer {
    fn visit_branch(&mut self, event: &mut BranchEvent) -> RewriteResult<Outcome> {
        event.branched_type_names = std::mem::take(&mut event.branched_type_names)
            .into_iter()
            .map(|name| self.renames.get(&name).cloned().unwrap_or(name))
            .collect();
        Ok(Outcome::Apply)
    }

    fn visit_deletion(&mut self, event: &mut ItemDeletion) -> RewriteResult<Outcome> {
        self.rename_id(&mut event.object_id);
        self.rename_values(&mut event.values);
        Ok(Outcome::Apply)
    }

    fn visit_creation(&mut self, event: &mut ItemCreation) -> RewriteResult<Outcome> {
        self.rename_id(&mut event.object_id);
        self.rename_values(&mut event.values);
        Ok(Outcome::Apply)
    }

    fn visit_update(&mut self, event: &mut ItemUpdate) -> RewriteResult<Outcome> {
        self.rename_id(&mut event.object_id);
        self.rename_values(&mut event.values);
        if let Some(old_values) = event.old_values.as_mut() {
            self.rename_values(old_values);
        }
        Ok(Outcome::Apply)
    }
}

impl EventRewriter for TypeRenamer {
    fn rewrite(&mut self, change_set: ChangeSet, sink: &mut dyn EventSink) -> RewriteResult<()> {
        rewrite_visiting(self, change_set, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::TRUNK_BRANCH;
    use crate::schema::{SchemaRegistry, TypeDescriptor};

    #[test]
    fn test_renames_everywhere() {
        let mut renamer = TypeRenamer::new(BTreeMap::from([("Doc".to_string(), "Document".to_string())]));
        let cs = ChangeSet::new(2)
            .with_branch(BranchEvent::new(2, 2, TRUNK_BRANCH, 1).with_types(["Doc", "Memo"]))
            .with_creation(
                ItemCreation::new(2, ObjectBranchId::new(TRUNK_BRANCH, "Memo", "m"))
                    .with_value("about", ObjectBranchId::new(TRUNK_BRANCH, "Doc", "d").at(1)),
            )
            .with_deletion(ItemDeletion::new(2, ObjectBranchId::new(TRUNK_BRANCH, "Doc", "d")));

        let mut out = Vec::new();
        renamer.rewrite(cs, &mut out).unwrap();
        let cs = &out[0];
        assert!(cs.branch_events[0].branched_type_names.contains("Document"));
        assert!(!cs.branch_events[0].branched_type_names.contains("Doc"));
        assert_eq!(cs.deletions[0].object_id.object_type, "Document");
        assert_eq!(cs.creations[0].object_id.object_type, "Memo");
        assert_eq!(
            cs.creations[0].values["about"].as_key().map(|k| k.object_type.as_str()),
            Some("Document")
        );
    }

    #[test]
    fn test_unknown_source_type_rejected() {
        let registry = SchemaRegistry::from_types(vec![TypeDescriptor::new("Doc")]).unwrap();
        let renames = BTreeMap::from([("Ghost".to_string(), "Spirit".to_string())]);
        assert!(TypeRenamer::checked(renames, &registry).is_err());
    }
}
