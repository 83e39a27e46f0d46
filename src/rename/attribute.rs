//! Attribute renaming for one type and its subtypes
//!
//! All renames of an event apply at once, so chains (`a -> b`, `b -> c`) and
//! swaps keep every value.

use std::collections::{BTreeMap, BTreeSet};

use crate::event::{ChangeSet, ItemCreation, ItemDeletion, ItemUpdate, ObjectBranchId, Values};
use crate::rewrite::{EventRewriter, EventSink, RewriteError, RewriteResult};
use crate::schema::TypeRegistry;
use crate::visit::{rewrite_visiting, EventVisitor, Outcome};

use super::require_types;

/// Renames attributes of one type and all of its subtypes.
#[derive(Debug, Clone)]
pub struct AttributeRenamer {
    types: BTreeSet<String>,
    renames: BTreeMap<String, String>,
}

impl AttributeRenamer {
    /// Applies to exactly the given types.
    pub fn new(types: BTreeSet<String>, renames: BTreeMap<String, String>) -> Self {
        Self { types, renames }
    }

    /// Applies to `type_name` and every registered subtype of it.
    pub fn for_type_hierarchy(
        type_name: &str,
        renames: BTreeMap<String, String>,
        registry: &dyn TypeRegistry,
    ) -> RewriteResult<Self> {
        let owner = type_name.to_string();
        require_types(registry, [&owner], "rename attributes of")?;
        let mut types = BTreeSet::new();
        for name in registry.type_names() {
            if registry.is_subtype_of(name, type_name)? {
                types.insert(name.to_string());
            }
        }
        Ok(Self::new(types, renames))
    }

    fn applies_to(&self, type_name: &str) -> bool {
        self.types.contains(type_name)
    }

    /// Moves every renamed value out first, then inserts under the targets.
    /// A target still held by an attribute that is not renamed is an error.
    fn rename_values(&self, object: &ObjectBranchId, values: &mut Values) -> RewriteResult<()> {
        let moved: Vec<_> = self
            .renames
            .iter()
            .filter_map(|(from, to)| values.remove(from).map(|value| (to, value)))
            .collect();
        for (to, value) in moved {
            if values.contains_key(to) {
                return Err(RewriteError::AttributeCollision {
                    attribute: to.clone(),
                    object: object.to_string(),
                });
            }
            values.insert(to.clone(), value);
        }
        Ok(())
    }
}

impl EventVisitor for AttributeRenamer {
    fn visit_deletion(&mut self, event: &mut ItemDeletion) -> RewriteResult<Outcome> {
        if self.applies_to(&event.object_id.object_type) {
            self.rename_values(&event.object_id, &mut event.values)?;
        }
        Ok(Outcome::Apply)
    }

    fn visit_creation(&mut self, event: &mut ItemCreation) -> RewriteResult<Outcome> {
        if self.applies_to(&event.object_id.object_type) {
            self.rename_values(&event.object_id, &mut event.values)?;
        }
        Ok(Outcome::Apply)
    }

    fn visit_update(&mut self, event: &mut ItemUpdate) -> RewriteResult<Outcome> {
        if self.applies_to(&event.object_id.object_type) {
            self.rename_values(&event.object_id, &mut event.values)?;
            if let Some(old_values) = event.old_values.as_mut() {
                self.rename_values(&event.object_id, old_values)?;
            }
        }
        Ok(Outcome::Apply)
    }
}

impl EventRewriter for AttributeRenamer {
    fn rewrite(&mut self, change_set: ChangeSet, sink: &mut dyn EventSink) -> RewriteResult<()> {
        rewrite_visiting(self, change_set, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Value, TRUNK_BRANCH};
    use crate::schema::{SchemaRegistry, TypeDescriptor};

    fn registry() -> SchemaRegistry {
        SchemaRegistry::from_types(vec![
            TypeDescriptor::new("Item"),
            TypeDescriptor::new("Doc").extends("Item"),
            TypeDescriptor::new("Person"),
        ])
        .unwrap()
    }

    #[test]
    fn test_renames_in_subtypes_only() {
        let renames = BTreeMap::from([("name".to_string(), "title".to_string())]);
        let mut renamer = AttributeRenamer::for_type_hierarchy("Item", renames, &registry()).unwrap();

        let cs = ChangeSet::new(1)
            .with_creation(ItemCreation::new(1, ObjectBranchId::new(TRUNK_BRANCH, "Doc", "d")).with_value("name", "x"))
            .with_creation(
                ItemCreation::new(1, ObjectBranchId::new(TRUNK_BRANCH, "Person", "p")).with_value("name", "y"),
            )
            .with_update(ItemUpdate::new(1, ObjectBranchId::new(TRUNK_BRANCH, "Doc", "e"), true).with_value(
                "name", "a", "b",
            ));

        let mut out = Vec::new();
        renamer.rewrite(cs, &mut out).unwrap();
        let cs = &out[0];
        assert!(cs.creations[0].values.contains_key("title"));
        assert!(!cs.creations[0].values.contains_key("name"));
        assert!(cs.creations[1].values.contains_key("name"));
        assert!(cs.updates[0].values.contains_key("title"));
        assert!(cs.updates[0].old_values.as_ref().is_some_and(|v| v.contains_key("title")));
    }

    fn rename_doc(renames: &[(&str, &str)], values: &[(&str, &str)]) -> RewriteResult<Values> {
        let renames = renames.iter().map(|(f, t)| (f.to_string(), t.to_string())).collect();
        let mut renamer = AttributeRenamer::new(BTreeSet::from(["Doc".to_string()]), renames);
        let creation = values.iter().fold(
            ItemCreation::new(1, ObjectBranchId::new(TRUNK_BRANCH, "Doc", "d")),
            |creation, (name, value)| creation.with_value(*name, *value),
        );
        let mut out = Vec::new();
        renamer.rewrite(ChangeSet::new(1).with_creation(creation), &mut out)?;
        Ok(out.remove(0).creations.remove(0).values)
    }

    #[test]
    fn test_chained_renames_keep_every_value() {
        let values = rename_doc(&[("a", "b"), ("b", "c")], &[("a", "A"), ("b", "B")]).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values["b"], Value::from("A"));
        assert_eq!(values["c"], Value::from("B"));
    }

    #[test]
    fn test_swapped_attributes() {
        let values = rename_doc(&[("a", "b"), ("b", "a")], &[("a", "A"), ("b", "B")]).unwrap();
        assert_eq!(values["a"], Value::from("B"));
        assert_eq!(values["b"], Value::from("A"));
    }

    #[test]
    fn test_rename_onto_kept_attribute_fails() {
        let err = rename_doc(&[("a", "b")], &[("a", "A"), ("b", "B")]).unwrap_err();
        assert_eq!(err.code(), "HR_REWRITE_ATTRIBUTE_COLLISION");
        assert!(err.to_string().contains("'b'"));
    }

    #[test]
    fn test_unknown_owner_rejected() {
        let err = AttributeRenamer::for_type_hierarchy("Ghost", BTreeMap::new(), &registry()).unwrap_err();
        assert_eq!(err.code(), "HR_REWRITE_CONFIGURATION");
    }
}
