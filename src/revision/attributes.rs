//! Lookup of revision-valued attributes per type
//!
//! Sources, merged per type and inherited down the supertype chain:
//! - the configured map of type name to attribute names
//! - attributes the type registry declares with kind `revision`
//!
//! The supertype chains are captured once at construction. Merged sets are
//! memoized per type name on first use.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use crate::rewrite::{RewriteError, RewriteResult};
use crate::schema::{AttributeKind, TypeRegistry};

#[derive(Debug, Clone, Default)]
pub struct RevisionAttributes {
    declared: HashMap<String, BTreeSet<String>>,
    supertypes: HashMap<String, Vec<String>>,
    cache: HashMap<String, Arc<BTreeSet<String>>>,
}

impl RevisionAttributes {
    /// No revision-valued attributes at all. Only object keys are remapped.
    pub fn none() -> Self {
        Self::default()
    }

    /// Configured attributes without a registry. No inheritance.
    pub fn from_config(configured: BTreeMap<String, BTreeSet<String>>) -> Self {
        Self {
            declared: configured.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Configured attributes merged with the registry's declarations.
    ///
    /// Every configured type must exist in the registry.
    pub fn with_registry(
        configured: BTreeMap<String, BTreeSet<String>>,
        registry: &dyn TypeRegistry,
    ) -> RewriteResult<Self> {
        for type_name in configured.keys() {
            if !registry.contains_type(type_name) {
                return Err(RewriteError::configuration(format!(
                    "revision attributes configured for unknown type '{}'",
                    type_name
                )));
            }
        }

        let mut declared: HashMap<String, BTreeSet<String>> = configured.into_iter().collect();
        let mut supertypes = HashMap::new();
        for name in registry.type_names() {
            let ty = registry.resolve_type(name)?;
            let own: Vec<String> = ty
                .attributes_of_kind(AttributeKind::Revision)
                .map(str::to_string)
                .collect();
            if !own.is_empty() {
                declared.entry(name.to_string()).or_default().extend(own);
            }
            let chain = registry.supertypes(ty)?.into_iter().map(|s| s.name.clone()).collect();
            supertypes.insert(name.to_string(), chain);
        }

        Ok(Self {
            declared,
            supertypes,
            cache: HashMap::new(),
        })
    }

    /// Revision-valued attributes of `type_name`, including inherited ones.
    pub fn for_type(&mut self, type_name: &str) -> Arc<BTreeSet<String>> {
        if let Some(hit) = self.cache.get(type_name) {
            return Arc::clone(hit);
        }
        let mut merged = self.declared.get(type_name).cloned().unwrap_or_default();
        if let Some(chain) = self.supertypes.get(type_name) {
            for supertype in chain {
                if let Some(attrs) = self.declared.get(supertype) {
                    merged.extend(attrs.iter().cloned());
                }
            }
        }
        let merged = Arc::new(merged);
        self.cache.insert(type_name.to_string(), Arc::clone(&merged));
        merged
    }
}
