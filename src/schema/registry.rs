//! Type registry
//!
//! The registry is an external collaborator: rewriters only need to resolve a
//! type by name and walk its supertype chain. `SchemaRegistry` is the
//! in-memory implementation loaded from schema files.

use std::collections::{BTreeSet, HashMap, HashSet};

use super::errors::{SchemaError, SchemaResult};
use super::types::{AttributeKind, TypeDescriptor};

/// Read access to a schema of object types.
pub trait TypeRegistry {
    /// Resolve a type by name.
    fn resolve_type(&self, name: &str) -> SchemaResult<&TypeDescriptor>;

    /// Supertypes of `ty`, nearest first. `ty` itself is not included.
    fn supertypes(&self, ty: &TypeDescriptor) -> SchemaResult<Vec<&TypeDescriptor>>;

    /// Names of all known types, sorted.
    fn type_names(&self) -> Vec<&str>;

    /// Whether a type with this name exists.
    fn contains_type(&self, name: &str) -> bool {
        self.resolve_type(name).is_ok()
    }

    /// Attributes of the given kind declared by the type or any supertype.
    fn inherited_attributes(&self, name: &str, kind: AttributeKind) -> SchemaResult<BTreeSet<String>> {
        let ty = self.resolve_type(name)?;
        let mut result: BTreeSet<String> = ty.attributes_of_kind(kind).map(str::to_string).collect();
        for supertype in self.supertypes(ty)? {
            result.extend(supertype.attributes_of_kind(kind).map(str::to_string));
        }
        Ok(result)
    }

    /// Whether `name` is `ancestor` or one of its subtypes.
    fn is_subtype_of(&self, name: &str, ancestor: &str) -> SchemaResult<bool> {
        if name == ancestor {
            return Ok(true);
        }
        let ty = self.resolve_type(name)?;
        Ok(self.supertypes(ty)?.iter().any(|s| s.name == ancestor))
    }
}

/// In-memory type registry.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    types: HashMap<String, TypeDescriptor>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from descriptors and validate the hierarchy.
    pub fn from_types(types: impl IntoIterator<Item = TypeDescriptor>) -> SchemaResult<Self> {
        let mut registry = Self::new();
        for ty in types {
            registry.register(ty)?;
        }
        registry.validate()?;
        Ok(registry)
    }

    /// Registers a type. Types are immutable once registered.
    pub fn register(&mut self, ty: TypeDescriptor) -> SchemaResult<()> {
        if self.types.contains_key(&ty.name) {
            return Err(SchemaError::DuplicateType(ty.name));
        }
        self.types.insert(ty.name.clone(), ty);
        Ok(())
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no type is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Checks that every supertype exists and no hierarchy is cyclic.
    pub fn validate(&self) -> SchemaResult<()> {
        for ty in self.types.values() {
            self.supertypes(ty)?;
        }
        Ok(())
    }
}

impl TypeRegistry for SchemaRegistry {
    fn resolve_type(&self, name: &str) -> SchemaResult<&TypeDescriptor> {
        self.types
            .get(name)
            .ok_or_else(|| SchemaError::UnknownType(name.to_string()))
    }

    fn supertypes(&self, ty: &TypeDescriptor) -> SchemaResult<Vec<&TypeDescriptor>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(ty.name.as_str());

        let mut current = ty;
        while let Some(parent_name) = current.supertype.as_deref() {
            let parent = self
                .types
                .get(parent_name)
                .ok_or_else(|| SchemaError::UnknownSupertype {
                    type_name: current.name.clone(),
                    supertype: parent_name.to_string(),
                })?;
            if !seen.insert(parent.name.as_str()) {
                return Err(SchemaError::CyclicHierarchy(ty.name.clone()));
            }
            chain.push(parent);
            current = parent;
        }
        Ok(chain)
    }

    fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
