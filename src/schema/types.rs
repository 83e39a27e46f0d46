//! Type descriptors
//!
//! A type names its attributes and at most one supertype. Attributes carry a
//! kind so the renumbering engines can find revision- and branch-valued
//! attributes without extra configuration.

use serde::{Deserialize, Serialize};

/// What an attribute holds, as far as history rewriting is concerned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    /// Plain data
    #[default]
    Value,
    /// An integer revision number
    Revision,
    /// An `ObjectKey` reference to another object
    Reference,
}

/// Attribute definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDef {
    /// Attribute name
    pub name: String,
    /// Attribute kind, `value` if omitted
    #[serde(default)]
    pub kind: AttributeKind,
}

impl AttributeDef {
    /// Create a plain value attribute
    pub fn value(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Value,
        }
    }

    /// Create a revision-valued attribute
    pub fn revision(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Revision,
        }
    }

    /// Create a reference attribute
    pub fn reference(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Reference,
        }
    }
}

/// Description of one object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Unique type name
    pub name: String,
    /// Direct supertype, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supertype: Option<String>,
    /// Attributes declared by this type (inherited ones are not repeated)
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
}

impl TypeDescriptor {
    /// Create a root type without attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supertype: None,
            attributes: Vec::new(),
        }
    }

    /// Builder-style supertype setter.
    pub fn extends(mut self, supertype: impl Into<String>) -> Self {
        self.supertype = Some(supertype.into());
        self
    }

    /// Builder-style attribute adder.
    pub fn with_attribute(mut self, attribute: AttributeDef) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Whether this type itself declares the attribute.
    pub fn declares(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|a| a.name == attribute)
    }

    /// Names of the declared attributes of the given kind.
    pub fn attributes_of_kind(&self, kind: AttributeKind) -> impl Iterator<Item = &str> {
        self.attributes
            .iter()
            .filter(move |a| a.kind == kind)
            .map(|a| a.name.as_str())
    }
}
