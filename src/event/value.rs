//! Attribute values carried by item events

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ids::ObjectKey;

/// Attribute name to value mapping. Ordered so serialized output is deterministic.
pub type Values = BTreeMap<String, Value>;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer (revision-valued attributes use this)
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Reference to a specific revision of another object
    Key(ObjectKey),
    /// Stands for the revision of the commit that stores this value.
    /// Resolved by the destination store, never renumbered.
    NextCommitNumber,
}

impl Value {
    /// Returns the referenced key, if this value is a reference.
    pub fn as_key(&self) -> Option<&ObjectKey> {
        match self {
            Value::Key(key) => Some(key),
            _ => None,
        }
    }

    /// Returns the integer, if this value is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Short name of the variant for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Key(_) => "key",
            Value::NextCommitNumber => "next_commit_number",
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<ObjectKey> for Value {
    fn from(v: ObjectKey) -> Self {
        Value::Key(v)
    }
}
