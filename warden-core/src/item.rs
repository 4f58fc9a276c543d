//! Opaque stored records, as seen by ownership resolution.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Numeric user identifier.
pub type UserId = i64;

/// Primary key of a stored item.
pub type ItemKey = i64;

/// Field holding an item's own primary key.
pub const ID_FIELD: &str = "id";

/// A key-value record belonging to one resource type.
///
/// Storage owns the item; the policy core only reads the fields named in
/// ownership paths and never mutates them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item {
    fields: Map<String, Value>,
}

impl Item {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an item from a JSON object. Returns `None` for any other shape.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Set a field, builder style.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// The item's own key, read from [`ID_FIELD`].
    pub fn key(&self) -> Option<ItemKey> {
        self.get(ID_FIELD).and_then(as_id)
    }

    /// Identifiers stored in `field`.
    ///
    /// Integers and numeric strings are read directly; arrays contribute each
    /// readable element. Absent, `null`, or any other shape yields nothing.
    pub fn ids(&self, field: &str) -> Vec<i64> {
        match self.get(field) {
            Some(Value::Array(values)) => values.iter().filter_map(as_id).collect(),
            Some(value) => as_id(value).into_iter().collect(),
            None => Vec::new(),
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

fn as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
