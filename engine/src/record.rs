//! Record type held by the store.

use crate::{RecordId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::cmp::Ordering;

/// Attribute bag of a record: field name to primitive JSON value.
pub type Attributes = Map<String, Value>;

/// A server-owned entity shown in a management list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Server-assigned identifier, never reassigned
    pub id: RecordId,
    /// Creation time in milliseconds since epoch, when the server reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    /// Every other field the server returned
    #[serde(default)]
    pub attributes: Attributes,
}

impl Record {
    /// Create a record without a creation timestamp.
    pub fn new(id: impl Into<RecordId>, attributes: Attributes) -> Self {
        Self {
            id: id.into(),
            created_at: None,
            attributes,
        }
    }

    /// Create a record from a JSON object literal. Non-object values yield
    /// an empty attribute bag.
    pub fn from_json(id: impl Into<RecordId>, attributes: Value) -> Self {
        let attributes = match attributes {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(id, attributes)
    }

    /// Builder-style setter for the creation timestamp.
    pub fn with_created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Raw attribute value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }

    /// Set a single attribute.
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.attributes.insert(field.into(), value);
    }

    /// Textual form of a primitive attribute.
    ///
    /// Strings are borrowed; numbers and booleans are rendered. Null,
    /// missing, array and object values have no text.
    pub fn text(&self, field: &str) -> Option<Cow<'_, str>> {
        match self.attributes.get(field)? {
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Bool(b) => Some(Cow::Owned(b.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Numeric attribute, accepting numeric strings.
    pub fn number(&self, field: &str) -> Option<f64> {
        match self.attributes.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Shallow-merge a newer copy of this record into self.
    ///
    /// Fields present in `newer` override; fields it omits keep their
    /// current value. The id and `created_at` never change: the store's
    /// ordering is keyed on them.
    pub fn merge_from(&mut self, newer: Record) {
        for (field, value) in newer.attributes {
            self.attributes.insert(field, value);
        }
    }

    /// Newest-first ordering: later `created_at` first, records without a
    /// timestamp after those with one, ties broken by descending id.
    pub fn cmp_newest_first(&self, other: &Record) -> Ordering {
        other
            .created_at
            .cmp(&self.created_at)
            .then_with(|| other.id.cmp(&self.id))
    }
}
