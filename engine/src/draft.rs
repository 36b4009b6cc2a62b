//! Form drafts: the in-progress copy of a record while adding or editing.

use crate::record::Attributes;
use crate::schema::{is_blank, DraftSchema};
use crate::Record;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Whether a draft creates a new record or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftMode {
    Create,
    Edit,
}

/// Field values typed into the add/edit form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormDraft {
    values: Map<String, Value>,
}

impl FormDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object. Non-object values give an empty draft.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(values) => Self { values },
            _ => Self::default(),
        }
    }

    /// Fresh add draft filled with the schema defaults.
    pub fn from_defaults(schema: &DraftSchema) -> Self {
        let values = schema
            .fields
            .iter()
            .map(|field| (field.name.clone(), field.default.clone()))
            .collect();
        Self { values }
    }

    /// Edit draft copied from a record.
    ///
    /// Only editable schema fields are copied. Sensitive fields are blanked;
    /// fields the record lacks fall back to the schema default.
    pub fn from_record(schema: &DraftSchema, record: &Record) -> Self {
        let values = schema
            .fields
            .iter()
            .filter(|field| field.editable)
            .map(|field| {
                let value = if field.sensitive {
                    Value::String(String::new())
                } else {
                    record
                        .get(&field.name)
                        .cloned()
                        .unwrap_or_else(|| field.default.clone())
                };
                (field.name.clone(), value)
            })
            .collect();
        Self { values }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(field.into(), value.into());
    }

    /// Builder-style setter.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Request body for a create or update.
    ///
    /// Updates leave out blank sensitive fields (an empty password means
    /// "keep the current one") and fields the schema marks create-only.
    pub fn to_payload(&self, schema: &DraftSchema, mode: DraftMode) -> Attributes {
        self.values
            .iter()
            .filter(|(name, value)| match (mode, schema.field(name)) {
                (DraftMode::Edit, Some(field)) => {
                    field.editable && !(field.sensitive && is_blank(value))
                }
                _ => true,
            })
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}
