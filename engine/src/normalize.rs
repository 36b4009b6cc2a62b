//! Envelope normalization at the fetch boundary.
//!
//! Servers wrap records in many shapes (`[..]`, `{data: [..]}`,
//! `{data: {users: [..]}}`, `{user: {..}}`, ...). Everything is turned into
//! canonical [`Record`]s here so nothing downstream ever guesses at shapes.

use crate::{error::Result, Error, Record, Timestamp};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Generic list keys tried after the screen's own collection key.
const GENERIC_LIST_KEYS: [&str; 3] = ["items", "results", "docs"];

/// Keys that may hold the record id.
const ID_KEYS: [&str; 2] = ["id", "_id"];

/// Keys that may hold the creation time.
const CREATED_AT_KEYS: [&str; 2] = ["createdAt", "created_at"];

/// Envelope keys of one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeKeys {
    /// Key of the record list, e.g. `users`
    pub collection: String,
    /// Key of a single record, e.g. `user`
    pub record: String,
}

impl EnvelopeKeys {
    pub fn new(collection: impl Into<String>, record: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            record: record.into(),
        }
    }
}

/// Extract the record list from a collection response.
pub fn normalize_collection(value: Value, keys: &EnvelopeKeys) -> Result<Vec<Record>> {
    let items = take_list(value, keys)
        .ok_or_else(|| Error::InvalidEnvelope("no record list found in response".into()))?;
    items.into_iter().map(record_from_value).collect()
}

/// Extract a single record from a create/update response.
pub fn normalize_record(value: Value, keys: &EnvelopeKeys) -> Result<Record> {
    let object = take_object(value, keys)
        .ok_or_else(|| Error::InvalidEnvelope("no record object found in response".into()))?;
    record_from_object(object)
}

fn take_list(value: Value, keys: &EnvelopeKeys) -> Option<Vec<Value>> {
    let mut object = match value {
        Value::Array(items) => return Some(items),
        Value::Object(object) => object,
        _ => return None,
    };

    if let Some(data) = object.remove("data") {
        match data {
            Value::Array(items) => return Some(items),
            Value::Object(inner) => {
                if let Some(items) = take_list_field(inner, keys) {
                    return Some(items);
                }
            }
            _ => {}
        }
    }
    take_list_field(object, keys)
}

fn take_list_field(mut object: Map<String, Value>, keys: &EnvelopeKeys) -> Option<Vec<Value>> {
    std::iter::once(keys.collection.as_str())
        .chain(GENERIC_LIST_KEYS)
        .find_map(|key| match object.remove(key) {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        })
}

fn take_object(value: Value, keys: &EnvelopeKeys) -> Option<Map<String, Value>> {
    let Value::Object(mut object) = value else {
        return None;
    };

    if let Some(Value::Object(mut data)) = object.remove("data") {
        if let Some(Value::Object(record)) = data.remove(&keys.record) {
            return Some(record);
        }
        if has_id(&data) {
            return Some(data);
        }
    }
    if let Some(Value::Object(record)) = object.remove(&keys.record) {
        return Some(record);
    }
    has_id(&object).then_some(object)
}

fn has_id(object: &Map<String, Value>) -> bool {
    ID_KEYS.iter().any(|key| object.contains_key(*key))
}

/// Convert a single JSON value into a record.
pub fn record_from_value(value: Value) -> Result<Record> {
    match value {
        Value::Object(object) => record_from_object(object),
        other => Err(Error::InvalidEnvelope(format!(
            "expected a record object, got {}",
            json_type_name(&other)
        ))),
    }
}

fn record_from_object(mut object: Map<String, Value>) -> Result<Record> {
    let id = ID_KEYS
        .iter()
        .find_map(|key| object.remove(*key).and_then(id_string))
        .ok_or(Error::MissingId)?;
    // The alternate id key is an alias, not data.
    for key in ID_KEYS {
        object.remove(key);
    }

    // A null timestamp counts as absent.
    let mut created_at = None;
    for key in CREATED_AT_KEYS {
        match object.get(key) {
            None | Some(Value::Null) => continue,
            Some(value) => {
                created_at = Some(parse_timestamp(key, value)?);
                break;
            }
        }
    }

    let mut record = Record::new(id, object);
    record.created_at = created_at;
    Ok(record)
}

fn id_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse milliseconds or an RFC 3339 string.
///
/// Numbers may arrive as floats (`1.7e12`); fractional milliseconds are
/// truncated.
pub fn parse_timestamp(field: &str, value: &Value) -> Result<Timestamp> {
    let invalid = || Error::InvalidTimestamp {
        field: field.to_string(),
        value: value.to_string(),
    };
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|ms| ms.is_finite() && ms.abs() < i64::MAX as f64)
                    .map(|ms| ms.trunc() as i64)
            })
            .ok_or_else(invalid),
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .map(|dt| dt.timestamp_millis())
            .map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
