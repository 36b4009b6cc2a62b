//! Draft schemas and local validation.
//!
//! A screen's schema lists the fields its add/edit form works with. It
//! supplies defaults for new drafts, decides which fields are copied into an
//! edit draft (and which are blanked as sensitive), and validates a draft
//! before anything is sent to the server.

use crate::draft::{DraftMode, FormDraft};
use crate::error::FieldError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Kinds of form fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Number,
    Bool,
    /// One of a closed set of strings
    Choice { options: Vec<String> },
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Text => write!(f, "Text"),
            FieldKind::Email => write!(f, "Email"),
            FieldKind::Password => write!(f, "Password"),
            FieldKind::Number => write!(f, "Number"),
            FieldKind::Bool => write!(f, "Bool"),
            FieldKind::Choice { .. } => write!(f, "Choice"),
        }
    }
}

/// Definition of a form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    /// Field name, identical to the record attribute
    pub name: String,
    /// Field kind
    pub kind: FieldKind,
    /// Whether the field must be filled in
    pub required: bool,
    /// Blanked when editing, and left out of updates while blank
    pub sensitive: bool,
    /// Copied into edit drafts and sent with updates
    pub editable: bool,
    /// Value of the field in a fresh add draft
    pub default: Value,
}

impl FieldDef {
    /// Create a new required field definition.
    pub fn required(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            sensitive: matches!(kind, FieldKind::Password),
            name: name.into(),
            kind,
            required: true,
            editable: true,
            default: Value::String(String::new()),
        }
    }

    /// Create a new optional field definition.
    pub fn optional(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind)
        }
    }

    /// Builder-style default value.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    /// Builder-style flag: not copied into edit drafts, not sent on update.
    pub fn create_only(mut self) -> Self {
        self.editable = false;
        self
    }

    /// Validate one value. Returns the first problem found for this field.
    pub fn validate(&self, value: Option<&Value>, mode: DraftMode) -> Option<FieldError> {
        if mode == DraftMode::Edit && !self.editable {
            return None;
        }
        let value = match value {
            Some(v) if !is_blank(v) => v,
            _ => {
                let required = self.required && !(mode == DraftMode::Edit && self.sensitive);
                return required.then(|| FieldError::new(&self.name, "is required"));
            }
        };
        self.validate_kind(value)
            .err()
            .map(|message| FieldError::new(&self.name, message))
    }

    fn validate_kind(&self, value: &Value) -> std::result::Result<(), String> {
        match &self.kind {
            FieldKind::Text => match value {
                Value::String(_) => Ok(()),
                _ => Err("must be text".into()),
            },
            FieldKind::Email => match value.as_str() {
                Some(s) if EMAIL_RE.is_match(s.trim()) => Ok(()),
                _ => Err("must be a valid email address".into()),
            },
            FieldKind::Password => match value.as_str() {
                Some(s) if is_strong_password(s) => Ok(()),
                _ => Err(format!(
                    "must be at least {MIN_PASSWORD_LEN} characters and include an upper-case letter, a lower-case letter and a digit"
                )),
            },
            FieldKind::Number => {
                let numeric = match value {
                    Value::Number(_) => true,
                    Value::String(s) => s.trim().parse::<f64>().is_ok(),
                    _ => false,
                };
                if numeric {
                    Ok(())
                } else {
                    Err("must be a number".into())
                }
            }
            FieldKind::Bool => match value {
                Value::Bool(_) => Ok(()),
                _ => Err("must be true or false".into()),
            },
            FieldKind::Choice { options } => match value.as_str() {
                Some(s) if options.iter().any(|o| o == s) => Ok(()),
                _ => Err(format!("must be one of: {}", options.join(", "))),
            },
        }
    }
}

/// Null or whitespace-only string.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
        && password.chars().any(|c| c.is_uppercase())
        && password.chars().any(|c| c.is_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// Form schema of one screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSchema {
    pub fields: Vec<FieldDef>,
}

impl DraftSchema {
    pub fn new(fields: Vec<FieldDef>) -> Self {
        Self { fields }
    }

    /// Builder-style method to add a field.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validate every field, collecting all problems.
    pub fn validate(&self, draft: &FormDraft, mode: DraftMode) -> Vec<FieldError> {
        self.fields
            .iter()
            .filter_map(|field| field.validate(draft.get(&field.name), mode))
            .collect()
    }
}
