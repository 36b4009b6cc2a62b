//! Unified error handling for the client.

use roster_engine::{FieldError, ViewError};
use serde::Deserialize;
use serde_json::Value;

/// Where a failure happened; decides how it is shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Mutation,
}

/// Client error type.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Request rejected ({status}): {message}")]
    Rejected {
        status: u16,
        message: String,
        field_errors: Vec<FieldError>,
    },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Engine error: {0}")]
    Engine(#[from] roster_engine::Error),
}

impl ClientError {
    /// Map onto the user-visible error taxonomy.
    pub fn into_view_error(self, stage: Stage) -> ViewError {
        match (self, stage) {
            (ClientError::Unauthorized, _) => {
                ViewError::auth("Your session has expired. Please sign in again.")
            }
            (
                ClientError::Rejected {
                    message,
                    field_errors,
                    ..
                },
                Stage::Mutation,
            ) => ViewError::Mutation {
                message,
                field_errors,
            },
            (error, Stage::Fetch) => ViewError::fetch(error.to_string()),
            (error, Stage::Mutation) => ViewError::mutation(error.to_string()),
        }
    }

    /// Build a rejection from a non-success response body.
    pub fn rejected(status: u16, body: &str) -> Self {
        let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
        let (message, field_errors) = match parsed {
            Some(body) => {
                let message = body
                    .message
                    .or(body.error)
                    .unwrap_or_else(|| default_message(status));
                (message, body.errors.map(field_errors).unwrap_or_default())
            }
            None if body.trim().is_empty() => (default_message(status), Vec::new()),
            None => (body.trim().to_string(), Vec::new()),
        };
        ClientError::Rejected {
            status,
            message,
            field_errors,
        }
    }
}

fn default_message(status: u16) -> String {
    format!("request failed with status {status}")
}

/// Common error body shapes: `{message}`, `{error}`, optional `errors`.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
    errors: Option<Value>,
}

/// Accepts `{"field": "msg"}`, `{"field": ["msg", ..]}` and
/// `[{"field": .., "message": ..}]`.
fn field_errors(value: Value) -> Vec<FieldError> {
    match value {
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(field, message)| {
                let message = match message {
                    Value::String(s) => s,
                    Value::Array(items) => items.into_iter().find_map(|v| match v {
                        Value::String(s) => Some(s),
                        _ => None,
                    })?,
                    _ => return None,
                };
                Some(FieldError::new(field, message))
            })
            .collect(),
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| {
                let field = item.get("field")?.as_str()?.to_string();
                let message = item.get("message")?.as_str()?.to_string();
                Some(FieldError::new(field, message))
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Result type alias for the client.
pub type Result<T> = std::result::Result<T, ClientError>;
