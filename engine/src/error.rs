//! Error types for the Roster engine.
//!
//! [`Error`] covers misuse of the engine (bad configuration, invalid state
//! transitions, malformed envelopes). [`ViewError`] is the user-facing
//! failure taxonomy that the view keeps as `lastError`.

use crate::{BucketId, RecordId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All possible errors from the Roster engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Configuration errors
    #[error("unknown bucket: {0}")]
    UnknownBucket(BucketId),

    #[error("page size must be positive")]
    InvalidPageSize,

    #[error("bucket '{0}' is reserved")]
    ReservedBucket(BucketId),

    #[error("bucket '{0}' is defined twice")]
    DuplicateBucket(BucketId),

    // Ingestion errors
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),

    #[error("record is missing an id")]
    MissingId,

    #[error("invalid timestamp for field '{field}': {value}")]
    InvalidTimestamp { field: String, value: String },

    // State errors
    #[error("record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("cannot {action} while in {mode} mode")]
    InvalidTransition { action: String, mode: String },

    #[error("a submit is already in flight")]
    SubmitInFlight,

    #[error("view has been torn down")]
    ViewTornDown,
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A validation message attached to a single form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// User-visible failure surfaced through the presentation snapshot.
///
/// Every variant leaves the view in its last consistent state; none of them
/// is fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ViewError {
    /// Initial load or refresh failed. The store keeps its previous content.
    #[error("failed to load records: {message}")]
    Fetch { message: String },

    /// Create or update was rejected by the server.
    #[error("failed to save record: {message}")]
    #[serde(rename_all = "camelCase")]
    Mutation {
        message: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        field_errors: Vec<FieldError>,
    },

    /// The session was rejected; eviction is handled by the session owner.
    #[error("not authorized: {message}")]
    Auth { message: String },

    /// Local validation failed before any request was sent.
    #[error("{} field(s) failed validation", .field_errors.len())]
    #[serde(rename_all = "camelCase")]
    Validation { field_errors: Vec<FieldError> },
}

impl ViewError {
    pub fn fetch(message: impl Into<String>) -> Self {
        ViewError::Fetch {
            message: message.into(),
        }
    }

    pub fn mutation(message: impl Into<String>) -> Self {
        ViewError::Mutation {
            message: message.into(),
            field_errors: Vec::new(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        ViewError::Auth {
            message: message.into(),
        }
    }

    /// Per-field messages, if the failure carries any.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ViewError::Mutation { field_errors, .. } | ViewError::Validation { field_errors } => {
                field_errors
            }
            _ => &[],
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ViewError::Auth { .. })
    }
}
