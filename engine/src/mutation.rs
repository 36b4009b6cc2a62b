//! Mutation requests produced by a form submit.
//!
//! The view never talks to the server itself. Submitting a draft yields a
//! [`PendingSubmit`] describing what to send; the caller performs the
//! round-trip and hands the result back with the same ticket.

use crate::record::Attributes;
use crate::RecordId;
use serde::{Deserialize, Serialize};

/// Identifies one submit round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubmitTicket(pub u64);

/// Kind of mutation, used when merging the server's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    Create,
    Update,
}

/// A create or update to send to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Mutation {
    Create { payload: Attributes },
    Update { id: RecordId, payload: Attributes },
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Create { .. } => MutationKind::Create,
            Mutation::Update { .. } => MutationKind::Update,
        }
    }

    /// Target record of an update.
    pub fn record_id(&self) -> Option<&RecordId> {
        match self {
            Mutation::Create { .. } => None,
            Mutation::Update { id, .. } => Some(id),
        }
    }

    pub fn payload(&self) -> &Attributes {
        match self {
            Mutation::Create { payload } | Mutation::Update { payload, .. } => payload,
        }
    }
}

/// A validated submit waiting for its server round-trip.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmit {
    pub ticket: SubmitTicket,
    pub mutation: Mutation,
}
