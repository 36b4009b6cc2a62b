//! Reconciliation of server mutation results into the record store.
//!
//! # Rules
//!
//! 1. Merges are keyed by record id, so replaying a result never duplicates
//! 2. A created record is inserted at its sort position
//! 3. An updated record is shallow-merged in place; fields the server left
//!    out keep their local values
//! 4. An update for an id the store no longer holds is inserted
//! 5. A create whose id already exists is merged like an update

use crate::store::Placement;
use crate::{MutationKind, Record, RecordId, RecordStore};
use serde::{Deserialize, Serialize};

/// What a merge did to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileResult {
    /// The record that was merged
    pub record_id: RecordId,
    /// Mutation the result came from
    pub kind: MutationKind,
    /// Where the record now sits in the store
    pub placement: Placement,
}

impl ReconcileResult {
    /// Whether the store grew.
    pub fn inserted(&self) -> bool {
        matches!(self.placement, Placement::Inserted { .. })
    }
}

/// Applies server results to a store.
pub struct Reconciler<'a> {
    store: &'a mut RecordStore,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a mut RecordStore) -> Self {
        Self { store }
    }

    /// Merge a server result.
    pub fn apply(&mut self, kind: MutationKind, record: Record) -> ReconcileResult {
        let record_id = record.id.clone();
        let placement = match kind {
            MutationKind::Create if !self.store.contains(&record_id) => self.store.upsert(record),
            MutationKind::Create | MutationKind::Update => self.store.merge(record),
        };
        ReconcileResult {
            record_id,
            kind,
            placement,
        }
    }
}

/// Convenience wrapper around [`Reconciler::apply`].
pub fn reconcile(store: &mut RecordStore, kind: MutationKind, record: Record) -> ReconcileResult {
    Reconciler::new(store).apply(kind, record)
}
