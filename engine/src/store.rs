//! Record store - the authoritative in-memory copy of a collection.
//!
//! The store keeps records in display order together with an id index.
//! It is filled by a full fetch and afterwards only changed one record at a
//! time by reconciliation. It is never persisted.

use crate::{Record, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How the store orders its records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    /// Newest `createdAt` first, falling back to descending id (default)
    #[default]
    NewestFirst,
    /// Keep the server's order; new records go to the front
    AsReceived,
}

/// Where a record landed after an insert or replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Placement {
    Inserted { index: usize },
    Replaced { index: usize },
}

impl Placement {
    pub fn index(&self) -> usize {
        match self {
            Placement::Inserted { index } | Placement::Replaced { index } => *index,
        }
    }
}

/// Ordered record collection keyed by id.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    order: SortOrder,
    records: Vec<Record>,
    index: HashMap<RecordId, usize>,
}

impl RecordStore {
    /// Create an empty store.
    pub fn new(order: SortOrder) -> Self {
        Self {
            order,
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// Replace the whole collection with a fresh fetch.
    ///
    /// Duplicate ids keep the last occurrence's content at the first
    /// occurrence's position.
    pub fn replace_all(&mut self, records: Vec<Record>) {
        self.records.clear();
        self.index.clear();
        for record in records {
            match self.index.get(&record.id) {
                Some(&i) => self.records[i] = record,
                None => {
                    self.index.insert(record.id.clone(), self.records.len());
                    self.records.push(record);
                }
            }
        }
        if self.order == SortOrder::NewestFirst {
            self.records.sort_by(Record::cmp_newest_first);
            self.reindex();
        }
    }

    /// Insert a new record at its sort position, or replace the record with
    /// the same id in place.
    pub fn upsert(&mut self, record: Record) -> Placement {
        if let Some(&index) = self.index.get(&record.id) {
            self.records[index] = record;
            return Placement::Replaced { index };
        }
        let index = self.insertion_point(&record);
        self.records.insert(index, record);
        self.reindex();
        Placement::Inserted { index }
    }

    /// Shallow-merge `record` into the existing record with the same id,
    /// keeping its position. Inserts when the id is unknown.
    pub fn merge(&mut self, record: Record) -> Placement {
        match self.index.get(&record.id) {
            Some(&index) => {
                self.records[index].merge_from(record);
                Placement::Replaced { index }
            }
            None => self.upsert(record),
        }
    }

    fn insertion_point(&self, record: &Record) -> usize {
        match self.order {
            SortOrder::NewestFirst => self
                .records
                .partition_point(|existing| existing.cmp_newest_first(record).is_lt()),
            SortOrder::AsReceived => 0,
        }
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, record) in self.records.iter().enumerate() {
            self.index.insert(record.id.clone(), i);
        }
    }

    /// Get a record by id.
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Records in store order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop everything (view teardown).
    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }
}
