//! Presentation snapshot of a list view.
//!
//! One snapshot is everything a renderer needs for a frame. It is plain data
//! and serializes to camelCase JSON for hosts outside Rust.

use crate::filter::BucketInfo;
use crate::pagination::PageRow;
use crate::{BucketId, FormDraft, RecordId, ViewError};
use serde::{Deserialize, Serialize};

/// View-mode state machine: `list → add → list`, `list → edit → list`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum ViewMode {
    #[default]
    List,
    Add,
    Edit { id: RecordId },
}

impl ViewMode {
    pub fn name(&self) -> &'static str {
        match self {
            ViewMode::List => "list",
            ViewMode::Add => "add",
            ViewMode::Edit { .. } => "edit",
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, ViewMode::List)
    }
}

/// Render state of one list view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    /// Rows of the current page, possibly padded with placeholders
    pub page_items: Vec<PageRow>,
    pub total_pages: usize,
    /// Current page after clamping
    pub clamped_page: usize,
    pub page_size: usize,
    /// A debounced search recomputation is pending
    pub is_filtering: bool,
    pub is_loading: bool,
    pub is_submitting: bool,
    pub active_bucket: BucketId,
    pub buckets: Vec<BucketInfo>,
    /// Search input as typed (may be ahead of the applied term)
    pub search_term: String,
    pub view_mode: ViewMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_draft: Option<FormDraft>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<ViewError>,
    /// Records in the store
    pub total_records: usize,
    /// Records passing the active filter
    pub filtered_count: usize,
}

impl ViewSnapshot {
    /// Records on the current page, placeholders skipped.
    pub fn records(&self) -> impl Iterator<Item = &crate::Record> {
        self.page_items.iter().filter_map(PageRow::record)
    }

    /// Ids on the current page, placeholders skipped.
    pub fn record_ids(&self) -> Vec<&str> {
        self.records().map(|r| r.id.as_str()).collect()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
