//! Pagination window over a filtered record list.
//!
//! Pages are 1-indexed. [`paginate`] clamps whatever page the caller asks
//! for into range and reports the clamped page back, so a shrinking filter
//! never leaves the view on an empty out-of-range page.

use crate::{Error, Record};
use serde::{Deserialize, Serialize};

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Result of slicing a filtered list.
#[derive(Debug, Clone, PartialEq)]
pub struct PageWindow<'a> {
    pub page_items: Vec<&'a Record>,
    pub total_pages: usize,
    pub clamped_page: usize,
}

/// Number of pages for `len` items; never less than one.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    len.div_ceil(page_size).max(1)
}

/// Clamp `page` into `[1, total_pages]`.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Slice `filtered` into the requested page.
pub fn paginate<'a>(filtered: &[&'a Record], page_size: usize, current_page: usize) -> PageWindow<'a> {
    let total = total_pages(filtered.len(), page_size);
    let clamped = clamp_page(current_page, total);
    let start = (clamped - 1).saturating_mul(page_size).min(filtered.len());
    let end = start.saturating_add(page_size).min(filtered.len());

    PageWindow {
        page_items: filtered[start..end].to_vec(),
        total_pages: total,
        clamped_page: clamped,
    }
}

/// Page size and current page of one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    page_size: usize,
    current_page: usize,
}

impl Pagination {
    /// Create pagination on page 1. A zero page size is rejected.
    pub fn new(page_size: usize) -> crate::error::Result<Self> {
        if page_size == 0 {
            return Err(Error::InvalidPageSize);
        }
        Ok(Self {
            page_size,
            current_page: 1,
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self, len: usize) -> usize {
        total_pages(len, self.page_size)
    }

    /// Back to page 1.
    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Re-clamp after the filtered length changed. Returns the new page.
    pub fn reclamp(&mut self, len: usize) -> usize {
        self.current_page = clamp_page(self.current_page, self.total_pages(len));
        self.current_page
    }

    /// Move to page `n` if it exists; otherwise leave the state unchanged.
    ///
    /// Returns whether the page changed.
    pub fn go_to(&mut self, n: usize, len: usize) -> bool {
        if n == 0 || n > self.total_pages(len) || n == self.current_page {
            return false;
        }
        self.current_page = n;
        true
    }

    /// Move to page `n`, clamping out-of-range requests. Returns the page.
    pub fn go_to_clamped(&mut self, n: usize, len: usize) -> usize {
        self.current_page = clamp_page(n, self.total_pages(len));
        self.current_page
    }

    pub fn next(&mut self, len: usize) -> bool {
        self.go_to(self.current_page + 1, len)
    }

    pub fn prev(&mut self, len: usize) -> bool {
        match self.current_page.checked_sub(1) {
            Some(n) => self.go_to(n, len),
            None => false,
        }
    }
}

/// One rendered row: a record or a layout-only placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PageRow {
    Record { record: Record },
    /// Filler row with no identity; never editable or reconcilable.
    Placeholder,
}

impl PageRow {
    pub fn record(&self) -> Option<&Record> {
        match self {
            PageRow::Record { record } => Some(record),
            PageRow::Placeholder => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, PageRow::Placeholder)
    }
}

/// Turn page items into rows, padding with placeholders up to `page_size`
/// when `pad` is set.
pub fn to_rows(page_items: &[&Record], page_size: usize, pad: bool) -> Vec<PageRow> {
    let mut rows: Vec<PageRow> = page_items
        .iter()
        .map(|record| PageRow::Record {
            record: (*record).clone(),
        })
        .collect();
    if pad {
        while rows.len() < page_size {
            rows.push(PageRow::Placeholder);
        }
    }
    rows
}
