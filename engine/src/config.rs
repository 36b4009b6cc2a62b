//! Per-screen configuration of the list engine.

use crate::debounce::DEFAULT_DEBOUNCE_MS;
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::{error::Result, DraftSchema, EnvelopeKeys, Error, FilterConfig, SortOrder};

/// Everything that differs between management screens.
#[derive(Debug, Clone)]
pub struct ScreenConfig {
    /// Screen name, used in logs
    pub name: String,
    /// Buckets and searchable fields
    pub filter: FilterConfig,
    /// Order of the record store
    pub sort_order: SortOrder,
    /// Rows per page
    pub page_size: usize,
    /// Quiet period before a search term is applied
    pub debounce_ms: u64,
    /// Pad the last page with placeholder rows
    pub pad_last_page: bool,
    /// Add/edit form fields
    pub schema: DraftSchema,
    /// API path of the resource, relative to the base URL
    pub resource: String,
    /// Envelope keys of API responses
    pub envelope: EnvelopeKeys,
}

impl ScreenConfig {
    /// Create a configuration with default paging and debounce settings.
    ///
    /// The resource path and envelope keys default to `name`.
    pub fn new(name: impl Into<String>, filter: FilterConfig) -> Self {
        let name = name.into();
        Self {
            filter,
            sort_order: SortOrder::default(),
            page_size: DEFAULT_PAGE_SIZE,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            pad_last_page: false,
            schema: DraftSchema::default(),
            resource: name.clone(),
            envelope: EnvelopeKeys::new(name.clone(), name.trim_end_matches('s')),
            name,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn padded(mut self, pad_last_page: bool) -> Self {
        self.pad_last_page = pad_last_page;
        self
    }

    pub fn with_schema(mut self, schema: DraftSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>, envelope: EnvelopeKeys) -> Self {
        self.resource = resource.into();
        self.envelope = envelope;
        self
    }

    /// Check the configuration before a view is built from it.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::InvalidPageSize);
        }
        self.filter.validate()
    }
}
