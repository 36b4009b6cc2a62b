//! List view controller.
//!
//! [`ListView`] ties the store, filter, debounce scheduler and pagination
//! window together and drives the list/add/edit state machine. It performs no
//! IO: fetches and submits are split into a `begin_*` call that hands out a
//! ticket and a `complete_*` call that applies the server's answer. Results
//! for stale tickets, or arriving after [`ListView::tear_down`], are
//! discarded.

use crate::draft::{DraftMode, FormDraft};
use crate::error::{FieldError, Result};
use crate::filter::{filter, FilterState};
use crate::mutation::{Mutation, MutationKind, PendingSubmit, SubmitTicket};
use crate::pagination::{paginate, to_rows, Pagination};
use crate::reconcile::{reconcile, ReconcileResult};
use crate::snapshot::{ViewMode, ViewSnapshot};
use crate::{
    debounce::Ticket, Debouncer, Error, Record, RecordId, RecordStore, ScreenConfig, Timestamp,
    ViewError,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Identifies one fetch round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FetchTicket(pub u64);

/// Outcome of [`ListView::complete_fetch`].
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The store now holds `count` records
    Loaded { count: usize },
    /// The fetch failed; the store kept its previous content
    Failed(ViewError),
    /// A newer fetch was started, or the view is gone
    Discarded,
}

/// Outcome of [`ListView::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Validation passed; send this mutation
    Send(PendingSubmit),
    /// Validation failed locally; nothing should be sent
    Invalid(Vec<FieldError>),
}

/// Outcome of [`ListView::complete_submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Merged into the store; the view is back in list mode
    Saved {
        result: ReconcileResult,
        /// Whether the record passes the active filter
        visible: bool,
    },
    /// The server rejected the mutation; draft and mode are unchanged
    Failed(ViewError),
    /// Stale ticket, or the view is gone
    Discarded,
}

#[derive(Debug, Clone)]
struct InFlightSubmit {
    ticket: SubmitTicket,
    kind: MutationKind,
    target: Option<RecordId>,
}

/// One management screen's list state.
#[derive(Debug, Clone)]
pub struct ListView {
    config: ScreenConfig,
    store: RecordStore,
    filter: FilterState,
    search_input: String,
    debouncer: Debouncer,
    pagination: Pagination,
    filtered_count: usize,
    mode: ViewMode,
    draft: Option<FormDraft>,
    last_error: Option<ViewError>,
    next_fetch: u64,
    pending_fetch: Option<FetchTicket>,
    next_submit: u64,
    submit: Option<InFlightSubmit>,
    recomputations: u64,
    torn_down: bool,
}

impl ListView {
    /// Create an empty view for a screen.
    pub fn new(config: ScreenConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store: RecordStore::new(config.sort_order),
            filter: FilterState::default(),
            search_input: String::new(),
            debouncer: Debouncer::new(config.debounce_ms),
            pagination: Pagination::new(config.page_size)?,
            filtered_count: 0,
            mode: ViewMode::List,
            draft: None,
            last_error: None,
            next_fetch: 0,
            pending_fetch: None,
            next_submit: 0,
            submit: None,
            recomputations: 0,
            torn_down: false,
            config,
        })
    }

    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Applied filter state.
    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    /// Search input as typed.
    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn mode(&self) -> &ViewMode {
        &self.mode
    }

    pub fn draft(&self) -> Option<&FormDraft> {
        self.draft.as_ref()
    }

    pub fn last_error(&self) -> Option<&ViewError> {
        self.last_error.as_ref()
    }

    pub fn current_page(&self) -> usize {
        self.pagination.current_page()
    }

    pub fn total_pages(&self) -> usize {
        self.pagination.total_pages(self.filtered_count)
    }

    pub fn is_filtering(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn is_loading(&self) -> bool {
        self.pending_fetch.is_some()
    }

    pub fn is_submitting(&self) -> bool {
        self.submit.is_some()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Number of times the filter/pagination pipeline has run.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    /// When a pending search term becomes due.
    pub fn search_due_at(&self) -> Option<Timestamp> {
        self.debouncer.due_at()
    }

    fn ensure_live(&self) -> Result<()> {
        if self.torn_down {
            return Err(Error::ViewTornDown);
        }
        Ok(())
    }

    /// Records passing the applied filter, in store order.
    pub fn filtered(&self) -> Vec<&Record> {
        filter(
            self.store.iter(),
            &self.filter.bucket,
            &self.filter.search_term,
            &self.config.filter,
        )
    }

    fn is_visible(&self, id: &str) -> bool {
        self.filtered().iter().any(|r| r.id == id)
    }

    /// Re-run the pipeline and re-clamp the current page.
    fn recompute(&mut self) {
        self.filtered_count = self.filtered().len();
        self.pagination.reclamp(self.filtered_count);
        self.recomputations += 1;
        debug!(
            screen = %self.config.name,
            bucket = %self.filter.bucket,
            term = %self.filter.search_term,
            filtered = self.filtered_count,
            page = self.pagination.current_page(),
            "recomputed list"
        );
    }

    // ------------------------------------------------------------------
    // Filter commands
    // ------------------------------------------------------------------

    /// Switch bucket. Resets to page 1 when the bucket changes.
    pub fn set_bucket(&mut self, bucket: &str) -> Result<()> {
        self.ensure_live()?;
        if !self.config.filter.contains_bucket(bucket) {
            return Err(Error::UnknownBucket(bucket.to_string()));
        }
        if self.filter.bucket != bucket {
            self.filter.bucket = bucket.to_string();
            self.pagination.reset();
            self.recompute();
        }
        Ok(())
    }

    /// Record a keystroke in the search box and schedule recomputation.
    ///
    /// Any earlier pending recomputation is cancelled. The returned ticket
    /// must be passed to [`ListView::apply_search`] once the delay elapsed.
    pub fn set_search_term(&mut self, term: impl Into<String>, now: Timestamp) -> Result<Ticket> {
        self.ensure_live()?;
        self.search_input = term.into();
        self.debouncer
            .schedule(self.search_input.clone(), now)
            .ok_or(Error::ViewTornDown)
    }

    /// Apply a scheduled search term if `ticket` is still the latest.
    pub fn apply_search(&mut self, ticket: Ticket) -> bool {
        match self.debouncer.fire(ticket) {
            Some(term) => {
                self.apply_term(term);
                true
            }
            None => false,
        }
    }

    /// Apply the pending search term if it is due at `now`.
    pub fn poll_search(&mut self, now: Timestamp) -> bool {
        match self.debouncer.poll(now) {
            Some(term) => {
                self.apply_term(term);
                true
            }
            None => false,
        }
    }

    /// Apply the pending search term immediately.
    pub fn flush_search(&mut self) -> bool {
        match self.debouncer.flush() {
            Some(term) => {
                self.apply_term(term);
                true
            }
            None => false,
        }
    }

    fn apply_term(&mut self, term: String) {
        self.filter.search_term = term;
        self.pagination.reset();
        self.recompute();
    }

    // ------------------------------------------------------------------
    // Pagination commands
    // ------------------------------------------------------------------

    /// Go to page `n`, clamped into range. Returns the resulting page.
    pub fn go_to_page(&mut self, n: usize) -> usize {
        self.pagination.go_to_clamped(n, self.filtered_count)
    }

    /// Next page; a no-op on the last page.
    pub fn next_page(&mut self) -> bool {
        self.pagination.next(self.filtered_count)
    }

    /// Previous page; a no-op on the first page.
    pub fn prev_page(&mut self) -> bool {
        self.pagination.prev(self.filtered_count)
    }

    // ------------------------------------------------------------------
    // View-mode commands
    // ------------------------------------------------------------------

    fn ensure_list_mode(&self, action: &str) -> Result<()> {
        if !self.mode.is_list() {
            return Err(Error::InvalidTransition {
                action: action.to_string(),
                mode: self.mode.name().to_string(),
            });
        }
        Ok(())
    }

    /// Open the add form with a fresh draft.
    pub fn enter_add(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.ensure_list_mode("enter add")?;
        self.draft = Some(FormDraft::from_defaults(&self.config.schema));
        self.last_error = None;
        self.mode = ViewMode::Add;
        debug!(screen = %self.config.name, "entered add mode");
        Ok(())
    }

    /// Open the edit form for a stored record.
    pub fn enter_edit(&mut self, id: &str) -> Result<()> {
        self.ensure_live()?;
        self.ensure_list_mode("enter edit")?;
        let record = self
            .store
            .get(id)
            .ok_or_else(|| Error::RecordNotFound(id.to_string()))?;
        self.draft = Some(FormDraft::from_record(&self.config.schema, record));
        self.last_error = None;
        self.mode = ViewMode::Edit { id: id.to_string() };
        debug!(screen = %self.config.name, id, "entered edit mode");
        Ok(())
    }

    /// Change one field of the open draft.
    pub fn set_draft_field(&mut self, field: &str, value: serde_json::Value) -> Result<()> {
        self.ensure_live()?;
        match self.draft.as_mut() {
            Some(draft) => {
                draft.set(field, value);
                Ok(())
            }
            None => Err(Error::InvalidTransition {
                action: "edit the draft".into(),
                mode: self.mode.name().into(),
            }),
        }
    }

    /// Leave add/edit mode, discarding the draft.
    pub fn cancel(&mut self) -> Result<()> {
        self.ensure_live()?;
        if self.submit.is_some() {
            return Err(Error::SubmitInFlight);
        }
        self.mode = ViewMode::List;
        self.draft = None;
        self.last_error = None;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Submit
    // ------------------------------------------------------------------

    /// Validate `draft` and, if valid, hand out the mutation to send.
    ///
    /// The draft replaces the view's draft either way, so a failed attempt
    /// can be retried without re-entering data.
    pub fn submit(&mut self, draft: FormDraft) -> Result<Submission> {
        self.ensure_live()?;
        if self.submit.is_some() {
            return Err(Error::SubmitInFlight);
        }
        let (draft_mode, target) = match &self.mode {
            ViewMode::List => {
                return Err(Error::InvalidTransition {
                    action: "submit".into(),
                    mode: "list".into(),
                })
            }
            ViewMode::Add => (DraftMode::Create, None),
            ViewMode::Edit { id } => (DraftMode::Edit, Some(id.clone())),
        };

        let errors = self.config.schema.validate(&draft, draft_mode);
        let payload = draft.to_payload(&self.config.schema, draft_mode);
        self.draft = Some(draft);

        if !errors.is_empty() {
            debug!(screen = %self.config.name, errors = errors.len(), "draft failed validation");
            self.last_error = Some(ViewError::Validation {
                field_errors: errors.clone(),
            });
            return Ok(Submission::Invalid(errors));
        }

        self.next_submit += 1;
        let ticket = SubmitTicket(self.next_submit);
        let mutation = match target.clone() {
            None => Mutation::Create { payload },
            Some(id) => Mutation::Update { id, payload },
        };
        self.submit = Some(InFlightSubmit {
            ticket,
            kind: mutation.kind(),
            target,
        });
        self.last_error = None;

        Ok(Submission::Send(PendingSubmit { ticket, mutation }))
    }

    /// Apply the server's answer to a submit.
    ///
    /// On success the record is merged and the view returns to list mode in
    /// the same step. On failure nothing but `last_error` changes.
    pub fn complete_submit(
        &mut self,
        ticket: SubmitTicket,
        result: std::result::Result<Record, ViewError>,
    ) -> SubmitOutcome {
        if self.torn_down {
            debug!(screen = %self.config.name, "discarding submit result after teardown");
            return SubmitOutcome::Discarded;
        }
        let in_flight = match self.submit.take() {
            Some(in_flight) if in_flight.ticket == ticket => in_flight,
            other => {
                self.submit = other;
                return SubmitOutcome::Discarded;
            }
        };

        match result {
            Ok(record) => {
                if let Some(target) = &in_flight.target {
                    if *target != record.id {
                        warn!(
                            screen = %self.config.name,
                            expected = %target,
                            got = %record.id,
                            "update result carries a different id"
                        );
                    }
                }
                let result = reconcile(&mut self.store, in_flight.kind, record);
                self.recompute();
                let visible = self.is_visible(&result.record_id);

                self.mode = ViewMode::List;
                self.draft = None;
                self.last_error = None;
                debug!(
                    screen = %self.config.name,
                    id = %result.record_id,
                    visible,
                    "saved record"
                );
                SubmitOutcome::Saved { result, visible }
            }
            Err(error) => {
                warn!(screen = %self.config.name, %error, "submit failed");
                self.last_error = Some(error.clone());
                SubmitOutcome::Failed(error)
            }
        }
    }

    // ------------------------------------------------------------------
    // Fetch
    // ------------------------------------------------------------------

    /// Start a (re)fetch. Only the latest started fetch may land.
    pub fn begin_fetch(&mut self) -> Result<FetchTicket> {
        self.ensure_live()?;
        self.next_fetch += 1;
        let ticket = FetchTicket(self.next_fetch);
        self.pending_fetch = Some(ticket);
        Ok(ticket)
    }

    /// Apply a fetch result.
    ///
    /// The current filter and page are kept; the page is only re-clamped.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: std::result::Result<Vec<Record>, ViewError>,
    ) -> FetchOutcome {
        if self.torn_down {
            debug!(screen = %self.config.name, "discarding fetch result after teardown");
            return FetchOutcome::Discarded;
        }
        if self.pending_fetch != Some(ticket) {
            debug!(screen = %self.config.name, ticket = ticket.0, "discarding superseded fetch");
            return FetchOutcome::Discarded;
        }
        self.pending_fetch = None;

        match result {
            Ok(records) => {
                self.store.replace_all(records);
                if matches!(
                    self.last_error,
                    Some(ViewError::Fetch { .. } | ViewError::Auth { .. })
                ) {
                    self.last_error = None;
                }
                self.recompute();
                FetchOutcome::Loaded {
                    count: self.store.len(),
                }
            }
            Err(error) => {
                warn!(screen = %self.config.name, %error, "fetch failed");
                self.last_error = Some(error.clone());
                FetchOutcome::Failed(error)
            }
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Dispose of the view. Pending searches are cancelled and every later
    /// fetch or submit result is discarded.
    pub fn tear_down(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.debouncer.dispose();
        self.store.clear();
        self.filtered_count = 0;
        self.draft = None;
        self.submit = None;
        self.pending_fetch = None;
        debug!(screen = %self.config.name, "view torn down");
    }

    /// Everything needed to render the current frame.
    pub fn snapshot(&self) -> ViewSnapshot {
        let filtered = self.filtered();
        let window = paginate(&filtered, self.pagination.page_size(), self.current_page());
        ViewSnapshot {
            page_items: to_rows(
                &window.page_items,
                self.pagination.page_size(),
                self.config.pad_last_page,
            ),
            total_pages: window.total_pages,
            clamped_page: window.clamped_page,
            page_size: self.pagination.page_size(),
            is_filtering: self.is_filtering(),
            is_loading: self.is_loading(),
            is_submitting: self.is_submitting(),
            active_bucket: self.filter.bucket.clone(),
            buckets: self.config.filter.buckets().collect(),
            search_term: self.search_input.clone(),
            view_mode: self.mode.clone(),
            form_draft: self.draft.clone(),
            last_error: self.last_error.clone(),
            total_records: self.store.len(),
            filtered_count: filtered.len(),
        }
    }
}
