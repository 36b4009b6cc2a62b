//! Async driver for a [`ListView`].
//!
//! The driver owns one view behind a tokio mutex and runs the IO around it:
//! fetches and submits go through a [`RecordApi`], search keystrokes are
//! debounced by a sleeping task that is aborted whenever a newer keystroke
//! arrives, and every state change is published as a [`ViewSnapshot`] on a
//! watch channel.
//!
//! The lock is never held across a network call. Ordering between racing
//! round-trips is settled by the view's tickets.

use crate::api::RecordApi;
use crate::error::{Result, Stage};
use roster_engine::{
    FetchOutcome, FormDraft, ListView, Mutation, ScreenConfig, Submission, SubmitOutcome,
    Timestamp, ViewError, ViewSnapshot,
};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;

struct State {
    view: ListView,
    debounce: Option<JoinHandle<()>>,
}

impl State {
    fn abort_debounce(&mut self) {
        if let Some(handle) = self.debounce.take() {
            handle.abort();
        }
    }
}

struct Shared {
    state: Mutex<State>,
    api: Arc<dyn RecordApi>,
    snapshots: watch::Sender<ViewSnapshot>,
    started: Instant,
}

impl Shared {
    fn publish(&self, view: &ListView) {
        self.snapshots.send_replace(view.snapshot());
    }

    fn now(&self) -> Timestamp {
        Timestamp::try_from(self.started.elapsed().as_millis()).unwrap_or(Timestamp::MAX)
    }
}

/// Drives one management screen.
#[derive(Clone)]
pub struct ViewDriver {
    shared: Arc<Shared>,
}

impl ViewDriver {
    /// Create a driver for `config`, backed by `api`.
    pub fn new(config: ScreenConfig, api: Arc<dyn RecordApi>) -> Result<Self> {
        let view = ListView::new(config)?;
        let (snapshots, _) = watch::channel(view.snapshot());
        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    view,
                    debounce: None,
                }),
                api,
                snapshots,
                started: Instant::now(),
            }),
        })
    }

    /// Receive a snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.shared.snapshots.subscribe()
    }

    pub async fn snapshot(&self) -> ViewSnapshot {
        self.shared.state.lock().await.view.snapshot()
    }

    /// Number of filter/pagination recomputations so far.
    pub async fn recomputations(&self) -> u64 {
        self.shared.state.lock().await.view.recomputations()
    }

    /// Fetch the whole collection and replace the store.
    pub async fn refresh(&self) -> Result<FetchOutcome> {
        let ticket = {
            let mut state = self.shared.state.lock().await;
            let ticket = state.view.begin_fetch()?;
            self.shared.publish(&state.view);
            ticket
        };

        let result = self.shared.api.fetch_all().await.map_err(|error| {
            tracing::warn!(%error, "fetch failed");
            error.into_view_error(Stage::Fetch)
        });

        let mut state = self.shared.state.lock().await;
        let screen = state.view.config().name.clone();
        let outcome = state.view.complete_fetch(ticket, result);
        match &outcome {
            FetchOutcome::Loaded { count } => tracing::info!(%screen, count, "collection loaded"),
            FetchOutcome::Failed(_) => {}
            FetchOutcome::Discarded => tracing::debug!(%screen, "fetch result discarded"),
        }
        if !state.view.is_torn_down() {
            self.shared.publish(&state.view);
        }
        Ok(outcome)
    }

    pub async fn set_bucket(&self, bucket: &str) -> Result<()> {
        let mut state = self.shared.state.lock().await;
        state.view.set_bucket(bucket)?;
        self.shared.publish(&state.view);
        Ok(())
    }

    /// Record a search keystroke. The term is applied once no further
    /// keystroke arrives within the screen's debounce delay.
    pub async fn set_search_term(&self, term: impl Into<String>) -> Result<()> {
        let mut state = self.shared.state.lock().await;
        let now = self.shared.now();
        let ticket = state.view.set_search_term(term, now)?;
        let remaining = state
            .view
            .search_due_at()
            .map_or(0, |due| due.saturating_sub(now));
        let delay = Duration::from_millis(u64::try_from(remaining).unwrap_or(0));

        state.abort_debounce();
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        state.debounce = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(shared) = shared.upgrade() else {
                return;
            };
            let mut state = shared.state.lock().await;
            state.debounce = None;
            if state.view.apply_search(ticket) {
                shared.publish(&state.view);
            }
        }));

        self.shared.publish(&state.view);
        Ok(())
    }

    /// Apply a pending search term right away.
    pub async fn flush_search(&self) -> bool {
        let mut state = self.shared.state.lock().await;
        state.abort_debounce();
        let applied = state.view.flush_search();
        if applied {
            self.shared.publish(&state.view);
        }
        applied
    }

    /// Go to page `n`, clamped. Returns the resulting page.
    pub async fn go_to_page(&self, n: usize) -> usize {
        let mut state = self.shared.state.lock().await;
        let page = state.view.go_to_page(n);
        self.shared.publish(&state.view);
        page
    }

    pub async fn next_page(&self) -> bool {
        let mut state = self.shared.state.lock().await;
        let moved = state.view.next_page();
        if moved {
            self.shared.publish(&state.view);
        }
        moved
    }

    pub async fn prev_page(&self) -> bool {
        let mut state = self.shared.state.lock().await;
        let moved = state.view.prev_page();
        if moved {
            self.shared.publish(&state.view);
        }
        moved
    }

    pub async fn enter_add(&self) -> Result<()> {
        let mut state = self.shared.state.lock().await;
        state.view.enter_add()?;
        self.shared.publish(&state.view);
        Ok(())
    }

    pub async fn enter_edit(&self, id: &str) -> Result<()> {
        let mut state = self.shared.state.lock().await;
        state.view.enter_edit(id)?;
        self.shared.publish(&state.view);
        Ok(())
    }

    pub async fn set_draft_field(&self, field: &str, value: serde_json::Value) -> Result<()> {
        let mut state = self.shared.state.lock().await;
        state.view.set_draft_field(field, value)?;
        self.shared.publish(&state.view);
        Ok(())
    }

    pub async fn cancel(&self) -> Result<()> {
        let mut state = self.shared.state.lock().await;
        state.view.cancel()?;
        self.shared.publish(&state.view);
        Ok(())
    }

    /// Submit the view's current draft.
    pub async fn submit_current(&self) -> Result<SubmitOutcome> {
        let draft = {
            let state = self.shared.state.lock().await;
            state.view.draft().cloned().unwrap_or_default()
        };
        self.submit(draft).await
    }

    /// Validate and send `draft`, then merge the server's answer.
    ///
    /// Local validation failures are reported as
    /// `SubmitOutcome::Failed(ViewError::Validation { .. })` without any
    /// request being sent.
    pub async fn submit(&self, draft: FormDraft) -> Result<SubmitOutcome> {
        let pending = {
            let mut state = self.shared.state.lock().await;
            let submission = state.view.submit(draft)?;
            self.shared.publish(&state.view);
            match submission {
                Submission::Send(pending) => pending,
                Submission::Invalid(field_errors) => {
                    return Ok(SubmitOutcome::Failed(ViewError::Validation { field_errors }));
                }
            }
        };

        let api = &self.shared.api;
        let result = match &pending.mutation {
            Mutation::Create { payload } => api.create(payload).await,
            Mutation::Update { id, payload } => api.update(id, payload).await,
        }
        .map_err(|error| {
            tracing::warn!(%error, kind = ?pending.mutation.kind(), "mutation failed");
            error.into_view_error(Stage::Mutation)
        });

        let mut state = self.shared.state.lock().await;
        let outcome = state.view.complete_submit(pending.ticket, result);
        if let SubmitOutcome::Saved { result, visible } = &outcome {
            tracing::info!(
                screen = %state.view.config().name,
                id = %result.record_id,
                kind = ?result.kind,
                visible,
                "record saved"
            );
        }
        if !state.view.is_torn_down() {
            self.shared.publish(&state.view);
        }
        Ok(outcome)
    }

    /// Tear the view down. In-flight results are discarded when they land.
    pub async fn tear_down(&self) {
        let mut state = self.shared.state.lock().await;
        state.abort_debounce();
        state.view.tear_down();
        self.shared.publish(&state.view);
    }
}
