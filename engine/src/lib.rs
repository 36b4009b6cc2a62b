//! # Roster Engine
//!
//! A deterministic list-management engine for admin dashboards.
//!
//! This crate holds the logic behind a paginated, searchable, filterable
//! management screen (users, admins, products): an in-memory record store,
//! bucket and search filtering, a debounced search scheduler, a pagination
//! window and the reconciliation of create/update results into the store.
//!
//! ## Design Principles
//!
//! - **No IO**: The engine never talks to a server; callers feed it results
//! - **No clock**: Time is passed in, so debouncing is testable
//! - **Deterministic**: Same inputs always produce the same snapshot
//! - **One screen, one view**: Each [`ListView`] owns its own store
//!
//! ## Core Concepts
//!
//! ### Pipeline
//!
//! Every render derives its rows from the store in two pure steps:
//! [`filter`](filter::filter) selects the bucket and search matches, then
//! [`paginate`](pagination::paginate) cuts the current page out of them.
//! Search keystrokes go through a [`Debouncer`] first, so typing a word
//! recomputes the pipeline once.
//!
//! ### View modes
//!
//! A [`ListView`] is always in one of three modes, see [`ViewMode`]:
//! `list`, `add` or `edit`. Submitting validates the [`FormDraft`] against the
//! screen's [`DraftSchema`] and hands out a [`Mutation`] for the caller to
//! send. The server's answer is merged by id with [`reconcile`](reconcile::reconcile),
//! which never duplicates a record.
//!
//! ### Stale results
//!
//! Fetches and submits are ticketed. Only the most recently started fetch may
//! replace the store, and after [`ListView::tear_down`] every late result is
//! dropped.
//!
//! ## Quick Start
//!
//! ```rust
//! use roster_engine::{presets, ListView, Record, Submission, ViewMode};
//! use serde_json::json;
//!
//! let mut view = ListView::new(presets::users()).unwrap();
//!
//! // 1. Load the collection
//! let ticket = view.begin_fetch().unwrap();
//! view.complete_fetch(ticket, Ok(vec![
//!     Record::from_json("u1", json!({"name": "Alice", "status": "active"})),
//!     Record::from_json("u2", json!({"name": "Bob", "status": "inactive"})),
//! ]));
//!
//! // 2. Narrow it down
//! view.set_bucket("active").unwrap();
//! assert_eq!(view.snapshot().record_ids(), vec!["u1"]);
//!
//! // 3. Edit a record
//! view.enter_edit("u1").unwrap();
//! let draft = view.draft().cloned().unwrap().with("email", "alice@example.com");
//! let Submission::Send(pending) = view.submit(draft).unwrap() else {
//!     panic!("draft should be valid");
//! };
//!
//! // 4. Merge the server's answer
//! let saved = Record::from_json("u1", json!({"email": "alice@example.com"}));
//! view.complete_submit(pending.ticket, Ok(saved));
//! assert_eq!(view.mode(), &ViewMode::List);
//! ```

pub mod config;
pub mod debounce;
pub mod draft;
pub mod error;
pub mod filter;
pub mod mutation;
pub mod normalize;
pub mod pagination;
pub mod presets;
pub mod reconcile;
pub mod record;
pub mod schema;
pub mod snapshot;
pub mod store;
pub mod view;

// Re-export main types at crate root
pub use config::ScreenConfig;
pub use debounce::{Debouncer, Ticket, DEFAULT_DEBOUNCE_MS};
pub use draft::{DraftMode, FormDraft};
pub use error::{Error, FieldError, ViewError};
pub use filter::{Bucket, BucketInfo, FilterConfig, FilterState, Predicate, ALL_BUCKET};
pub use mutation::{Mutation, MutationKind, PendingSubmit, SubmitTicket};
pub use normalize::{normalize_collection, normalize_record, EnvelopeKeys};
pub use pagination::{PageRow, PageWindow, Pagination, DEFAULT_PAGE_SIZE};
pub use reconcile::{ReconcileResult, Reconciler};
pub use record::{Attributes, Record};
pub use schema::{DraftSchema, FieldDef, FieldKind};
pub use snapshot::{ViewMode, ViewSnapshot};
pub use store::{Placement, RecordStore, SortOrder};
pub use view::{FetchOutcome, FetchTicket, ListView, Submission, SubmitOutcome};

/// Type aliases for clarity
pub type RecordId = String;
pub type BucketId = String;
/// Milliseconds since the Unix epoch
pub type Timestamp = i64;
