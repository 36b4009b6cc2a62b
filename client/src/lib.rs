//! Roster client - runs the list engine against a live admin API.
//!
//! - [`api`]: the [`RecordApi`] seam and its reqwest implementation
//! - [`session`]: bearer-token session with sign-out on 401
//! - [`driver`]: async [`ViewDriver`] with debounced search
//! - [`config`]: environment configuration

pub mod api;
pub mod config;
pub mod driver;
pub mod error;
pub mod session;

pub use api::{HttpRecordApi, RecordApi};
pub use config::{ClientConfig, ConfigError};
pub use driver::ViewDriver;
pub use error::{ClientError, Result, Stage};
pub use session::{Session, SessionState};
