//! Authentication session.
//!
//! The session holds the bearer token attached to every request. A 401 from
//! the API evicts it, and the sign-out is published on a watch channel so the
//! sign-in boundary can react. The list engine itself only ever sees
//! `ViewError::Auth`.

use reqwest::RequestBuilder;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Current authentication state.
#[derive(Clone, PartialEq, Eq)]
pub enum SessionState {
    SignedIn { token: String },
    SignedOut,
}

impl SessionState {
    pub fn token(&self) -> Option<&str> {
        match self {
            SessionState::SignedIn { token } => Some(token),
            SessionState::SignedOut => None,
        }
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::SignedIn { .. } => f.write_str("SignedIn { token: <redacted> }"),
            SessionState::SignedOut => f.write_str("SignedOut"),
        }
    }
}

/// Shared handle to the authentication state.
#[derive(Debug, Clone)]
pub struct Session {
    state: Arc<watch::Sender<SessionState>>,
}

impl Session {
    /// Start a session, signed in when a token is given.
    pub fn new(token: Option<String>) -> Self {
        let state = match token {
            Some(token) => SessionState::SignedIn { token },
            None => SessionState::SignedOut,
        };
        let (sender, _) = watch::channel(state);
        Self {
            state: Arc::new(sender),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token().map(str::to_string)
    }

    pub fn is_signed_in(&self) -> bool {
        self.state.borrow().token().is_some()
    }

    pub fn sign_in(&self, token: impl Into<String>) {
        self.state.send_replace(SessionState::SignedIn {
            token: token.into(),
        });
        tracing::info!("session signed in");
    }

    /// Drop the credential after the API refused it.
    pub fn evict(&self) {
        let evicted = self.state.send_if_modified(|state| {
            if matches!(state, SessionState::SignedOut) {
                return false;
            }
            *state = SessionState::SignedOut;
            true
        });
        if evicted {
            tracing::warn!("session rejected by the API; signed out");
        }
    }

    /// Watch for sign-in/sign-out changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Attach the bearer token, if any.
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}
