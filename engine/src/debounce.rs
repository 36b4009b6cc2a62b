//! Debounce scheduler for search recomputation.
//!
//! The scheduler never reads a clock. Callers pass `now` when scheduling and
//! either poll with a later `now` (event loops) or hold on to the returned
//! [`Ticket`] and fire it after sleeping (async drivers). Only the most
//! recently scheduled ticket can fire; scheduling again cancels the previous
//! one, and disposal cancels everything for good.

use crate::Timestamp;
use serde::{Deserialize, Serialize};

/// Reference delay between the last keystroke and recomputation.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Identifies one scheduled recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ticket(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pending {
    ticket: Ticket,
    due_at: Timestamp,
    term: String,
}

/// Cancellable single-slot scheduler for search terms.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay_ms: u64,
    next_ticket: u64,
    pending: Option<Pending>,
    disposed: bool,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

impl Debouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            next_ticket: 0,
            pending: None,
            disposed: false,
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// Schedule `term`, replacing whatever was pending.
    ///
    /// Returns `None` once disposed.
    pub fn schedule(&mut self, term: impl Into<String>, now: Timestamp) -> Option<Ticket> {
        if self.disposed {
            return None;
        }
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        let delay = Timestamp::try_from(self.delay_ms).unwrap_or(Timestamp::MAX);
        self.pending = Some(Pending {
            ticket,
            due_at: now.saturating_add(delay),
            term: term.into(),
        });
        Some(ticket)
    }

    /// Fire a specific ticket. Stale or cancelled tickets yield `None`.
    pub fn fire(&mut self, ticket: Ticket) -> Option<String> {
        match &self.pending {
            Some(pending) if pending.ticket == ticket => self.pending.take().map(|p| p.term),
            _ => None,
        }
    }

    /// Fire the pending term if it is due at `now`.
    pub fn poll(&mut self, now: Timestamp) -> Option<String> {
        match &self.pending {
            Some(pending) if pending.due_at <= now => self.pending.take().map(|p| p.term),
            _ => None,
        }
    }

    /// Fire the pending term immediately, regardless of its due time.
    pub fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|p| p.term)
    }

    /// Drop the pending term without firing it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Cancel and refuse all future scheduling.
    pub fn dispose(&mut self) {
        self.pending = None;
        self.disposed = true;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// When the pending term becomes due.
    pub fn due_at(&self) -> Option<Timestamp> {
        self.pending.as_ref().map(|p| p.due_at)
    }
}
