//! Client State
//!
//! The mutable record behind the index client. Consumers only ever see
//! clones of it (via [`IndexClient::state`](crate::client::IndexClient::state)
//! or a [`watch`](tokio::sync::watch) receiver); the mutators are
//! crate-private and only the refresh cycle calls them.
//!
//! # Invariants
//!
//! - `snapshot` is only ever replaced by a newer successful fetch, never
//!   cleared. A failure after a success leaves both `snapshot` and
//!   `last_error` populated (stale-but-shown).
//! - `has_completed_first_fetch` never goes back to `false`.
//! - `is_fetching()` is true exactly while at least one request is pending.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::ErrorInfo;
use crate::snapshot::IndexSnapshot;

/// Synchronization state of the index client
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClientState {
    snapshot: Option<Arc<IndexSnapshot>>,
    in_flight: u32,
    last_error: Option<ErrorInfo>,
    has_completed_first_fetch: bool,
    last_attempt_at: Option<DateTime<Utc>>,
}

/// How a consumer should present the current state
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Presentation<'a> {
    /// Nothing fetched yet and no failure to report
    Loading,
    /// No data exists and the last attempt failed: show only the error
    FullError(&'a ErrorInfo),
    /// Data is available; `stale` carries the error of a failed refresh
    Snapshot {
        /// The snapshot to show
        snapshot: &'a IndexSnapshot,
        /// Set when the most recent refresh failed
        stale: Option<&'a ErrorInfo>,
    },
}

impl ClientState {
    /// Fresh state: no data, not fetching, no error
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last successfully fetched snapshot
    #[must_use]
    pub fn snapshot(&self) -> Option<&IndexSnapshot> {
        self.snapshot.as_deref()
    }

    /// Shared handle to the last snapshot
    #[must_use]
    pub fn snapshot_arc(&self) -> Option<Arc<IndexSnapshot>> {
        self.snapshot.clone()
    }

    /// Whether a request is outstanding
    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.in_flight > 0
    }

    /// Number of outstanding requests (more than one only when ticks overlap)
    #[must_use]
    pub fn in_flight(&self) -> u32 {
        self.in_flight
    }

    /// Error of the most recent completed refresh, if it failed
    #[must_use]
    pub fn last_error(&self) -> Option<&ErrorInfo> {
        self.last_error.as_ref()
    }

    /// Whether the initial load phase is over (success or failure)
    #[must_use]
    pub fn has_completed_first_fetch(&self) -> bool {
        self.has_completed_first_fetch
    }

    /// When the most recent refresh finished
    #[must_use]
    pub fn last_attempt_at(&self) -> Option<DateTime<Utc>> {
        self.last_attempt_at
    }

    /// Whether a snapshot is being shown despite a failed refresh
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.snapshot.is_some() && self.last_error.is_some()
    }

    /// Presentation policy: an error only takes over the whole view when
    /// there is no earlier data to fall back on.
    #[must_use]
    pub fn presentation(&self) -> Presentation<'_> {
        match (self.snapshot.as_deref(), self.last_error.as_ref()) {
            (Some(snapshot), stale) => Presentation::Snapshot { snapshot, stale },
            (None, Some(error)) => Presentation::FullError(error),
            (None, None) => Presentation::Loading,
        }
    }

    // ------------------------------------------------------------------
    // Refresh-cycle mutators
    // ------------------------------------------------------------------

    /// Step 1: a request is about to go out
    pub(crate) fn begin_fetch(&mut self) {
        self.in_flight = self.in_flight.saturating_add(1);
        self.last_error = None;
    }

    /// Step 3: the request succeeded
    pub(crate) fn apply_success(&mut self, snapshot: IndexSnapshot) {
        self.last_attempt_at = Some(snapshot.fetched_at());
        self.snapshot = Some(Arc::new(snapshot));
        self.last_error = None;
        self.has_completed_first_fetch = true;
    }

    /// Step 4: the request failed; the previous snapshot is kept
    pub(crate) fn apply_failure(&mut self, error: ErrorInfo) {
        self.last_attempt_at = Some(error.occurred_at);
        self.last_error = Some(error);
        self.has_completed_first_fetch = true;
    }

    /// Step 5: the request is no longer outstanding
    pub(crate) fn finish_fetch(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }
}
