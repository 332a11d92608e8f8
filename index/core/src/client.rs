//! Index Client
//!
//! Keeps an eventually-fresh copy of the composite index. A timer fetches
//! once immediately on [`IndexClient::start`] and then every
//! `refresh_interval`; each fetch runs through [`IndexClient::refresh`].
//!
//! # Refresh cycle
//!
//! 1. mark a request in flight, clear `last_error`
//! 2. one request to the backend (bounded by `request_timeout`)
//! 3. success: replace the snapshot, stamp `fetched_at`
//! 4. failure: keep the snapshot, record the error
//! 5. clear the in-flight mark, on every exit path
//!
//! # Overlapping refreshes
//!
//! Ticks never wait for a previous request. If two requests are pending at
//! once, whichever resolves last is what the state ends up holding. With
//! `drop_stale_responses` enabled, a response that resolves after a newer
//! request's response has already been applied is discarded instead.
//!
//! `stop()` only cancels future ticks; a request already in flight still
//! lands in the state when it resolves.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::backend::IndexBackend;
use crate::config::ClientConfig;
use crate::error::{ErrorInfo, ErrorKind, FetchError};
use crate::snapshot::IndexSnapshot;
use crate::state::ClientState;

/// What a single refresh did to the state
#[derive(Clone, Debug, PartialEq)]
pub enum RefreshOutcome {
    /// A new snapshot was stored
    Updated,
    /// The request failed; the error was stored
    Failed(FetchError),
    /// A newer response had already been applied, so this one was dropped
    Discarded,
}

/// Periodic index synchronizer
///
/// Cheap to clone; clones share the same state and schedule. The schedule is
/// cancelled when the last clone is dropped.
pub struct IndexClient<B: IndexBackend> {
    inner: Arc<Inner<B>>,
}

struct Inner<B: IndexBackend> {
    backend: B,
    config: ClientConfig,
    state: watch::Sender<ClientState>,
    timer: Mutex<Option<JoinHandle<()>>>,
    /// Sequence number handed to the next refresh
    next_seq: AtomicU64,
    /// Highest sequence number whose outcome reached the state
    applied_seq: AtomicU64,
}

impl<B: IndexBackend> Drop for Inner<B> {
    fn drop(&mut self) {
        if let Some(handle) = self.timer.get_mut().take() {
            handle.abort();
        }
    }
}

impl<B: IndexBackend> Clone for IndexClient<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: IndexBackend> IndexClient<B> {
    /// Create a stopped client with empty state
    pub fn new(backend: B, config: ClientConfig) -> Self {
        let (state, _) = watch::channel(ClientState::new());
        Self {
            inner: Arc::new(Inner {
                backend,
                config,
                state,
                timer: Mutex::new(None),
                next_seq: AtomicU64::new(0),
                applied_seq: AtomicU64::new(0),
            }),
        }
    }

    /// The backend readings come from
    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    /// Configuration this client was built with
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Copy of the current state
    pub fn state(&self) -> ClientState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<ClientState> {
        self.inner.state.subscribe()
    }

    /// Whether the periodic schedule is active
    pub fn is_running(&self) -> bool {
        self.inner
            .timer
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Fetch now, then every `refresh_interval`.
    ///
    /// Calling this while already running does nothing.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) {
        let mut timer = self.inner.timer.lock();
        if timer.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("Index client already running");
            return;
        }

        let period = self.inner.config.refresh_interval;
        let weak: Weak<Inner<B>> = Arc::downgrade(&self.inner);

        *timer = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                // First tick completes immediately
                ticker.tick().await;

                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let client = IndexClient { inner };
                tokio::spawn(async move {
                    client.refresh().await;
                });
            }
        }));

        info!(
            endpoint = %self.inner.backend.endpoint(),
            interval_secs = period.as_secs(),
            "Index client started"
        );
    }

    /// Cancel future scheduled refreshes. Safe to call when not running.
    pub fn stop(&self) {
        if let Some(handle) = self.inner.timer.lock().take() {
            handle.abort();
            info!("Index client stopped");
        }
    }

    /// Run one refresh cycle.
    ///
    /// Errors are recorded in the state, never returned as `Err`.
    pub async fn refresh(&self) -> RefreshOutcome {
        let inner = &*self.inner;
        let seq = inner.next_seq.fetch_add(1, Ordering::SeqCst) + 1;

        inner.state.send_modify(ClientState::begin_fetch);
        let _in_flight = InFlightGuard {
            state: &inner.state,
        };

        let timeout = inner.config.request_timeout;
        let result = match tokio::time::timeout(timeout, inner.backend.fetch_index()).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout { after: timeout }),
        };

        match result {
            Ok(payload) => {
                let snapshot = IndexSnapshot::from_payload(payload, Utc::now());
                let final_index = snapshot.final_index();
                let category = snapshot.composite();

                if !self.apply(seq, |state| state.apply_success(snapshot)) {
                    debug!(seq, "Discarding out-of-order index response");
                    return RefreshOutcome::Discarded;
                }

                info!(
                    backend = inner.backend.name(),
                    final_index,
                    category = %category,
                    "Index refreshed"
                );
                RefreshOutcome::Updated
            }
            Err(error) => {
                let info = ErrorInfo::now(error.clone());
                if !self.apply(seq, |state| state.apply_failure(info)) {
                    debug!(seq, "Discarding out-of-order index failure");
                    return RefreshOutcome::Discarded;
                }

                match error.kind() {
                    ErrorKind::MalformedPayload => warn!(
                        kind = %error.kind(),
                        detail = %error,
                        "Index response was malformed"
                    ),
                    kind => warn!(
                        kind = %kind,
                        endpoint = %inner.backend.endpoint(),
                        detail = %error,
                        "Index refresh failed"
                    ),
                }
                RefreshOutcome::Failed(error)
            }
        }
    }

    /// Apply an outcome under the state lock, honouring sequencing
    fn apply(&self, seq: u64, mutate: impl FnOnce(&mut ClientState)) -> bool {
        let inner = &*self.inner;
        inner.state.send_if_modified(|state| {
            let newest = inner.applied_seq.load(Ordering::SeqCst);
            if inner.config.drop_stale_responses && newest > seq {
                return false;
            }
            inner.applied_seq.store(newest.max(seq), Ordering::SeqCst);
            mutate(state);
            true
        })
    }
}

/// Clears the in-flight mark when the refresh ends, however it ends
struct InFlightGuard<'a> {
    state: &'a watch::Sender<ClientState>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(ClientState::finish_fetch);
    }
}
