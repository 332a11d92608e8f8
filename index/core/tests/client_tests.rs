//! Integration tests for the index client refresh cycle
//!
//! These tests drive `IndexClient` against a scripted backend and check the
//! state machine: stale-but-shown on failure, first-load gating, the
//! in-flight flag, scheduling, and out-of-order responses.
//!
//! Timer tests run on a paused clock (`start_paused = true`), so a
//! five-minute interval elapses instantly and deterministically.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{oneshot, watch};
use tokio::time::timeout;

use feargreed_core::{
    ClientConfig, ClientState, ErrorKind, FetchError, IndexBackend, IndexClient, IndexPayload,
    Locale, MetricId, Presentation, RefreshOutcome, Sentiment,
};

// ============================================================================
// Scripted Backend
// ============================================================================

/// One scripted answer
struct Step {
    result: Result<IndexPayload, FetchError>,
    /// Simulated network latency
    delay: Duration,
    /// If set, the answer is held until the sender fires (or is dropped)
    gate: Option<oneshot::Receiver<()>>,
}

/// Backend that answers from a queue, then repeats a fallback answer
struct ScriptedBackend {
    script: Mutex<VecDeque<Step>>,
    fallback: Result<IndexPayload, FetchError>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    fn always(result: Result<IndexPayload, FetchError>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: result,
            calls: AtomicUsize::new(0),
        }
    }

    fn then(self, result: Result<IndexPayload, FetchError>) -> Self {
        self.then_after(result, Duration::ZERO)
    }

    fn then_after(self, result: Result<IndexPayload, FetchError>, delay: Duration) -> Self {
        self.script.lock().push_back(Step {
            result,
            delay,
            gate: None,
        });
        self
    }

    fn then_gated(self, result: Result<IndexPayload, FetchError>) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        self.script.lock().push_back(Step {
            result,
            delay: Duration::ZERO,
            gate: Some(rx),
        });
        (self, tx)
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IndexBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn endpoint(&self) -> String {
        "scripted://index".to_string()
    }

    async fn fetch_index(&self) -> Result<IndexPayload, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.script.lock().pop_front();

        match step {
            Some(step) => {
                if let Some(gate) = step.gate {
                    let _ = gate.await;
                }
                if !step.delay.is_zero() {
                    tokio::time::sleep(step.delay).await;
                }
                step.result
            }
            None => self.fallback.clone(),
        }
    }
}

// ============================================================================
// Test Utilities
// ============================================================================

fn payload(final_index: f64, momentum: f64, bond_spread: f64, safe_haven: f64) -> IndexPayload {
    IndexPayload::parse(&format!(
        r#"{{
            "final_index": {final_index},
            "scores": {{ "momentum": {momentum}, "bond_spread": {bond_spread}, "safe_haven": {safe_haven} }},
            "raw_data": {{
                "metric_1_momentum": {{ "latest_ratio": 1.05 }},
                "metric_5_bond_spread": {{ "latest_spread_US": 0.42 }},
                "metric_7_safe_haven": {{ "latest_diff": 0.013 }}
            }}
        }}"#
    ))
    .unwrap()
}

fn unreachable() -> FetchError {
    FetchError::NetworkUnreachable {
        endpoint: "scripted://index".to_string(),
        detail: "connection refused".to_string(),
    }
}

fn config() -> ClientConfig {
    ClientConfig::with_base_url("scripted://index")
}

fn client(backend: ScriptedBackend) -> IndexClient<ScriptedBackend> {
    IndexClient::new(backend, config())
}

/// Wait (on the paused clock) until the state satisfies `pred`
async fn wait_until(
    rx: &mut watch::Receiver<ClientState>,
    pred: impl FnMut(&ClientState) -> bool,
) -> ClientState {
    timeout(Duration::from_secs(24 * 3600), rx.wait_for(pred))
        .await
        .expect("state never reached the expected condition")
        .expect("client dropped")
        .clone()
}

// ============================================================================
// Refresh Cycle
// ============================================================================

#[tokio::test]
async fn test_refresh_success_populates_snapshot() {
    let client = client(ScriptedBackend::always(Ok(payload(72.3, 81.0, 40.0, 60.0))));

    assert_eq!(client.config().base_url, "scripted://index");
    assert_eq!(client.refresh().await, RefreshOutcome::Updated);

    let state = client.state();
    assert!(state.has_completed_first_fetch());
    assert!(!state.is_fetching());
    assert!(state.last_error().is_none());

    let snapshot = state.snapshot().expect("snapshot after success");
    assert_eq!(snapshot.final_index(), 72.3);
    assert_eq!(snapshot.composite(), Sentiment::Greed);
    assert_eq!(snapshot.sentiment(MetricId::Momentum), Sentiment::ExtremeGreed);
    assert_eq!(snapshot.sentiment(MetricId::BondSpread), Sentiment::Fear);
    assert_eq!(snapshot.sentiment(MetricId::SafeHaven), Sentiment::Greed);
}

#[tokio::test]
async fn test_repeated_success_replaces_snapshot() {
    let client = client(ScriptedBackend::always(Ok(payload(50.0, 50.0, 50.0, 50.0))));

    client.refresh().await;
    let first = client.state().snapshot_arc().unwrap();
    client.refresh().await;
    let second = client.state().snapshot_arc().unwrap();

    assert!(first.same_reading(&second));
    assert!(!Arc::ptr_eq(&first, &second), "snapshot should be replaced, not reused");
    assert_eq!(client.backend().calls(), 2);
}

#[tokio::test]
async fn test_failure_after_success_keeps_stale_snapshot() {
    let backend = ScriptedBackend::always(Err(unreachable())).then(Ok(payload(72.3, 81.0, 40.0, 60.0)));
    let client = client(backend);

    client.refresh().await;
    let before = client.state().snapshot_arc().unwrap();

    let outcome = client.refresh().await;
    assert_eq!(outcome, RefreshOutcome::Failed(unreachable()));

    let state = client.state();
    let after = state.snapshot_arc().expect("snapshot survives failure");
    assert_eq!(*before, *after);
    assert_eq!(state.last_error().map(|e| e.kind()), Some(ErrorKind::NetworkUnreachable));
    assert!(state.is_stale());
    assert!(matches!(
        state.presentation(),
        Presentation::Snapshot { stale: Some(_), .. }
    ));
}

#[tokio::test]
async fn test_next_attempt_clears_error() {
    let backend = ScriptedBackend::always(Ok(payload(30.0, 30.0, 30.0, 30.0))).then(Err(unreachable()));
    let client = client(backend);

    client.refresh().await;
    assert!(client.state().last_error().is_some());

    client.refresh().await;
    let state = client.state();
    assert!(state.last_error().is_none());
    assert_eq!(state.snapshot().map(|s| s.composite()), Some(Sentiment::Fear));
}

#[tokio::test]
async fn test_malformed_and_bad_status_are_recorded() {
    let backend = ScriptedBackend::always(Err(FetchError::BadResponse {
        status: 500,
        detail: Some("collection failed".to_string()),
    }))
    .then(Err(FetchError::MalformedPayload {
        detail: "missing field `scores`".to_string(),
    }));
    let client = client(backend);

    client.refresh().await;
    let state = client.state();
    let error = state.last_error().unwrap();
    assert_eq!(error.kind(), ErrorKind::MalformedPayload);
    assert_eq!(error.user_message(Locale::English), "Failed to load data.");

    client.refresh().await;
    assert_eq!(
        client.state().last_error().map(|e| e.kind()),
        Some(ErrorKind::BadResponse)
    );
}

// ============================================================================
// In-flight Flag
// ============================================================================

#[tokio::test]
async fn test_is_fetching_only_while_pending() {
    let (backend, release) =
        ScriptedBackend::always(Err(unreachable())).then_gated(Ok(payload(60.0, 60.0, 60.0, 60.0)));
    let client = client(backend);
    let mut rx = client.subscribe();

    assert!(!client.state().is_fetching());

    let task = {
        let client = client.clone();
        tokio::spawn(async move { client.refresh().await })
    };

    let pending = wait_until(&mut rx, ClientState::is_fetching).await;
    assert!(pending.snapshot().is_none());
    assert!(!pending.has_completed_first_fetch());

    release.send(()).unwrap();
    assert_eq!(task.await.unwrap(), RefreshOutcome::Updated);

    let done = client.state();
    assert!(!done.is_fetching());
    assert!(done.snapshot().is_some());
}

#[tokio::test]
async fn test_is_fetching_cleared_on_failure() {
    let client = client(ScriptedBackend::always(Err(unreachable())));
    client.refresh().await;
    assert!(!client.state().is_fetching());
}

#[tokio::test]
async fn test_is_fetching_cleared_when_refresh_is_cancelled() {
    let (backend, _release) =
        ScriptedBackend::always(Err(unreachable())).then_gated(Ok(payload(60.0, 60.0, 60.0, 60.0)));
    let client = client(backend);

    // Dropping the refresh future mid-request must still clear the flag
    let cancelled = timeout(Duration::from_millis(50), client.refresh()).await;
    assert!(cancelled.is_err());

    let state = client.state();
    assert!(!state.is_fetching());
    assert!(state.snapshot().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_slow_backend_times_out() {
    let backend = ScriptedBackend::always(Err(unreachable()))
        .then_after(Ok(payload(60.0, 60.0, 60.0, 60.0)), Duration::from_secs(60));
    let client = client(backend);

    let outcome = client.refresh().await;
    assert_eq!(
        outcome,
        RefreshOutcome::Failed(FetchError::Timeout {
            after: Duration::from_secs(15)
        })
    );

    let state = client.state();
    let error = state.last_error().unwrap();
    assert_eq!(error.kind(), ErrorKind::Timeout);
    assert!(error.user_message(Locale::English).contains("backend server"));
}

// ============================================================================
// Scheduling
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_start_fetches_immediately() {
    let client = client(ScriptedBackend::always(Ok(payload(10.0, 10.0, 10.0, 10.0))));
    let mut rx = client.subscribe();

    client.start();
    assert!(client.is_running());

    let state = wait_until(&mut rx, |s| s.snapshot().is_some()).await;
    assert_eq!(state.snapshot().map(|s| s.composite()), Some(Sentiment::ExtremeFear));
    assert_eq!(client.backend().calls(), 1);

    client.stop();
}

#[tokio::test(start_paused = true)]
async fn test_first_load_failure_completes_initial_phase() {
    let client = client(ScriptedBackend::always(Err(unreachable())));
    let mut rx = client.subscribe();

    client.start();
    let state = wait_until(&mut rx, |s| s.has_completed_first_fetch() && !s.is_fetching()).await;

    assert!(state.snapshot().is_none());
    assert!(matches!(state.presentation(), Presentation::FullError(_)));
    assert_eq!(
        state.last_error().unwrap().user_message(Locale::English),
        "Failed to load data. Please check that the backend server is running."
    );

    client.stop();
}

#[tokio::test(start_paused = true)]
async fn test_start_twice_keeps_single_timer() {
    let client = client(ScriptedBackend::always(Ok(payload(50.0, 50.0, 50.0, 50.0))));

    client.start();
    client.start();

    // Immediate fetch plus two interval ticks
    tokio::time::sleep(Duration::from_secs(2 * 300 + 1)).await;
    assert_eq!(client.backend().calls(), 3);

    client.stop();
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_future_ticks() {
    let client = client(ScriptedBackend::always(Ok(payload(50.0, 50.0, 50.0, 50.0))));
    let mut rx = client.subscribe();

    client.start();
    wait_until(&mut rx, |s| s.snapshot().is_some()).await;

    client.stop();
    assert!(!client.is_running());

    tokio::time::sleep(Duration::from_secs(20 * 60)).await;
    assert_eq!(client.backend().calls(), 1);

    // Restarting after stop schedules again
    client.start();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(client.backend().calls(), 2);
    client.stop();
}

#[tokio::test]
async fn test_stop_without_start_is_noop() {
    let client = client(ScriptedBackend::always(Ok(payload(50.0, 50.0, 50.0, 50.0))));
    client.stop();
    client.stop();
    assert!(!client.is_running());
    assert_eq!(client.backend().calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_in_flight_request_lands_after_stop() {
    let backend = ScriptedBackend::always(Err(unreachable()))
        .then_after(Ok(payload(90.0, 90.0, 90.0, 90.0)), Duration::from_secs(5));
    let client = client(backend);
    let mut rx = client.subscribe();

    client.start();
    wait_until(&mut rx, ClientState::is_fetching).await;
    client.stop();

    let state = wait_until(&mut rx, |s| !s.is_fetching()).await;
    assert_eq!(state.snapshot().map(|s| s.composite()), Some(Sentiment::ExtremeGreed));
}

// ============================================================================
// Overlapping Refreshes
// ============================================================================

/// Older request is slow, newer request is fast
fn racing_backend() -> ScriptedBackend {
    ScriptedBackend::always(Err(unreachable()))
        .then_after(Ok(payload(10.0, 10.0, 10.0, 10.0)), Duration::from_secs(10))
        .then_after(Ok(payload(90.0, 90.0, 90.0, 90.0)), Duration::from_secs(1))
}

async fn race(client: &IndexClient<ScriptedBackend>) -> (RefreshOutcome, RefreshOutcome) {
    let older = {
        let client = client.clone();
        tokio::spawn(async move { client.refresh().await })
    };
    // Make sure the older request is issued first
    tokio::task::yield_now().await;
    while client.backend().calls() < 1 {
        tokio::task::yield_now().await;
    }
    let newer = client.refresh().await;
    (older.await.unwrap(), newer)
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_refreshes_last_write_wins() {
    let client = client(racing_backend());

    let (older, newer) = race(&client).await;
    assert_eq!(older, RefreshOutcome::Updated);
    assert_eq!(newer, RefreshOutcome::Updated);

    // The slow, older response resolved last and overwrote the newer one
    let state = client.state();
    assert_eq!(state.snapshot().map(|s| s.final_index()), Some(10.0));
    assert!(!state.is_fetching());
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_refreshes_drop_stale() {
    let mut config = ClientConfig::default();
    config.drop_stale_responses = true;
    let client = IndexClient::new(racing_backend(), config);

    let (older, newer) = race(&client).await;
    assert_eq!(newer, RefreshOutcome::Updated);
    assert_eq!(older, RefreshOutcome::Discarded);

    let state = client.state();
    assert_eq!(state.snapshot().map(|s| s.final_index()), Some(90.0));
    assert!(!state.is_fetching());
}
