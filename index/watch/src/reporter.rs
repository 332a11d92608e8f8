//! Refresh reporting
//!
//! Turns the client's presentation of its state into one summary line (for
//! logs and `--once`) or a JSON document (for `--json`), and decides when a
//! refresh has settled enough to be worth reporting.

use chrono::{DateTime, Local, Utc};
use serde_json::{json, Value};

use feargreed_core::{ClientState, ErrorInfo, IndexSnapshot, Locale, MetricId, Presentation};

/// Attempt time of a refresh that settled after `last_reported`
///
/// `None` while any request is outstanding, and when the latest attempt was
/// already reported.
pub fn settled_attempt(
    state: &ClientState,
    last_reported: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    if state.is_fetching() {
        return None;
    }
    state.last_attempt_at().filter(|at| Some(*at) != last_reported)
}

/// One-line, human-readable summary of the current state
pub fn summary_line(presentation: Presentation<'_>, locale: Locale) -> String {
    match presentation {
        Presentation::Loading => "waiting for first reading".to_string(),
        Presentation::FullError(error) => error.user_message(locale),
        Presentation::Snapshot { snapshot, stale } => {
            let mut line = format!(
                "{} {:.1} ({})",
                snapshot
                    .fetched_at()
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M:%S"),
                snapshot.final_index(),
                snapshot.composite().label_in(locale),
            );
            for metric in MetricId::ALL {
                line.push_str(&format!(
                    " | {} {:.1} {}",
                    metric.wire_key(),
                    snapshot.score(metric),
                    snapshot.sentiment(metric).label_in(locale),
                ));
            }
            if let Some(error) = stale {
                line.push_str(&format!(" [stale: {}]", error.user_message(locale)));
            }
            line
        }
    }
}

/// Machine-readable view of the current state
pub fn snapshot_json(presentation: Presentation<'_>, locale: Locale) -> Value {
    match presentation {
        Presentation::Loading => json!({ "status": "loading" }),
        Presentation::FullError(error) => json!({
            "status": "error",
            "error": error_json(error, locale),
        }),
        Presentation::Snapshot { snapshot, stale } => {
            let mut value = reading_json(snapshot);
            value["status"] = json!(if stale.is_some() { "stale" } else { "ok" });
            if let Some(error) = stale {
                value["error"] = error_json(error, locale);
            }
            value
        }
    }
}

fn reading_json(snapshot: &IndexSnapshot) -> Value {
    let metrics: serde_json::Map<String, Value> = MetricId::ALL
        .into_iter()
        .map(|metric| {
            (
                metric.wire_key().to_string(),
                json!({
                    "score": snapshot.score(metric),
                    "category": snapshot.sentiment(metric).category_id(),
                    "raw": snapshot.raw_metrics().headline(metric),
                }),
            )
        })
        .collect();

    json!({
        "final_index": snapshot.final_index(),
        "category": snapshot.composite().category_id(),
        "metrics": metrics,
        "fetched_at": snapshot.fetched_at().to_rfc3339(),
        "server_status": snapshot.server_status(),
    })
}

fn error_json(error: &ErrorInfo, locale: Locale) -> Value {
    json!({
        "kind": error.kind().to_string(),
        "message": error.user_message(locale),
        "detail": error.error.to_string(),
        "occurred_at": error.occurred_at.to_rfc3339(),
    })
}
