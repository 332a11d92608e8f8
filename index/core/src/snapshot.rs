//! Index Snapshot Model
//!
//! [`IndexPayload`] is the wire shape of `GET /api/index`;
//! [`IndexSnapshot`] is the immutable, client-stamped copy kept in
//! [`ClientState`](crate::state::ClientState).

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::classify::{classify, Sentiment};
use crate::error::FetchError;

/// The three sub-metrics that make up the composite index
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricId {
    /// Price momentum (index vs. its 120-day moving average)
    Momentum,
    /// Long/short government bond yield spread
    BondSpread,
    /// Equity vs. treasury return difference
    SafeHaven,
}

impl MetricId {
    /// All metrics in display order
    pub const ALL: [MetricId; 3] = [Self::Momentum, Self::BondSpread, Self::SafeHaven];

    /// Key under `scores` in the response
    #[must_use]
    pub fn wire_key(self) -> &'static str {
        match self {
            Self::Momentum => "momentum",
            Self::BondSpread => "bond_spread",
            Self::SafeHaven => "safe_haven",
        }
    }

    /// Key under `raw_data` in the response
    #[must_use]
    pub fn raw_key(self) -> &'static str {
        match self {
            Self::Momentum => "metric_1_momentum",
            Self::BondSpread => "metric_5_bond_spread",
            Self::SafeHaven => "metric_7_safe_haven",
        }
    }

    /// Headline field inside this metric's raw data
    #[must_use]
    pub fn raw_field(self) -> &'static str {
        match self {
            Self::Momentum => "latest_ratio",
            Self::BondSpread => "latest_spread_US",
            Self::SafeHaven => "latest_diff",
        }
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_key())
    }
}

// ============================================================================
// Wire Format
// ============================================================================

/// Response body of `GET /api/index`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexPayload {
    /// Composite score, 0-100
    pub final_index: f64,
    /// Server-side label; informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Per-metric scores
    pub scores: SubScores,
    /// Per-metric raw figures; absent or `null` means none
    #[serde(default, deserialize_with = "null_as_empty")]
    pub raw_data: RawMetrics,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<RawMetrics, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawMetrics>::deserialize(deserializer)?.unwrap_or_default())
}

impl IndexPayload {
    /// Parse a response body.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::MalformedPayload`] if the body is not JSON or a
    /// required field (`final_index`, any of the three scores) is missing.
    pub fn parse(body: &str) -> Result<Self, FetchError> {
        serde_json::from_str(body).map_err(|e| FetchError::MalformedPayload {
            detail: e.to_string(),
        })
    }
}

/// Sub-metric scores, each 0-100
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    /// Momentum score
    pub momentum: f64,
    /// Bond spread score
    pub bond_spread: f64,
    /// Safe-haven demand score
    pub safe_haven: f64,
    /// Entries this client does not know about, kept as sent
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl SubScores {
    /// Score for a known metric
    #[must_use]
    pub fn get(&self, metric: MetricId) -> f64 {
        match metric {
            MetricId::Momentum => self.momentum,
            MetricId::BondSpread => self.bond_spread,
            MetricId::SafeHaven => self.safe_haven,
        }
    }
}

/// Metric-specific raw figures, keyed by `raw_data` entry name.
///
/// Opaque to classification; only read for display.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawMetrics(BTreeMap<String, serde_json::Value>);

impl RawMetrics {
    /// Numeric field of a raw-data entry, if present
    #[must_use]
    pub fn field(&self, entry: &str, name: &str) -> Option<f64> {
        self.0.get(entry)?.get(name)?.as_f64()
    }

    /// The headline raw figure of a metric (e.g. momentum's `latest_ratio`)
    #[must_use]
    pub fn headline(&self, metric: MetricId) -> Option<f64> {
        self.field(metric.raw_key(), metric.raw_field())
    }

    /// Whether no raw data was sent
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, serde_json::Value>> for RawMetrics {
    fn from(map: BTreeMap<String, serde_json::Value>) -> Self {
        Self(map)
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// One complete set of index values as of one successful fetch
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IndexSnapshot {
    final_index: f64,
    sub_scores: SubScores,
    raw_metrics: RawMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    server_status: Option<String>,
    fetched_at: DateTime<Utc>,
}

impl IndexSnapshot {
    /// Stamp a parsed payload with the client capture time
    #[must_use]
    pub fn from_payload(payload: IndexPayload, fetched_at: DateTime<Utc>) -> Self {
        Self {
            final_index: payload.final_index,
            sub_scores: payload.scores,
            raw_metrics: payload.raw_data,
            server_status: payload.status,
            fetched_at,
        }
    }

    /// Composite score
    #[must_use]
    pub fn final_index(&self) -> f64 {
        self.final_index
    }

    /// Category of the composite score
    #[must_use]
    pub fn composite(&self) -> Sentiment {
        classify(self.final_index)
    }

    /// All sub-metric scores
    #[must_use]
    pub fn sub_scores(&self) -> &SubScores {
        &self.sub_scores
    }

    /// Score of one sub-metric
    #[must_use]
    pub fn score(&self, metric: MetricId) -> f64 {
        self.sub_scores.get(metric)
    }

    /// Category of one sub-metric
    #[must_use]
    pub fn sentiment(&self, metric: MetricId) -> Sentiment {
        classify(self.score(metric))
    }

    /// Raw figures for display
    #[must_use]
    pub fn raw_metrics(&self) -> &RawMetrics {
        &self.raw_metrics
    }

    /// Label the server attached, if any
    #[must_use]
    pub fn server_status(&self) -> Option<&str> {
        self.server_status.as_deref()
    }

    /// When this client received the snapshot
    #[must_use]
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Equal values, ignoring capture time
    #[must_use]
    pub fn same_reading(&self, other: &Self) -> bool {
        self.final_index == other.final_index
            && self.sub_scores == other.sub_scores
            && self.raw_metrics == other.raw_metrics
            && self.server_status == other.server_status
    }
}
