//! Display State Types
//!
//! Everything the dashboard draws, derived from one [`ClientState`] in a
//! single pure function. Rendering never looks at the client state directly.
//!
//! # Design Philosophy
//!
//! The TUI is a thin client: the index client owns the data and its
//! freshness, this module only decides which words and numbers go where.
//!
//! - [`DisplayState`]: header, headline, gauge, cards, screen mode
//! - [`MetricCard`]: one sub-indicator panel
//! - [`ScreenMode`]: full-screen error or dashboard

use chrono::{DateTime, Local, Utc};

use feargreed_core::{
    ClientState, IndexSnapshot, Locale, MetricId, Presentation, Sentiment, NEUTRAL_SCORE,
};

/// Placeholder for a raw figure the server did not send
pub const MISSING_FIGURE: &str = "n/a";

/// Which top-level layout to draw
#[derive(Clone, Debug, PartialEq)]
pub enum ScreenMode {
    /// No data at all and the last attempt failed
    FullError {
        /// User-facing error text
        message: String,
    },
    /// Gauge and cards (or the loading placeholder)
    Dashboard {
        /// Set when the shown data is older than a failed refresh
        stale_notice: Option<String>,
    },
}

/// One sub-indicator panel
#[derive(Clone, Debug, PartialEq)]
pub struct MetricCard {
    /// Which indicator this card shows
    pub metric: MetricId,
    /// Card heading
    pub title: &'static str,
    /// One-sentence explanation
    pub description: &'static str,
    /// Formatted raw figure, or [`MISSING_FIGURE`]
    pub raw_figure: String,
    /// Score formatted to one decimal
    pub score: String,
    /// Band of the score
    pub sentiment: Sentiment,
    /// Localized band label
    pub category: &'static str,
}

/// Complete render input for one frame
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayState {
    /// Freshness line at the top
    pub header: String,
    /// Composite category label (or loading text)
    pub headline: String,
    /// Composite band, when there is a snapshot
    pub headline_sentiment: Option<Sentiment>,
    /// Value the gauge needle points at
    pub gauge_value: f64,
    /// Sub-indicator cards; empty without a snapshot
    pub cards: Vec<MetricCard>,
    /// Layout selection
    pub screen: ScreenMode,
    /// Pretty-printed snapshot for the raw data panel
    pub raw_json: Option<String>,
    /// Whether a refresh is pending
    pub is_fetching: bool,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::from_client_state(&ClientState::default(), Locale::default())
    }
}

impl DisplayState {
    /// Derive the display state for the given client state
    pub fn from_client_state(state: &ClientState, locale: Locale) -> Self {
        let text = Strings::for_locale(locale);
        let snapshot = state.snapshot();

        let header = match snapshot {
            Some(snapshot) => {
                let mut header = format!(
                    "{} {}",
                    text.last_updated,
                    format_timestamp(snapshot.fetched_at())
                );
                if state.is_fetching() {
                    header.push_str(text.refreshing);
                }
                header
            }
            None if state.is_fetching() => text.loading.to_string(),
            None => text.no_data.to_string(),
        };

        let screen = match state.presentation() {
            Presentation::FullError(error) => ScreenMode::FullError {
                message: error.user_message(locale),
            },
            Presentation::Snapshot { stale, .. } => ScreenMode::Dashboard {
                stale_notice: stale.map(|error| error.user_message(locale)),
            },
            Presentation::Loading => ScreenMode::Dashboard { stale_notice: None },
        };

        Self {
            header,
            headline: snapshot.map_or_else(
                || text.loading.to_string(),
                |s| s.composite().label_in(locale).to_string(),
            ),
            headline_sentiment: snapshot.map(IndexSnapshot::composite),
            gauge_value: snapshot.map_or(NEUTRAL_SCORE, IndexSnapshot::final_index),
            cards: snapshot
                .map(|s| metric_cards(s, locale))
                .unwrap_or_default(),
            screen,
            raw_json: snapshot.and_then(|s| serde_json::to_string_pretty(s).ok()),
            is_fetching: state.is_fetching(),
        }
    }
}

fn metric_cards(snapshot: &IndexSnapshot, locale: Locale) -> Vec<MetricCard> {
    MetricId::ALL
        .into_iter()
        .map(|metric| {
            let (title, description) = card_text(metric, locale);
            let sentiment = snapshot.sentiment(metric);
            MetricCard {
                metric,
                title,
                description,
                raw_figure: raw_figure(metric, snapshot.raw_metrics().headline(metric)),
                score: format!("{:.1}", snapshot.score(metric)),
                sentiment,
                category: sentiment.label_in(locale),
            }
        })
        .collect()
}

/// Format a metric's headline raw value the way the dashboard shows it
pub fn raw_figure(metric: MetricId, value: Option<f64>) -> String {
    let Some(value) = value else {
        return MISSING_FIGURE.to_string();
    };
    match metric {
        // Ratio to the moving average, as a percentage
        MetricId::Momentum => format!("{:.1}%", value * 100.0),
        // Already in percentage points
        MetricId::BondSpread => format!("{value:.2}%p"),
        // Return difference as a fraction
        MetricId::SafeHaven => format!("{:.2}%p", value * 100.0),
    }
}

fn card_text(metric: MetricId, locale: Locale) -> (&'static str, &'static str) {
    match (locale, metric) {
        (Locale::English, MetricId::Momentum) => (
            "1. KOSPI Momentum",
            "Ratio of the KOSPI to its 120-day moving average.",
        ),
        (Locale::English, MetricId::BondSpread) => (
            "2. Yield Curve Spread (US)",
            "US 10-year minus 3-month yield. Weighs heavily on the KOSPI.",
        ),
        (Locale::English, MetricId::SafeHaven) => (
            "3. Safe-Haven Demand",
            "20-day return gap between the KOSPI and a treasury bond ETF.",
        ),
        (Locale::Korean, MetricId::Momentum) => (
            "1. KOSPI 모멘텀",
            "KOSPI 지수와 120일 이동평균선의 비율입니다.",
        ),
        (Locale::Korean, MetricId::BondSpread) => (
            "2. 장단기 금리차 (미국)",
            "미국 10년물과 3개월물 금리차. KOSPI에 큰 영향을 줍니다.",
        ),
        (Locale::Korean, MetricId::SafeHaven) => (
            "3. 안전 자산 수요",
            "KOSPI와 국채 ETF의 20일 수익률 차이입니다.",
        ),
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Fixed UI strings
struct Strings {
    last_updated: &'static str,
    refreshing: &'static str,
    loading: &'static str,
    no_data: &'static str,
    fetching: &'static str,
    scroll: &'static str,
}

impl Strings {
    fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::English => Self {
                last_updated: "Last Updated:",
                refreshing: " (refreshing...)",
                loading: "Loading data...",
                no_data: "No data",
                fetching: "⟳ refreshing...",
                scroll: "↑/↓ scroll",
            },
            Locale::Korean => Self {
                last_updated: "마지막 업데이트:",
                refreshing: " (새로고침 중...)",
                loading: "데이터 로딩 중...",
                no_data: "데이터 없음",
                fetching: "⟳ 새로고침 중...",
                scroll: "↑/↓ 스크롤",
            },
        }
    }
}

/// Dashboard heading
pub fn title(locale: Locale) -> &'static str {
    match locale {
        Locale::English => "KOSPI Fear & Greed Index",
        Locale::Korean => "KOSPI 공포 & 탐욕 지수",
    }
}

/// Short key help for the status line
pub fn key_help(locale: Locale) -> &'static str {
    match locale {
        Locale::English => "q quit | r refresh | d raw data",
        Locale::Korean => "q 종료 | r 새로고침 | d 원본 데이터",
    }
}

/// Bottom line: key help, then the scroll hint and the pending-refresh marker
pub fn status_line(display: &DisplayState, locale: Locale, show_raw: bool) -> String {
    let text = Strings::for_locale(locale);
    let mut status = format!(" {}", key_help(locale));
    if show_raw {
        status.push_str(" | ");
        status.push_str(text.scroll);
    }
    if display.is_fetching {
        status.push_str(" | ");
        status.push_str(text.fetching);
    }
    status
}
