//! Dashboard widgets

pub mod gauge;
pub mod json_panel;
pub mod metric_card;

pub use gauge::SentimentGauge;
pub use json_panel::{JsonPanel, JsonPanelState};
pub use metric_card::MetricCardView;
