//! Fear & Greed TUI - Terminal dashboard for the Fear & Greed index
//!
//! This crate renders the index kept in sync by `feargreed-core` as a
//! full-screen terminal dashboard: a sentiment gauge, the composite
//! category, one card per sub-indicator and an optional raw data panel.
//!
//! # Architecture
//!
//! - **Display**: pure derivation of everything drawn from a `ClientState`
//! - **Widgets**: gauge, metric card, scrollable JSON panel
//! - **App**: event loop over terminal events and client state changes

pub mod app;
pub mod display;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use display::{DisplayState, MetricCard, ScreenMode};
