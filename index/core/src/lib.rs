//! Fear & Greed Core - Headless Index Synchronization for fear-greed
//!
//! This crate keeps a local, eventually-fresh copy of a composite market
//! sentiment index ("Fear & Greed") served by a remote API, and classifies
//! scores into sentiment bands. It can drive a terminal dashboard, a
//! headless watcher, or run inside tests with a scripted backend.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Consumers                              │
//! │   ┌──────────────┐    ┌──────────────┐    ┌───────────────┐  │
//! │   │  Dashboard   │    │   Watcher    │    │     Tests     │  │
//! │   │  (ratatui)   │    │  (headless)  │    │               │  │
//! │   └──────┬───────┘    └──────┬───────┘    └───────┬───────┘  │
//! │          └───────── watch::Receiver<ClientState> ─┘          │
//! └──────────────────────────────┼───────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┼───────────────────────────────┐
//! │                        FEARGREED CORE                         │
//! │   ┌──────────────────────────┴───────────────────────────┐   │
//! │   │                     IndexClient                       │   │
//! │   │   ┌───────────┐   ┌─────────────┐   ┌─────────────┐   │   │
//! │   │   │   Timer   │──▶│   refresh   │──▶│ ClientState │   │   │
//! │   │   └───────────┘   └──────┬──────┘   └─────────────┘   │   │
//! │   └──────────────────────────┼────────────────────────────┘   │
//! │                      IndexBackend (HTTP)                      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`IndexClient`]: periodic synchronizer (`start` / `stop` / `refresh`)
//! - [`ClientState`]: last good snapshot, in-flight flag, last error
//! - [`IndexSnapshot`]: one immutable reading
//! - [`classify`] / [`Sentiment`]: score → sentiment band
//! - [`FetchError`]: why a refresh failed
//!
//! # Quick Start
//!
//! ```ignore
//! use feargreed_core::{load_config, HttpBackend, IndexClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let backend = HttpBackend::from_config(&config)?;
//!     let client = IndexClient::new(backend, config);
//!
//!     let mut updates = client.subscribe();
//!     client.start();
//!
//!     while updates.changed().await.is_ok() {
//!         let state = updates.borrow_and_update().clone();
//!         if let Some(snapshot) = state.snapshot() {
//!             println!("{:.1} {}", snapshot.final_index(), snapshot.composite().label());
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # No UI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod snapshot;
pub mod state;

// Re-exports for convenience
pub use backend::{HttpBackend, IndexBackend};
pub use classify::{classify, Locale, Sentiment, NEUTRAL_SCORE};
pub use client::{IndexClient, RefreshOutcome};
pub use config::{
    default_config_path, load_config, load_config_from_path, ClientConfig, ConfigError,
    ConfigOverrides, ConfigSource,
};
pub use error::{ErrorInfo, ErrorKind, FetchError};
pub use snapshot::{IndexPayload, IndexSnapshot, MetricId, RawMetrics, SubScores};
pub use state::{ClientState, Presentation};
