//! Index API Backend
//!
//! Access to the remote index service through a common trait.
//!
//! # Usage
//!
//! ```ignore
//! use feargreed_core::backend::{HttpBackend, IndexBackend};
//!
//! let backend = HttpBackend::new("http://127.0.0.1:5000", Duration::from_secs(15))?;
//! let payload = backend.fetch_index().await?;
//! ```

mod http;
mod traits;

pub use http::{HttpBackend, INDEX_PATH};
pub use traits::IndexBackend;
