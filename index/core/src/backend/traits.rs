//! Index Backend Trait
//!
//! Abstraction over "something that can produce the current index reading".
//! The production implementation is [`HttpBackend`](super::HttpBackend);
//! tests plug in scripted backends.

use async_trait::async_trait;

use crate::error::FetchError;
use crate::snapshot::IndexPayload;

/// Source of index readings
#[async_trait]
pub trait IndexBackend: Send + Sync + 'static {
    /// Backend name for logs (e.g. "http")
    fn name(&self) -> &str;

    /// Where readings come from, for logs and error messages
    fn endpoint(&self) -> String;

    /// Perform exactly one request for the current reading.
    ///
    /// Implementations should not retry; the client's schedule is the retry
    /// policy.
    async fn fetch_index(&self) -> Result<IndexPayload, FetchError>;
}
