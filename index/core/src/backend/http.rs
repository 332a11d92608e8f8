//! HTTP Backend Implementation
//!
//! Talks to the index service over plain HTTP:
//! - `GET /api/index` - current composite index, sub-scores and raw figures
//!
//! No authentication, no query parameters, no request body.

use std::time::Duration;

use async_trait::async_trait;

use super::traits::IndexBackend;
use crate::config::ClientConfig;
use crate::error::FetchError;
use crate::snapshot::IndexPayload;

/// Path of the index endpoint, relative to the base URL
pub const INDEX_PATH: &str = "/api/index";

/// reqwest-backed index client
#[derive(Clone, Debug)]
pub struct HttpBackend {
    /// Base URL without trailing slash
    base_url: String,
    /// Per-request timeout
    timeout: Duration,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpBackend {
    /// Create a backend for `base_url` with a fixed request timeout.
    ///
    /// # Errors
    ///
    /// Fails only if the TLS backend cannot be initialised.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("feargreed/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url,
            timeout,
            http_client,
        })
    }

    /// Create from loaded configuration
    ///
    /// # Errors
    ///
    /// See [`HttpBackend::new`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        Self::new(config.base_url.clone(), config.request_timeout)
    }

    /// Base URL this backend talks to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full index endpoint URL
    fn index_url(&self) -> String {
        format!("{}{INDEX_PATH}", self.base_url)
    }

    /// Map a reqwest failure onto the fetch taxonomy
    fn classify_transport_error(&self, err: &reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                after: self.timeout,
            }
        } else if err.is_decode() {
            FetchError::MalformedPayload {
                detail: error_chain(err),
            }
        } else {
            FetchError::NetworkUnreachable {
                endpoint: self.index_url(),
                detail: error_chain(err),
            }
        }
    }
}

#[async_trait]
impl IndexBackend for HttpBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    fn endpoint(&self) -> String {
        self.index_url()
    }

    async fn fetch_index(&self) -> Result<IndexPayload, FetchError> {
        let response = self
            .http_client
            .get(self.index_url())
            .send()
            .await
            .map_err(|e| self.classify_transport_error(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.classify_transport_error(&e))?;

        if !status.is_success() {
            return Err(FetchError::BadResponse {
                status: status.as_u16(),
                detail: server_error_message(&body),
            });
        }

        IndexPayload::parse(&body)
    }
}

/// Extract `{"error": "..."}` from a failure body
fn server_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("error")?.as_str().map(String::from)
}

/// Render an error with its source chain ("a: b: c")
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
