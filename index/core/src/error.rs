//! Fetch Error Taxonomy
//!
//! Every failure of a refresh is converted into a [`FetchError`] at the
//! client boundary and stored in
//! [`ClientState::last_error`](crate::state::ClientState::last_error).
//! Nothing here is ever returned to the consumer as an `Err`.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::classify::Locale;

/// Why a refresh failed
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FetchError {
    /// Connection could not be established
    #[error("cannot reach {endpoint}: {detail}")]
    NetworkUnreachable {
        /// The URL that was requested
        endpoint: String,
        /// Transport-level detail
        detail: String,
    },

    /// Server answered with a non-success status
    #[error("server returned HTTP {status}{}", detail_suffix(.detail))]
    BadResponse {
        /// HTTP status code
        status: u16,
        /// Server-provided error message, if the body carried one
        detail: Option<String>,
    },

    /// Body was not the expected JSON shape
    #[error("malformed response: {detail}")]
    MalformedPayload {
        /// Parser detail (which field was missing, etc.)
        detail: String,
    },

    /// Request exceeded the configured timeout
    #[error("request timed out after {}s", .after.as_secs_f32())]
    Timeout {
        /// The timeout that elapsed
        after: Duration,
    },
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

/// Discriminant of [`FetchError`], for logs and metrics
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`FetchError::NetworkUnreachable`]
    NetworkUnreachable,
    /// See [`FetchError::BadResponse`]
    BadResponse,
    /// See [`FetchError::MalformedPayload`]
    MalformedPayload,
    /// See [`FetchError::Timeout`]
    Timeout,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NetworkUnreachable => "network_unreachable",
            Self::BadResponse => "bad_response",
            Self::MalformedPayload => "malformed_payload",
            Self::Timeout => "timeout",
        };
        f.write_str(s)
    }
}

impl FetchError {
    /// The error's kind
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NetworkUnreachable { .. } => ErrorKind::NetworkUnreachable,
            Self::BadResponse { .. } => ErrorKind::BadResponse,
            Self::MalformedPayload { .. } => ErrorKind::MalformedPayload,
            Self::Timeout { .. } => ErrorKind::Timeout,
        }
    }

    /// Whether the failure was about reaching the server at all.
    ///
    /// Timeouts count: from the user's side they look the same as an
    /// unreachable backend.
    #[must_use]
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::NetworkUnreachable { .. } | Self::Timeout { .. })
    }
}

/// A failure recorded in client state
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorInfo {
    /// What went wrong
    pub error: FetchError,
    /// When the failing refresh finished
    pub occurred_at: DateTime<Utc>,
}

impl ErrorInfo {
    /// Record an error at the current time
    #[must_use]
    pub fn now(error: FetchError) -> Self {
        Self {
            error,
            occurred_at: Utc::now(),
        }
    }

    /// The error's kind
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    /// Message for end users: a generic failure line, plus a hint to check
    /// the backend when the failure was connectivity-related.
    #[must_use]
    pub fn user_message(&self, locale: Locale) -> String {
        let (generic, hint) = match locale {
            Locale::English => (
                "Failed to load data.",
                " Please check that the backend server is running.",
            ),
            Locale::Korean => (
                "데이터를 불러오는 데 실패했습니다.",
                " 백엔드 서버가 실행 중인지 확인해주세요.",
            ),
        };

        if self.error.is_connectivity() {
            format!("{generic}{hint}")
        } else {
            generic.to_string()
        }
    }
}
