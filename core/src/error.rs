//! Error types for the movie search client.
//!
//! # Design
//! `Cancelled` is a normal outcome for a superseded fetch and callers are
//! expected to swallow it. `NotFound` gets a dedicated variant for the detail
//! endpoint; all other non-2xx responses land in `Http` with the raw status
//! and body for debugging.

use thiserror::Error;

/// Errors produced while building requests, executing them, or parsing the
/// responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Connection, DNS or timeout failure reported by the transport.
    #[error("network error: {0}")]
    Network(String),

    /// The caller aborted the request before it completed.
    #[error("request cancelled")]
    Cancelled,

    /// The response body is not valid JSON or lacks required fields.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Search parameters outside their allowed range.
    #[error("invalid search parameters: {0}")]
    InvalidParams(String),
}

impl ApiError {
    /// Whether the error is the expected result of superseding a request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}
