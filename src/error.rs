//! Error types for page fetching.
//!
//! A failed fetch is never fatal: the loader returns to idle and the error is
//! shown in the footer until the next attempt.  Everything that can go wrong
//! talking to a page source is folded into one [`FetchError`].

use std::fmt;

use thiserror::Error;

/// What went wrong while fetching a page.
///
/// Every kind is treated as retryable.  If a source ever needs permanent
/// failures, add the classification here rather than guessing at call sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The configured base URL could not be turned into a request URL.
    InvalidUrl,
    /// Connection refused, reset, DNS failure, etc.
    Network,
    /// Connect or request timeout elapsed.
    Timeout,
    /// The server answered with a non-2xx status.
    HttpStatus(u16),
    /// The body was not a JSON array of posts.
    Malformed,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Malformed => write!(f, "malformed payload"),
        }
    }
}

/// A failed page fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return FetchError::new(FailureKind::Timeout, err.to_string());
        }
        if let Some(status) = err.status() {
            return FetchError::new(FailureKind::HttpStatus(status.as_u16()), err.to_string());
        }
        FetchError::new(FailureKind::Network, err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::new(FailureKind::Malformed, err.to_string())
    }
}
