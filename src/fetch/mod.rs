//! Resilient document fetching: HTTP client, retry/backoff, caching.

pub mod client;
pub mod fetcher;

pub use client::{HttpClient, PageSource};
pub use fetcher::{DocFetcher, FetchOutcome};

use thiserror::Error;

/// Failure classes for a single fetch.
///
/// Only timeouts are retryable; everything else ends the attempt chain
/// immediately so callers can tell a dead host from a mangled page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("empty response body")]
    EmptyBody,

    #[error("response body is not structured markup")]
    Unparsable,
}

impl FetchError {
    /// Returns true if waiting and retrying might help.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_timeouts_are_retryable() {
        assert!(FetchError::Timeout.is_retryable());
        assert!(!FetchError::Transport("dns failure".into()).is_retryable());
        assert!(!FetchError::EmptyBody.is_retryable());
        assert!(!FetchError::Unparsable.is_retryable());
    }
}
