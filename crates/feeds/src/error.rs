//! Error types for price source requests.

use thiserror::Error;

/// Errors from a single price source. Always contained by the resolver's
/// fallback chain; never surfaced to callers of `PriceResolver::resolve`.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Request failed: {0}")]
    ConnectionFailed(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("No usable price in response: {0}")]
    MissingPrice(String),
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FeedError::Timeout(err.to_string())
        } else if err.is_decode() {
            FeedError::ParseError(err.to_string())
        } else {
            FeedError::ConnectionFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::ParseError(err.to_string())
    }
}

impl FeedError {
    /// Returns true if the upstream answered but had nothing usable for this token.
    /// Such failures are expected for tokens a source does not list.
    pub fn is_missing_data(&self) -> bool {
        matches!(self, FeedError::MissingPrice(_) | FeedError::HttpStatus(404))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_missing_data() {
        assert!(FeedError::MissingPrice("pairs".to_string()).is_missing_data());
        assert!(FeedError::HttpStatus(404).is_missing_data());
        assert!(!FeedError::HttpStatus(502).is_missing_data());
        assert!(!FeedError::Timeout("10s".to_string()).is_missing_data());
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(FeedError::from(err), FeedError::ParseError(_)));
    }
}
