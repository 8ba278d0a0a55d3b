//! Error types for feed operations.

use thiserror::Error;

/// Errors that make the listing source unavailable for one poll.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Marketplace returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Failed to parse listings: {0}")]
    ParseError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Result type for feed operations.
pub type FeedResult<T> = Result<T, FeedError>;

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FeedError::Timeout(err.to_string())
        } else if err.is_decode() {
            FeedError::ParseError(err.to_string())
        } else {
            FeedError::RequestFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::ParseError(err.to_string())
    }
}

impl From<url::ParseError> for FeedError {
    fn from(err: url::ParseError) -> Self {
        FeedError::InvalidEndpoint(err.to_string())
    }
}

impl FeedError {
    /// Returns true if the next poll can reasonably be expected to succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FeedError::RequestFailed(_) | FeedError::Timeout(_) => true,
            FeedError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            FeedError::ParseError(_) | FeedError::InvalidEndpoint(_) => false,
        }
    }
}
