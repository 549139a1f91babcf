//! Error types for the news module

use thiserror::Error;

/// Errors that can occur while fetching feeds
#[derive(Debug, Error)]
pub enum NewsError {
    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Feed server returned a non-success status
    #[error("HTTP error (status {status}): {message}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Which feed failed
        message: String,
    },

    /// Body was neither RSS nor Atom
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Every configured feed failed in one cycle
    #[error("All {0} feeds failed")]
    AllFeedsFailed(usize),
}

impl NewsError {
    /// Transport-level failures are worth another attempt; parse failures are not
    pub fn is_retryable(&self) -> bool {
        matches!(self, NewsError::RequestFailed(_) | NewsError::HttpStatus { .. })
    }
}
