//! Error types for the alert bot

use thiserror::Error;

/// Bot-wide error type
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AlertError {
    pub fn parse(msg: impl Into<String>) -> Self {
        AlertError::Parse(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        AlertError::Config(msg.into())
    }
}

/// Result type alias for alert bot operations
pub type AlertResult<T> = Result<T, AlertError>;
