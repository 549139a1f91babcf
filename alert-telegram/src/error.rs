//! Error types for Telegram delivery

use thiserror::Error;

/// Errors that can occur when sending a message
#[derive(Debug, Error)]
pub enum TelegramError {
    /// HTTP request failed before a response arrived
    #[error("Request failed: {0}")]
    Request(String),

    /// Bot API returned a non-success status
    #[error("Telegram API error (status {status}): {description}")]
    Api { status: u16, description: String },

    /// Bot API answered `ok: false`
    #[error("Telegram rejected message: {0}")]
    Rejected(String),
}
