//! Alert delivery abstraction

use async_trait::async_trait;

use crate::error::TelegramError;

/// Destination for formatted alert messages
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Deliver one message; `Ok` means the chat endpoint accepted it
    async fn send(&self, text: &str) -> Result<(), TelegramError>;
}
