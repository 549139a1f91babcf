//! Telegram Bot API client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::error::TelegramError;
use crate::format::{truncate_chars, TELEGRAM_MAX_MESSAGE_LEN};
use crate::sink::AlertSink;

const API_BASE_URL: &str = "https://api.telegram.org";

/// Envelope every Bot API response is wrapped in
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram client bound to a single chat
pub struct TelegramClient {
    client: Client,
    base_url: String,
    chat_id: String,
}

impl TelegramClient {
    /// Create a new client for one bot token and chat
    pub fn new(token: &str, chat_id: &str, timeout: Duration) -> Self {
        Self::with_api_base(API_BASE_URL, token, chat_id, timeout)
    }

    /// Create a client against a different Bot API host
    pub fn with_api_base(api_base: &str, token: &str, chat_id: &str, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), token),
            chat_id: chat_id.to_string(),
        }
    }

    fn send_message_url(&self) -> String {
        format!("{}/sendMessage", self.base_url)
    }

    /// Send an HTML message to the configured chat
    #[instrument(skip(self, text), fields(len = text.len()))]
    pub async fn send_message(&self, text: &str) -> Result<(), TelegramError> {
        let text = fit_message(text);
        let params = [
            ("chat_id", self.chat_id.as_str()),
            ("text", text.as_str()),
            ("parse_mode", "HTML"),
            ("disable_web_page_preview", "true"),
        ];

        let response = self
            .client
            .post(self.send_message_url())
            .form(&params)
            .send()
            .await
            .map_err(|e| TelegramError::Request(e.to_string()))?;

        let status = response.status();
        let body: Option<ApiResponse> = response.json().await.ok();

        if !status.is_success() {
            return Err(TelegramError::Api {
                status: status.as_u16(),
                description: body
                    .and_then(|b| b.description)
                    .unwrap_or_else(|| "Unknown error".to_string()),
            });
        }

        match body {
            Some(ApiResponse { ok: true, .. }) => Ok(()),
            Some(ApiResponse { description, .. }) => Err(TelegramError::Rejected(
                description.unwrap_or_else(|| "Unknown error".to_string()),
            )),
            None => Err(TelegramError::Rejected("unreadable response body".to_string())),
        }
    }
}

#[async_trait]
impl AlertSink for TelegramClient {
    async fn send(&self, text: &str) -> Result<(), TelegramError> {
        self.send_message(text).await
    }
}

/// Cut a message down to what the Bot API accepts
fn fit_message(text: &str) -> String {
    if text.chars().count() > TELEGRAM_MAX_MESSAGE_LEN {
        warn!("Message exceeds {} characters, truncating", TELEGRAM_MAX_MESSAGE_LEN);
        return truncate_chars(text, TELEGRAM_MAX_MESSAGE_LEN);
    }
    text.to_string()
}
