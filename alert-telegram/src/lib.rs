//! Chat delivery for the crypto/gold alert bot
//!
//! - [`client`]: Telegram Bot API client
//! - [`format`]: HTML message builders for alerts and status notices
//! - [`i18n`]: English/Hindi translation tables

pub mod client;
pub mod error;
pub mod format;
pub mod i18n;
pub mod sink;

pub use client::TelegramClient;
pub use error::TelegramError;
pub use i18n::{translate, Language};
pub use sink::AlertSink;
