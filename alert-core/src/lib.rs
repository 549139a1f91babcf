//! Core types for the crypto/gold alert bot
//!
//! This crate defines the article record shared by the feed, filter and
//! delivery crates, along with the bot-wide configuration and error type.

pub mod article;
pub mod config;
pub mod error;

pub use article::{Article, Category};
pub use config::{curated_feeds, BotConfig, FeedConfig, KeywordConfig, SUPPORTED_LANGUAGES};
pub use error::{AlertError, AlertResult};
