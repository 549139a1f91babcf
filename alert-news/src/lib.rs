//! News retrieval for the crypto/gold alert bot
//!
//! Fetches the configured RSS/Atom feeds for each category and turns their
//! entries into [`alert_core::Article`] records for the filter pipeline.

pub mod error;
pub mod feed_client;
pub mod source;

pub use error::NewsError;
pub use feed_client::{CategoryFetch, FeedClient};
pub use source::ArticleSource;
