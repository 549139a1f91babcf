//! Article source abstraction

use alert_core::Article;
use async_trait::async_trait;

use crate::error::NewsError;

/// Anything that can produce one batch of raw articles per cycle
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Fetch every configured feed
    ///
    /// Individual feed failures are absorbed; an error means nothing could be
    /// fetched at all.
    async fn fetch_all(&self) -> Result<Vec<Article>, NewsError>;
}
