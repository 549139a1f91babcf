//! RSS/Atom feed client
//!
//! Fetches and parses the curated crypto and gold feeds.

use std::time::Duration;

use alert_core::{Article, BotConfig, Category, FeedConfig};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::{debug, error, info, instrument, warn};

use crate::error::NewsError;
use crate::source::ArticleSource;

const USER_AGENT: &str = "CryptoGoldAlertBot/1.0";

/// Articles gathered for one category, plus how many of its feeds failed
#[derive(Debug, Default)]
pub struct CategoryFetch {
    pub articles: Vec<Article>,
    pub failed_feeds: usize,
}

/// Feed client
pub struct FeedClient {
    client: Client,
    feeds: Vec<FeedConfig>,
    max_articles_per_fetch: usize,
    max_retries: u32,
    max_article_age: chrono::Duration,
}

impl FeedClient {
    /// Create a feed client from the bot configuration
    pub fn new(config: &BotConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            feeds: config.feeds.clone(),
            max_articles_per_fetch: config.max_articles_per_fetch,
            max_retries: config.max_retries.max(1),
            max_article_age: chrono::Duration::hours(config.max_article_age_hours),
        }
    }

    /// Create with custom feeds
    pub fn with_feeds(config: &BotConfig, feeds: Vec<FeedConfig>) -> Self {
        Self {
            feeds,
            ..Self::new(config)
        }
    }

    pub fn feeds(&self) -> &[FeedConfig] {
        &self.feeds
    }

    /// Fetch articles from every feed of one category
    pub async fn fetch_category(&self, category: Category) -> CategoryFetch {
        info!("Fetching {} news...", category);
        let mut fetch = CategoryFetch::default();

        for feed in self.feeds.iter().filter(|f| f.category == category) {
            match self.fetch_feed(feed).await {
                Ok(articles) => {
                    info!(
                        "Fetched {} {} articles from {}",
                        articles.len(),
                        category,
                        feed.url
                    );
                    fetch.articles.extend(articles);
                }
                Err(e) => {
                    error!("Failed to fetch {}: {}", feed.url, e);
                    fetch.failed_feeds += 1;
                }
            }
        }

        fetch
    }

    /// Fetch a single feed, retrying transport failures with exponential backoff
    #[instrument(skip(self, feed), fields(feed = %feed.name))]
    pub async fn fetch_feed(&self, feed: &FeedConfig) -> Result<Vec<Article>, NewsError> {
        let mut attempt = 0;

        loop {
            debug!("Fetching feed: {} (attempt {})", feed.url, attempt + 1);

            match self.fetch_body(&feed.url).await {
                Ok(body) => return self.parse_feed(&body, feed, Utc::now()),
                Err(e) if e.is_retryable() && attempt + 1 < self.max_retries => {
                    warn!("Request error for {}: {}", feed.url, e);
                    tokio::time::sleep(retry_backoff(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_body(&self, url: &str) -> Result<Vec<u8>, NewsError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| NewsError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NewsError::HttpStatus {
                status: response.status().as_u16(),
                message: format!("Failed to fetch {}", url),
            });
        }

        let content = response
            .bytes()
            .await
            .map_err(|e| NewsError::RequestFailed(e.to_string()))?;

        Ok(content.to_vec())
    }

    /// Parse a feed body, trying RSS first and then Atom
    pub fn parse_feed(
        &self,
        body: &[u8],
        feed: &FeedConfig,
        now: DateTime<Utc>,
    ) -> Result<Vec<Article>, NewsError> {
        if let Ok(channel) = rss::Channel::read_from(body) {
            return Ok(self.parse_rss_channel(&channel, feed, now));
        }

        if let Ok(atom_feed) = atom_syndication::Feed::read_from(body) {
            return Ok(self.parse_atom_feed(&atom_feed, feed, now));
        }

        Err(NewsError::ParseError(format!(
            "Failed to parse feed: {}",
            feed.url
        )))
    }

    /// Parse RSS channel into Articles
    fn parse_rss_channel(
        &self,
        channel: &rss::Channel,
        feed: &FeedConfig,
        now: DateTime<Utc>,
    ) -> Vec<Article> {
        let source = source_name(channel.title(), &feed.url);

        channel
            .items()
            .iter()
            .take(self.max_articles_per_fetch)
            .filter_map(|item| {
                let published = item
                    .pub_date()
                    .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
                    .map(|d| d.with_timezone(&Utc));

                self.build_article(
                    item.title().unwrap_or_default(),
                    item.description().unwrap_or_default(),
                    item.link().unwrap_or_default(),
                    published,
                    feed.category,
                    &source,
                    now,
                )
            })
            .collect()
    }

    /// Parse Atom feed into Articles
    fn parse_atom_feed(
        &self,
        atom_feed: &atom_syndication::Feed,
        feed: &FeedConfig,
        now: DateTime<Utc>,
    ) -> Vec<Article> {
        let source = source_name(atom_feed.title().as_str(), &feed.url);

        atom_feed
            .entries()
            .iter()
            .take(self.max_articles_per_fetch)
            .filter_map(|entry| {
                let link = entry
                    .links()
                    .first()
                    .map(|l| l.href().to_string())
                    .unwrap_or_default();

                let published = entry
                    .published()
                    .or_else(|| Some(entry.updated()))
                    .map(|d| d.with_timezone(&Utc));

                let summary = entry.summary().map(|s| s.as_str()).unwrap_or_default();

                self.build_article(
                    entry.title().as_str(),
                    summary,
                    &link,
                    published,
                    feed.category,
                    &source,
                    now,
                )
            })
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn build_article(
        &self,
        title: &str,
        summary: &str,
        link: &str,
        published: Option<DateTime<Utc>>,
        category: Category,
        source: &str,
        now: DateTime<Utc>,
    ) -> Option<Article> {
        // Real-time alerts only
        if let Some(published) = published {
            if now - published > self.max_article_age {
                return None;
            }
        }

        let title = title.trim();
        let link = link.trim();
        if title.is_empty() || link.is_empty() {
            return None;
        }

        let mut article = Article::new(title, summary.trim(), link, category, source);
        article.published = published;
        Some(article)
    }
}

#[async_trait]
impl ArticleSource for FeedClient {
    async fn fetch_all(&self) -> Result<Vec<Article>, NewsError> {
        info!("Starting news fetch cycle...");

        let mut all_articles = Vec::new();
        let mut failed_feeds = 0;
        for category in Category::ALL {
            let fetch = self.fetch_category(category).await;
            failed_feeds += fetch.failed_feeds;
            all_articles.extend(fetch.articles);
        }

        if !self.feeds.is_empty() && failed_feeds == self.feeds.len() {
            return Err(NewsError::AllFeedsFailed(failed_feeds));
        }

        info!("Total articles fetched: {}", all_articles.len());
        Ok(all_articles)
    }
}

/// Feed title, falling back to the feed host
fn source_name(feed_title: &str, feed_url: &str) -> String {
    let title = feed_title.trim();
    if !title.is_empty() {
        return title.to_string();
    }

    url::Url::parse(feed_url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.strip_prefix("www.").unwrap_or(h).to_string()))
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Exponential pause before the next fetch attempt
fn retry_backoff(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt))
}
