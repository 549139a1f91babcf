//! Bot configuration
//!
//! Everything the bot needs is collected into [`BotConfig`] once at startup
//! and passed down explicitly; no module reads the environment on its own.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::article::Category;
use crate::error::{AlertError, AlertResult};

/// Supported alert languages
pub const SUPPORTED_LANGUAGES: [&str; 2] = ["en", "hi"];

/// A single syndication feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Display name of the feed
    pub name: String,
    /// RSS/Atom URL
    pub url: String,
    /// Category every article from this feed is tagged with
    pub category: Category,
}

impl FeedConfig {
    pub fn new(name: &str, url: &str, category: Category) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            category,
        }
    }
}

/// Curated crypto and gold feeds
pub fn curated_feeds() -> Vec<FeedConfig> {
    vec![
        // Crypto
        FeedConfig::new(
            "CoinDesk",
            "https://www.coindesk.com/arc/outboundfeeds/rss/",
            Category::Crypto,
        ),
        FeedConfig::new("Cointelegraph", "https://cointelegraph.com/rss", Category::Crypto),
        FeedConfig::new("Decrypt", "https://decrypt.co/feed", Category::Crypto),
        // Gold
        FeedConfig::new(
            "Kitco",
            "https://www.kitco.com/news/kitconews.rss",
            Category::Gold,
        ),
        FeedConfig::new("Mining.com", "https://www.mining.com/rss/", Category::Gold),
        FeedConfig::new("GoldPrice", "https://www.goldprice.org/rss.xml", Category::Gold),
    ]
}

/// Keyword lists used for gating and scoring, one per category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordConfig {
    pub crypto: Vec<String>,
    pub gold: Vec<String>,
}

impl KeywordConfig {
    pub fn for_category(&self, category: Category) -> &[String] {
        match category {
            Category::Crypto => &self.crypto,
            Category::Gold => &self.gold,
        }
    }
}

impl Default for KeywordConfig {
    fn default() -> Self {
        let crypto = [
            "bitcoin", "ethereum", "binance", "etf", "crypto", "cryptocurrency", "altcoin",
            "market", "bull", "bear", "trading", "btc", "eth", "blockchain", "defi", "nft",
            "coin", "digital", "mining", "wallet", "exchange", "price", "surge", "rally", "drop",
            "investment", "token", "decentralized", "web3",
        ];
        let gold = [
            "gold", "precious", "metals", "bullion", "mining", "miners", "copper", "silver",
            "commodity", "resources", "exploration", "discovery", "reserves", "production",
            "output", "market", "price", "investment", "safe", "haven", "inflation",
        ];

        Self {
            crypto: crypto.iter().map(|s| s.to_string()).collect(),
            gold: gold.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Process-wide bot configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
    /// Alert language code ("en" or "hi")
    pub language: String,
    pub fetch_interval_minutes: u64,
    /// Entries taken from the head of each feed
    pub max_articles_per_fetch: usize,
    pub feeds: Vec<FeedConfig>,
    pub keywords: KeywordConfig,
    /// Persisted sent-title history
    pub sent_headlines_file: PathBuf,
    /// Timestamp file touched after every completed cycle
    pub activity_file: PathBuf,
    pub max_stored_headlines: usize,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    /// Feed entries older than this are dropped
    pub max_article_age_hours: i64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            telegram_bot_token: String::new(),
            telegram_chat_id: String::new(),
            language: "en".to_string(),
            fetch_interval_minutes: 2,
            max_articles_per_fetch: 15,
            feeds: curated_feeds(),
            keywords: KeywordConfig::default(),
            sent_headlines_file: PathBuf::from("data/sent_headlines.json"),
            activity_file: PathBuf::from("data/last_activity.txt"),
            max_stored_headlines: 50,
            request_timeout_secs: 30,
            max_retries: 3,
            max_article_age_hours: 6,
        }
    }
}

impl BotConfig {
    /// Load configuration from environment variables
    ///
    /// Reads:
    /// - TELEGRAM_BOT_TOKEN, TELEGRAM_CHAT_ID
    /// - DEFAULT_LANGUAGE (default "en")
    /// - FETCH_INTERVAL_MINUTES (default 2), MAX_ARTICLES_PER_FETCH (default 15)
    /// - SENT_HEADLINES_FILE, ACTIVITY_FILE, MAX_STORED_HEADLINES
    /// - REQUEST_TIMEOUT, MAX_RETRIES
    pub fn from_env() -> AlertResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> AlertResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(token) = lookup("TELEGRAM_BOT_TOKEN") {
            config.telegram_bot_token = token.trim().to_string();
        }
        if let Some(chat_id) = lookup("TELEGRAM_CHAT_ID") {
            config.telegram_chat_id = chat_id.trim().to_string();
        }
        if let Some(language) = lookup("DEFAULT_LANGUAGE") {
            config.language = language.trim().to_lowercase();
        }
        if let Some(path) = lookup("SENT_HEADLINES_FILE") {
            config.sent_headlines_file = PathBuf::from(path);
        }
        if let Some(path) = lookup("ACTIVITY_FILE") {
            config.activity_file = PathBuf::from(path);
        }

        parse_var(&lookup, "FETCH_INTERVAL_MINUTES", &mut config.fetch_interval_minutes)?;
        parse_var(&lookup, "MAX_ARTICLES_PER_FETCH", &mut config.max_articles_per_fetch)?;
        parse_var(&lookup, "MAX_STORED_HEADLINES", &mut config.max_stored_headlines)?;
        parse_var(&lookup, "REQUEST_TIMEOUT", &mut config.request_timeout_secs)?;
        parse_var(&lookup, "MAX_RETRIES", &mut config.max_retries)?;

        Ok(config)
    }

    /// Feeds configured for one category
    pub fn feeds_for(&self, category: Category) -> impl Iterator<Item = &FeedConfig> {
        self.feeds.iter().filter(move |f| f.category == category)
    }

    /// Whether the credentials needed to deliver alerts are present
    pub fn has_credentials(&self) -> bool {
        !self.telegram_bot_token.is_empty() && !self.telegram_chat_id.is_empty()
    }

    /// Validate configuration, returning every problem found
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.telegram_bot_token.is_empty() {
            errors.push("TELEGRAM_BOT_TOKEN is required".to_string());
        }
        if self.telegram_chat_id.is_empty() {
            errors.push("TELEGRAM_CHAT_ID is required".to_string());
        }
        if self.fetch_interval_minutes < 1 {
            errors.push("FETCH_INTERVAL_MINUTES must be at least 1".to_string());
        }
        if self.max_articles_per_fetch < 1 {
            errors.push("MAX_ARTICLES_PER_FETCH must be at least 1".to_string());
        }
        if !SUPPORTED_LANGUAGES.contains(&self.language.as_str()) {
            errors.push("DEFAULT_LANGUAGE must be 'en' or 'hi'".to_string());
        }
        if self.feeds_for(Category::Crypto).next().is_none() {
            errors.push("At least one crypto RSS feed is required".to_string());
        }
        if self.feeds_for(Category::Gold).next().is_none() {
            errors.push("At least one gold RSS feed is required".to_string());
        }

        errors
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, target: &mut T) -> AlertResult<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(raw) = lookup(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|e| AlertError::config(format!("{} must be a number ({}): {}", key, raw, e)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BotConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.language, "en");
        assert_eq!(config.fetch_interval_minutes, 2);
        assert_eq!(config.max_articles_per_fetch, 15);
        assert_eq!(config.max_stored_headlines, 50);
        assert_eq!(config.sent_headlines_file, PathBuf::from("data/sent_headlines.json"));
        assert_eq!(config.feeds_for(Category::Crypto).count(), 3);
        assert_eq!(config.feeds_for(Category::Gold).count(), 3);
    }

    #[test]
    fn test_overrides() {
        let config = BotConfig::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", " -100 "),
            ("DEFAULT_LANGUAGE", "HI"),
            ("FETCH_INTERVAL_MINUTES", "5"),
            ("MAX_STORED_HEADLINES", "10"),
        ]))
        .unwrap();

        assert_eq!(config.telegram_chat_id, "-100");
        assert_eq!(config.language, "hi");
        assert_eq!(config.fetch_interval_minutes, 5);
        assert_eq!(config.max_stored_headlines, 10);
        assert!(config.has_credentials());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_bad_number_is_error() {
        let result = BotConfig::from_lookup(lookup_from(&[("FETCH_INTERVAL_MINUTES", "soon")]));
        assert!(matches!(result, Err(AlertError::Config(_))));
    }

    #[test]
    fn test_validate_reports_all_problems() {
        let config = BotConfig {
            language: "fr".to_string(),
            fetch_interval_minutes: 0,
            feeds: vec![],
            ..BotConfig::default()
        };

        let errors = config.validate();
        assert!(errors.contains(&"TELEGRAM_BOT_TOKEN is required".to_string()));
        assert!(errors.contains(&"TELEGRAM_CHAT_ID is required".to_string()));
        assert!(errors.contains(&"FETCH_INTERVAL_MINUTES must be at least 1".to_string()));
        assert!(errors.contains(&"DEFAULT_LANGUAGE must be 'en' or 'hi'".to_string()));
        assert!(errors.contains(&"At least one crypto RSS feed is required".to_string()));
        assert!(errors.contains(&"At least one gold RSS feed is required".to_string()));
    }

    #[test]
    fn test_keywords_for_category() {
        let keywords = KeywordConfig::default();
        assert!(keywords.for_category(Category::Crypto).contains(&"bitcoin".to_string()));
        assert!(keywords.for_category(Category::Gold).contains(&"bullion".to_string()));
        assert!(!keywords.for_category(Category::Gold).contains(&"bitcoin".to_string()));
    }
}
