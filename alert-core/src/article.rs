//! Article data structures shared across the alert pipeline

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AlertError;

/// Market category an article was fetched for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Crypto,
    Gold,
}

impl Category {
    /// All categories, in fetch order
    pub const ALL: [Category; 2] = [Category::Crypto, Category::Gold];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Crypto => "crypto",
            Category::Gold => "gold",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "crypto" => Ok(Category::Crypto),
            "gold" => Ok(Category::Gold),
            other => Err(AlertError::parse(format!("unknown category: {}", other))),
        }
    }
}

/// A normalized news article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Headline; must be non-empty after trimming to be accepted
    pub title: String,
    /// Plain-text summary (may be empty)
    #[serde(default)]
    pub summary: String,
    /// Article URL
    #[serde(default)]
    pub link: String,
    /// Category the article was fetched for
    pub category: Category,
    /// Feed name the article came from
    #[serde(default)]
    pub source: String,
    /// Publication date, if the feed provided one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
    /// Relevance score, attached by the filter pipeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        summary: impl Into<String>,
        link: impl Into<String>,
        category: Category,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            link: link.into(),
            category,
            source: source.into(),
            published: None,
            relevance_score: None,
        }
    }

    /// Title and summary joined by a single space
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }

    /// Whether the title has any non-whitespace content
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!("crypto".parse::<Category>().unwrap(), Category::Crypto);
        assert_eq!(" Gold ".parse::<Category>().unwrap(), Category::Gold);
        assert!(matches!(
            "stocks".parse::<Category>(),
            Err(AlertError::Parse(_))
        ));
    }

    #[test]
    fn test_category_serializes_lowercase() {
        let json = serde_json::to_string(&Category::Gold).unwrap();
        assert_eq!(json, "\"gold\"");
    }

    #[test]
    fn test_has_title() {
        let article = Article::new("   ", "", "", Category::Crypto, "CoinDesk");
        assert!(!article.has_title());

        let article = Article::new("Bitcoin", "", "", Category::Crypto, "CoinDesk");
        assert!(article.has_title());
    }

    #[test]
    fn test_deserialize_without_score() {
        let json = r#"{"title":"Gold rallies","category":"gold"}"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.summary, "");
        assert!(article.relevance_score.is_none());
        assert!(article.published.is_none());
    }
}
