//! News filter pipeline
//!
//! Per article: title check, duplicate check, keyword gate (with trusted-source
//! fallback), scoring, and score threshold. Accepted articles are ranked by
//! score and capped. Filtering never mutates the history; only
//! [`NewsFilter::mark_sent`] does, once the caller has actually delivered.

use std::cmp::Ordering;

use alert_core::{Article, BotConfig, Category, KeywordConfig};
use tracing::{debug, info};

use super::dedup::{DuplicateDetector, SentHistory, DEFAULT_SIMILARITY_THRESHOLD};
use super::scorer::{BonusTerms, RelevanceScorer};

/// Minimum relevance score to be accepted
pub const DEFAULT_MIN_SCORE: f64 = 0.1;

/// Maximum alerts per batch
pub const DEFAULT_MAX_RESULTS: usize = 6;

/// Sources admitted even without a keyword match, per category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedSources {
    pub rules: Vec<(Category, Vec<String>)>,
}

impl TrustedSources {
    /// Substrings trusted for one category
    pub fn for_category(&self, category: Category) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .filter(move |(c, _)| *c == category)
            .flat_map(|(_, sources)| sources.iter().map(String::as_str))
    }

    /// Whether `source` (case-insensitive) contains a trusted substring for `category`
    pub fn matches(&self, category: Category, source: &str) -> bool {
        let source = source.to_lowercase();
        self.for_category(category)
            .any(|trusted| source.contains(&trusted.to_lowercase()))
    }
}

impl Default for TrustedSources {
    fn default() -> Self {
        Self {
            rules: vec![
                (
                    Category::Crypto,
                    vec![
                        "coindesk".to_string(),
                        "cointelegraph".to_string(),
                        "decrypt".to_string(),
                    ],
                ),
                (Category::Gold, vec!["mining".to_string()]),
            ],
        }
    }
}

/// Configuration for the filter pipeline
#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub keywords: KeywordConfig,
    pub trusted_sources: TrustedSources,
    pub bonus_terms: BonusTerms,
    /// Jaccard similarity above which a title is a near-duplicate
    pub similarity_threshold: f64,
    /// Minimum score to accept
    pub min_score: f64,
    /// Cap on accepted articles per batch
    pub max_results: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            keywords: KeywordConfig::default(),
            trusted_sources: TrustedSources::default(),
            bonus_terms: BonusTerms::default(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            min_score: DEFAULT_MIN_SCORE,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl FilterConfig {
    pub fn from_bot_config(config: &BotConfig) -> Self {
        Self {
            keywords: config.keywords.clone(),
            ..Self::default()
        }
    }
}

/// Why an article was not accepted
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    MissingTitle,
    Duplicate,
    NoKeywordMatch,
    BelowThreshold { score: f64 },
}

/// Outcome of evaluating a single article
#[derive(Debug, Clone, PartialEq)]
pub enum ArticleVerdict {
    Accepted { score: f64 },
    Skipped(SkipReason),
}

/// Per-article outcomes of one filter pass
#[derive(Debug, Clone, Default)]
pub struct FilterReport {
    /// Ranked and capped accepted articles, each with a score attached
    pub accepted: Vec<Article>,
    /// Titles that were rejected, with the reason
    pub skipped: Vec<(String, SkipReason)>,
}

/// Keyword/relevance filter with duplicate suppression
pub struct NewsFilter {
    config: FilterConfig,
    scorer: RelevanceScorer,
    detector: DuplicateDetector,
    history: SentHistory,
}

impl NewsFilter {
    pub fn new(config: FilterConfig, history: SentHistory) -> Self {
        Self {
            scorer: RelevanceScorer::new(config.bonus_terms.clone()),
            detector: DuplicateDetector::new(config.similarity_threshold),
            config,
            history,
        }
    }

    pub fn history(&self) -> &SentHistory {
        &self.history
    }

    /// Decide whether one article is accepted, without touching history
    pub fn evaluate(&self, article: &Article) -> ArticleVerdict {
        if !article.has_title() {
            return ArticleVerdict::Skipped(SkipReason::MissingTitle);
        }

        if self.detector.is_duplicate(&article.title, &self.history) {
            return ArticleVerdict::Skipped(SkipReason::Duplicate);
        }

        let keywords = self.config.keywords.for_category(article.category);
        if !contains_keywords(&article.combined_text(), keywords)
            && !self
                .config
                .trusted_sources
                .matches(article.category, &article.source)
        {
            return ArticleVerdict::Skipped(SkipReason::NoKeywordMatch);
        }

        let score = self.scorer.score(article, keywords);
        if score >= self.config.min_score {
            ArticleVerdict::Accepted { score }
        } else {
            ArticleVerdict::Skipped(SkipReason::BelowThreshold { score })
        }
    }

    /// Filter a batch, returning accepted articles ranked by score
    pub fn filter_articles(&self, articles: &[Article]) -> Vec<Article> {
        self.filter_with_report(articles).accepted
    }

    /// Filter a batch, keeping the per-article outcomes
    pub fn filter_with_report(&self, articles: &[Article]) -> FilterReport {
        info!("Filtering {} articles...", articles.len());

        let mut report = FilterReport::default();

        for article in articles {
            match self.evaluate(article) {
                ArticleVerdict::Accepted { score } => {
                    info!(
                        "Included article: {}... (score: {})",
                        preview(&article.title),
                        score
                    );
                    let mut accepted = article.clone();
                    accepted.relevance_score = Some(score);
                    report.accepted.push(accepted);
                }
                ArticleVerdict::Skipped(reason) => {
                    if reason == SkipReason::Duplicate {
                        debug!("Skipping duplicate: {}...", preview(&article.title));
                    }
                    report.skipped.push((article.title.clone(), reason));
                }
            }
        }

        // Stable sort keeps fetch order among equal scores
        report.accepted.sort_by(|a, b| {
            b.relevance_score
                .unwrap_or(0.0)
                .partial_cmp(&a.relevance_score.unwrap_or(0.0))
                .unwrap_or(Ordering::Equal)
        });
        report.accepted.truncate(self.config.max_results);

        info!("Filtered to {} relevant articles", report.accepted.len());
        report
    }

    /// Record a delivered title in the history
    pub fn mark_sent(&mut self, title: &str) {
        self.history.mark_sent(title);
    }

    /// Re-apply the history bound and persist
    pub fn cleanup(&mut self) {
        self.history.cleanup();
    }
}

/// Case-insensitive check for any keyword in `text`
pub fn contains_keywords(text: &str, keywords: &[String]) -> bool {
    let text = text.to_lowercase();
    keywords
        .iter()
        .any(|keyword| !keyword.is_empty() && text.contains(&keyword.to_lowercase()))
}

fn preview(title: &str) -> String {
    title.chars().take(50).collect()
}
