//! Relevance filtering and duplicate suppression

pub mod dedup;
pub mod pipeline;
pub mod scorer;

pub use dedup::{
    jaccard_similarity, normalize_title, DuplicateDetector, HistoryError, SentHistory,
    DEFAULT_MAX_STORED, DEFAULT_SIMILARITY_THRESHOLD,
};
pub use pipeline::{
    contains_keywords, ArticleVerdict, FilterConfig, FilterReport, NewsFilter, SkipReason,
    TrustedSources, DEFAULT_MAX_RESULTS, DEFAULT_MIN_SCORE,
};
pub use scorer::{BonusTerms, RelevanceScorer, SUMMARY_WEIGHT, TITLE_WEIGHT};
