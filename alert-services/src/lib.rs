//! Business logic for the crypto/gold alert bot
//!
//! This crate holds the filter pipeline that decides which fetched articles
//! become alerts, the news cycle that wires fetching, filtering and delivery
//! together, and the scheduler that drives the cycle and housekeeping jobs.

pub mod filter;
pub mod news_cycle;
pub mod schedule;

pub use filter::{
    ArticleVerdict, BonusTerms, DuplicateDetector, FilterConfig, FilterReport, NewsFilter,
    RelevanceScorer, SentHistory, SkipReason, TrustedSources,
};
pub use news_cycle::{CycleConfig, CycleError, CycleReport, NewsCycle};
pub use schedule::{JobDeadlines, JobSchedule, Scheduler, WallClockJob};
