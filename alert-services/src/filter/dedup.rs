//! Sent-title history and duplicate detection
//!
//! The history is a FIFO log of delivered headlines persisted as JSON:
//!
//! ```json
//! { "headlines": ["...", "..."], "last_updated": "2026-10-16T09:00:00+00:00" }
//! ```
//!
//! Persistence failures are logged and swallowed; the in-memory history keeps
//! working and the next successful save catches the file up.

use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Default number of headlines kept
pub const DEFAULT_MAX_STORED: usize = 50;

/// Default Jaccard similarity above which two titles count as the same story
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedHistory {
    #[serde(default)]
    headlines: Vec<String>,
    #[serde(default)]
    last_updated: Option<String>,
}

/// Bounded, persisted log of delivered titles in delivery order
#[derive(Debug)]
pub struct SentHistory {
    path: PathBuf,
    max_stored: usize,
    titles: VecDeque<String>,
}

impl SentHistory {
    /// Load history from disk; a missing or unreadable file yields an empty history
    pub fn load(path: impl Into<PathBuf>, max_stored: usize) -> Self {
        let path = path.into();

        let titles = match read_titles(&path) {
            Ok(titles) => titles,
            Err(e) => {
                error!("Error loading sent headlines from {}: {}", path.display(), e);
                VecDeque::new()
            }
        };

        let mut history = Self {
            path,
            max_stored,
            titles,
        };
        history.trim();

        info!(
            "Loaded {} sent headlines from {}",
            history.titles.len(),
            history.path.display()
        );
        history
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Titles in delivery order, oldest first
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.titles.iter().map(String::as_str)
    }

    pub fn contains(&self, title: &str) -> bool {
        self.titles.iter().any(|t| t == title)
    }

    /// Record a delivered title, evict the oldest beyond the cap, and persist
    pub fn mark_sent(&mut self, title: &str) {
        self.titles.push_back(title.to_string());
        self.trim();
        self.persist();
    }

    /// Re-apply the cap and persist
    pub fn cleanup(&mut self) {
        self.trim();
        self.persist();
    }

    /// Write the history to disk
    pub fn save(&self) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let data = PersistedHistory {
            headlines: self.titles.iter().cloned().collect(),
            last_updated: Some(Utc::now().to_rfc3339()),
        };
        let json = serde_json::to_string_pretty(&data)?;

        // Full overwrite through a temp file and rename
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;

        debug!("Saved {} sent headlines", self.titles.len());
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            error!("Error saving sent headlines to {}: {}", self.path.display(), e);
        }
    }

    fn trim(&mut self) {
        while self.titles.len() > self.max_stored {
            self.titles.pop_front();
        }
    }
}

fn read_titles(path: &Path) -> Result<VecDeque<String>, HistoryError> {
    if !path.exists() {
        return Ok(VecDeque::new());
    }

    let raw = fs::read_to_string(path)?;
    let data: PersistedHistory = serde_json::from_str(&raw)?;
    Ok(data.headlines.into())
}

/// Exact and near-duplicate title detection
#[derive(Debug, Clone, Copy)]
pub struct DuplicateDetector {
    similarity_threshold: f64,
}

impl DuplicateDetector {
    pub fn new(similarity_threshold: f64) -> Self {
        Self {
            similarity_threshold,
        }
    }

    /// Whether `title` was already delivered, exactly or as a near-duplicate
    pub fn is_duplicate(&self, title: &str, history: &SentHistory) -> bool {
        if history.contains(title) {
            return true;
        }

        let candidate = normalize_title(title);
        history.titles().any(|sent| {
            jaccard_similarity(&candidate, &normalize_title(sent)) > self.similarity_threshold
        })
    }
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

/// Lowercase and drop everything except word characters and whitespace
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Jaccard similarity of the whitespace-separated word sets of two strings
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let words_a: HashSet<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();

    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let intersection = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();

    intersection as f64 / union as f64
}
