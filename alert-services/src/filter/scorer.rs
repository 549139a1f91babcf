//! Relevance scoring
//!
//! Score = sum over keywords of (title hits * 2 + summary hits * 1), plus a
//! one-time bonus for every market-moving term present anywhere in the text.
//! All weights are non-negative, so scores never drop below zero.

use alert_core::Article;

/// Weight of one keyword occurrence in the title
pub const TITLE_WEIGHT: f64 = 2.0;

/// Weight of one keyword occurrence in the summary
pub const SUMMARY_WEIGHT: f64 = 1.0;

/// Terms that boost an article's score once each, regardless of repetition
#[derive(Debug, Clone, PartialEq)]
pub struct BonusTerms {
    terms: Vec<(String, f64)>,
}

impl BonusTerms {
    pub fn new(terms: Vec<(String, f64)>) -> Self {
        Self { terms }
    }

    /// Sum of weights of every term contained in `text` (already lowercased)
    fn bonus_for(&self, text: &str) -> f64 {
        self.terms
            .iter()
            .filter(|(term, _)| !term.is_empty() && text.contains(term.as_str()))
            .map(|(_, weight)| weight)
            .sum()
    }
}

impl Default for BonusTerms {
    fn default() -> Self {
        let terms = [
            ("breaking", 3.0),
            ("urgent", 3.0),
            ("alert", 2.5),
            ("crash", 2.5),
            ("surge", 2.0),
            ("rally", 2.0),
            ("record", 2.0),
            ("high", 1.5),
            ("low", 1.5),
            ("regulation", 2.0),
            ("ban", 2.5),
            ("approval", 2.0),
        ];

        Self::new(terms.iter().map(|(t, w)| (t.to_string(), *w)).collect())
    }
}

/// Pure relevance scorer
#[derive(Debug, Clone, Default)]
pub struct RelevanceScorer {
    bonus_terms: BonusTerms,
}

impl RelevanceScorer {
    pub fn new(bonus_terms: BonusTerms) -> Self {
        Self { bonus_terms }
    }

    /// Score an article against its category's keyword list
    pub fn score(&self, article: &Article, keywords: &[String]) -> f64 {
        let title = article.title.to_lowercase();
        let summary = article.summary.to_lowercase();

        let keyword_score: f64 = keywords
            .iter()
            .map(|keyword| {
                let keyword = keyword.to_lowercase();
                count_occurrences(&title, &keyword) as f64 * TITLE_WEIGHT
                    + count_occurrences(&summary, &keyword) as f64 * SUMMARY_WEIGHT
            })
            .sum();

        let combined = format!("{} {}", title, summary);
        keyword_score + self.bonus_terms.bonus_for(&combined)
    }
}

/// Non-overlapping occurrences of `needle` in `haystack`
fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alert_core::Category;

    fn keywords(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn crypto(title: &str, summary: &str) -> Article {
        Article::new(title, summary, "", Category::Crypto, "")
    }

    #[test]
    fn test_title_and_summary_weights() {
        let scorer = RelevanceScorer::new(BonusTerms::new(vec![]));
        let kw = keywords(&["bitcoin"]);

        assert_eq!(scorer.score(&crypto("Bitcoin", ""), &kw), 2.0);
        assert_eq!(scorer.score(&crypto("", "bitcoin"), &kw), 1.0);
        assert_eq!(scorer.score(&crypto("Bitcoin BITCOIN", "bitcoin"), &kw), 5.0);
    }

    #[test]
    fn test_bonus_counted_once() {
        let scorer = RelevanceScorer::default();
        let kw = keywords(&[]);

        let once = scorer.score(&crypto("Breaking", ""), &kw);
        let twice = scorer.score(&crypto("Breaking breaking", "breaking"), &kw);
        assert_eq!(once, 3.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_bonus_matches_substrings() {
        let scorer = RelevanceScorer::default();
        // "surges" contains "surge", "high" is separate, "record" whole word
        let score = scorer.score(&crypto("Surges to record high", ""), &keywords(&[]));
        assert_eq!(score, 2.0 + 2.0 + 1.5);
    }

    #[test]
    fn test_no_signal_scores_zero() {
        let scorer = RelevanceScorer::default();
        let score = scorer.score(&crypto("asdkj qweoiu", ""), &keywords(&["gold"]));
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_count_occurrences_non_overlapping() {
        assert_eq!(count_occurrences("aaaa", "aa"), 2);
        assert_eq!(count_occurrences("abc", ""), 0);
        assert_eq!(count_occurrences("eth ethereum", "eth"), 2);
    }
}
