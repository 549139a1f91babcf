//! HTML message builders for Telegram alerts

use alert_core::{Article, BotConfig, Category};
use chrono::{DateTime, Local};
use regex::Regex;

use crate::i18n::{format_datetime, translate, Language};

/// Hard ceiling Telegram puts on a message
pub const TELEGRAM_MAX_MESSAGE_LEN: usize = 4096;

/// Length an article alert is cut to
const ARTICLE_MAX_LEN: usize = 4000;

/// Length an article summary is cut to
const SUMMARY_MAX_LEN: usize = 500;

fn category_emoji(category: Category) -> &'static str {
    match category {
        Category::Crypto => "🪙",
        Category::Gold => "🏆",
    }
}

/// Format a single article alert
pub fn format_article_message(article: &Article, language: Language) -> String {
    let emoji = category_emoji(article.category);

    let title = sanitize_title(&article.title);
    let title = if title.is_empty() { "No Title".to_string() } else { title };

    let source = match article.source.trim() {
        "" => "Unknown Source",
        s => s,
    };
    let link = article.link.trim();

    let mut message = format!("{} <b>{}</b>\n\n", emoji, title);

    if let Some(published) = &article.published {
        message.push_str(&format!("🕐 {}\n", format_datetime(published, language)));
    }

    let summary = clean_html_tags(&article.summary);
    if !summary.is_empty() {
        let summary = truncate_chars(&summary, SUMMARY_MAX_LEN);
        message.push_str(&format!("📰 {}\n\n", escape_html(&summary)));
    }

    message.push_str(&format!("📰 {}", escape_html(source)));

    if !link.is_empty() {
        message.push_str(&format!(
            " | <a href='{}'>{}</a>",
            escape_attribute(link),
            translate("read_more", language)
        ));
    }

    truncate_chars(&message, ARTICLE_MAX_LEN)
}

/// Header announcing a batch of alerts with per-category counts
pub fn format_batch_header(articles: &[Article], language: Language) -> String {
    let mut counts: Vec<(Category, usize)> = Vec::new();
    for article in articles {
        match counts.iter_mut().find(|(c, _)| *c == article.category) {
            Some((_, n)) => *n += 1,
            None => counts.push((article.category, 1)),
        }
    }

    let summary = counts
        .iter()
        .map(|(category, count)| format!("{}: {}", translate(category.as_str(), language), count))
        .collect::<Vec<_>>()
        .join(" | ");

    format!(
        "🚨 {}\n📊 {}\n{}",
        translate("news_alert_header", language),
        summary,
        "─".repeat(30)
    )
}

pub fn format_error_notification(error_message: &str, language: Language) -> String {
    format!(
        "⚠️ {}\n\n🔧 {}",
        translate("error_notification", language),
        error_message
    )
}

pub fn format_status_update(status_message: &str, language: Language) -> String {
    format!("ℹ️ {}\n\n{}", translate("status_update", language), status_message)
}

/// Body of the daily status report
pub fn format_daily_status(config: &BotConfig, language: Language, now: DateTime<Local>) -> String {
    format!(
        "{}\n⏰ {}\n🔄 {}: {} {}\n📰 {}: {}\n🗣️ {}: {}",
        translate("daily_status", language),
        now.format("%Y-%m-%d %H:%M:%S"),
        translate("fetch_interval", language),
        config.fetch_interval_minutes,
        translate("minutes", language),
        translate("max_articles", language),
        config.max_articles_per_fetch,
        translate("language", language),
        language.code().to_uppercase()
    )
}

/// Remove HTML tags, keeping their text content
pub fn clean_html_tags(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let stripped = match Regex::new(r"<[^>]+>") {
        Ok(tag) => tag.replace_all(text, "").into_owned(),
        Err(_) => text.to_string(),
    };

    collapse_whitespace(&stripped)
}

/// Drop characters the Bot API's HTML parser chokes on
///
/// Keeps word characters, whitespace and `-.,!?:;`.
pub fn sanitize_title(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| {
            c.is_alphanumeric() || *c == '_' || c.is_whitespace() || "-.,!?:;".contains(*c)
        })
        .collect();

    collapse_whitespace(&kept)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape text for a quoted HTML attribute value
fn escape_attribute(text: &str) -> String {
    escape_html(text)
        .replace('\'', "&#39;")
        .replace('"', "&quot;")
}

/// Cut to `max` characters, marking the cut with "..."
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn article() -> Article {
        Article::new(
            "Bitcoin <Surges> to $100k!",
            "<p>BTC   price <b>jumps</b></p>",
            "https://coindesk.com/btc",
            Category::Crypto,
            "CoinDesk",
        )
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("Bitcoin <Surges> to $100k!"), "Bitcoin Surges to 100k!");
        assert_eq!(sanitize_title("Gold\n\r hits   high"), "Gold hits high");
        assert_eq!(sanitize_title("ETF_approval: yes; no?"), "ETF_approval: yes; no?");
    }

    #[test]
    fn test_clean_html_tags() {
        assert_eq!(clean_html_tags("<p>BTC   price <b>jumps</b></p>"), "BTC price jumps");
        assert_eq!(clean_html_tags(""), "");
    }

    #[test]
    fn test_format_article_message() {
        let message = format_article_message(&article(), Language::En);

        assert!(message.starts_with("🪙 <b>Bitcoin Surges to 100k!</b>\n\n"));
        assert!(message.contains("📰 BTC price jumps\n\n"));
        assert!(message.ends_with("📰 CoinDesk | <a href='https://coindesk.com/btc'>Read More</a>"));
        assert!(!message.contains("🕐"));
    }

    #[test]
    fn test_format_article_message_with_timestamp_and_language() {
        let mut article = article();
        article.category = Category::Gold;
        article.published = Some(Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap());

        let message = format_article_message(&article, Language::Hi);
        assert!(message.starts_with("🏆 "));
        assert!(message.contains("🕐 16/10/2026 09:30\n"));
        assert!(message.contains("और पढ़ें"));
    }

    #[test]
    fn test_long_summary_is_truncated() {
        let mut article = article();
        article.summary = "x".repeat(800);

        let message = format_article_message(&article, Language::En);
        let expected = format!("📰 {}...\n\n", "x".repeat(497));
        assert!(message.contains(&expected));
    }

    #[test]
    fn test_message_capped() {
        let mut article = article();
        article.title = "word ".repeat(2000);

        let message = format_article_message(&article, Language::En);
        assert_eq!(message.chars().count(), 4000);
        assert!(message.ends_with("..."));
    }

    #[test]
    fn test_summary_entities_escaped() {
        let mut article = article();
        article.summary = "Gold & silver 5 < 6".to_string();
        let message = format_article_message(&article, Language::En);
        assert!(message.contains("Gold &amp; silver 5 &lt; 6"));
    }

    #[test]
    fn test_link_attribute_escaped() {
        let mut article = article();
        article.link = r#"https://example.com/?q=it's&x="1"<"#.to_string();

        let message = format_article_message(&article, Language::En);
        assert!(message.contains(
            "<a href='https://example.com/?q=it&#39;s&amp;x=&quot;1&quot;&lt;'>Read More</a>"
        ));
    }

    #[test]
    fn test_batch_header_counts_in_first_seen_order() {
        let mut gold = article();
        gold.category = Category::Gold;
        let articles = vec![gold.clone(), article(), gold];

        let header = format_batch_header(&articles, Language::En);
        assert!(header.starts_with("🚨 Latest Market News Alert\n"));
        assert!(header.contains("📊 Gold Market: 2 | Cryptocurrency: 1\n"));
        assert!(header.ends_with(&"─".repeat(30)));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abcdefghijkl", 10), "abcdefg...");
        assert_eq!(truncate_chars("सोना बाजार", 6), "सोन...");
    }

    #[test]
    fn test_notifications() {
        assert_eq!(
            format_error_notification("feed down", Language::En),
            "⚠️ Bot Error Notification\n\n🔧 feed down"
        );
        assert_eq!(
            format_status_update("ok", Language::En),
            "ℹ️ Bot Status Update\n\nok"
        );
    }

    #[test]
    fn test_daily_status() {
        let config = BotConfig::default();
        let now = Local.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap();
        let status = format_daily_status(&config, Language::En, now);

        assert!(status.starts_with("Daily Status Report\n⏰ 2026-10-16 09:00:00\n"));
        assert!(status.contains("🔄 Fetch Interval: 2 minutes"));
        assert!(status.contains("📰 Max Articles per Fetch: 15"));
        assert!(status.ends_with("🗣️ Language: EN"));
    }
}
