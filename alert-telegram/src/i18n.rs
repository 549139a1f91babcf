//! Translation tables for alert text

use std::fmt;
use std::str::FromStr;

use alert_core::AlertError;
use chrono::{DateTime, Utc};

/// Alert language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Language {
    #[default]
    En,
    Hi,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
        }
    }

    fn table(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Language::En => EN,
            Language::Hi => HI,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "hi" => Ok(Language::Hi),
            other => Err(AlertError::config(format!("unsupported language: {}", other))),
        }
    }
}

const EN: &[(&str, &str)] = &[
    ("crypto", "Cryptocurrency"),
    ("gold", "Gold Market"),
    ("category", "Category"),
    ("source", "Source"),
    ("relevance", "Relevance"),
    ("read_more", "Read More"),
    ("news_alert_header", "Latest Market News Alert"),
    ("error_notification", "Bot Error Notification"),
    ("status_update", "Bot Status Update"),
    ("bot_started", "CryptoGoldAlertBot has started successfully! 🚀"),
    ("daily_status", "Daily Status Report"),
    ("fetch_interval", "Fetch Interval"),
    ("minutes", "minutes"),
    ("max_articles", "Max Articles per Fetch"),
    ("language", "Language"),
    ("cleanup_completed", "Weekly data cleanup completed successfully"),
    ("breaking_news", "BREAKING NEWS"),
    ("market_update", "Market Update"),
    ("price_alert", "Price Alert"),
];

const HI: &[(&str, &str)] = &[
    ("crypto", "क्रिप्टोकरेंसी"),
    ("gold", "सोना बाजार"),
    ("category", "श्रेणी"),
    ("source", "स्रोत"),
    ("relevance", "प्रासंगिकता"),
    ("read_more", "और पढ़ें"),
    ("news_alert_header", "नवीनतम बाजार समाचार अलर्ट"),
    ("error_notification", "बॉट त्रुटि सूचना"),
    ("status_update", "बॉट स्थिति अपडेट"),
    ("bot_started", "CryptoGoldAlertBot सफलतापूर्वक शुरू हो गया है! 🚀"),
    ("daily_status", "दैनिक स्थिति रिपोर्ट"),
    ("fetch_interval", "फेच अंतराल"),
    ("minutes", "मिनट"),
    ("max_articles", "प्रति फेच अधिकतम लेख"),
    ("language", "भाषा"),
    ("cleanup_completed", "साप्ताहिक डेटा सफाई सफलतापूर्वक पूर्ण"),
    ("breaking_news", "ब्रेकिंग न्यूज"),
    ("market_update", "बाजार अपडेट"),
    ("price_alert", "मूल्य अलर्ट"),
];

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Translate a key, falling back to English and then to the title-cased key
pub fn translate(key: &str, language: Language) -> String {
    lookup(language.table(), key)
        .or_else(|| lookup(EN, key))
        .map(str::to_string)
        .unwrap_or_else(|| title_case(&key.replace('_', " ")))
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Format a timestamp for display in alerts
pub fn format_datetime(dt: &DateTime<Utc>, language: Language) -> String {
    match language {
        Language::Hi => dt.format("%d/%m/%Y %H:%M").to_string(),
        Language::En => dt.format("%B %d, %Y at %H:%M").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_translate_known_key() {
        assert_eq!(translate("read_more", Language::En), "Read More");
        assert_eq!(translate("read_more", Language::Hi), "और पढ़ें");
    }

    #[test]
    fn test_translate_falls_back_to_key() {
        assert_eq!(translate("weekly_digest", Language::Hi), "Weekly Digest");
        assert_eq!(translate("PRICE_drop", Language::En), "Price Drop");
    }

    #[test]
    fn test_tables_cover_same_keys() {
        for (key, _) in EN {
            assert!(lookup(HI, key).is_some(), "missing Hindi translation for {}", key);
        }
    }

    #[test]
    fn test_language_parse() {
        assert_eq!("HI".parse::<Language>().unwrap(), Language::Hi);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn test_format_datetime() {
        let dt = Utc.with_ymd_and_hms(2026, 3, 5, 14, 7, 0).unwrap();
        assert_eq!(format_datetime(&dt, Language::En), "March 05, 2026 at 14:07");
        assert_eq!(format_datetime(&dt, Language::Hi), "05/03/2026 14:07");
    }
}
