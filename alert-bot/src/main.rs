//! Crypto/Gold Alert Bot
//!
//! Polls curated crypto and gold RSS feeds, filters them for relevance and
//! pushes new headlines to a Telegram chat.

use std::sync::Arc;
use std::time::Duration;

use alert_core::BotConfig;
use alert_news::FeedClient;
use alert_services::{
    CycleConfig, FilterConfig, JobSchedule, NewsCycle, NewsFilter, Scheduler, SentHistory,
};
use alert_telegram::{Language, TelegramClient};
use anyhow::Context;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Attempts at bringing the bot up before giving up
const MAX_STARTUP_ATTEMPTS: u32 = 3;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Not an error if the files don't exist
    for file in [".env.local", ".env"] {
        if let Err(e) = dotenvy::from_filename(file) {
            if !matches!(e, dotenvy::Error::Io(_)) {
                eprintln!("Warning: Failed to load {}: {}", file, e);
            }
        }
    }

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,alert_bot=debug")),
        )
        .init();

    let config = BotConfig::from_env().context("Failed to load configuration")?;

    let problems = config.validate();
    if !config.has_credentials() {
        for problem in &problems {
            error!("Configuration error: {}", problem);
        }
        anyhow::bail!("Telegram credentials are missing");
    }
    for problem in &problems {
        warn!("Configuration warning: {}", problem);
    }

    let language = config.language.parse::<Language>().unwrap_or_else(|e| {
        warn!("{}, falling back to English", e);
        Language::En
    });

    let mut attempt = 0;
    loop {
        attempt += 1;
        match run_bot(&config, language, attempt).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                error!("Fatal error (attempt {}): {:#}", attempt, e);

                if attempt >= MAX_STARTUP_ATTEMPTS {
                    error!("Max retries reached. Bot startup failed.");
                    return Err(e);
                }

                let wait = startup_backoff(attempt);
                info!("Retrying in {} seconds...", wait.as_secs());
                tokio::time::sleep(wait).await;
            }
        }
    }
}

/// Progressive backoff between startup attempts
fn startup_backoff(attempt: u32) -> Duration {
    Duration::from_secs(u64::from(attempt) * 30)
}

/// Bring the bot up and run it until shutdown
async fn run_bot(config: &BotConfig, language: Language, attempt: u32) -> anyhow::Result<()> {
    info!("Starting CryptoGoldAlertBot... (attempt {})", attempt);

    if let Some(parent) = config.sent_headlines_file.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let telegram = TelegramClient::new(
        &config.telegram_bot_token,
        &config.telegram_chat_id,
        Duration::from_secs(config.request_timeout_secs),
    );

    // Connectivity check; the bot keeps going even if it fails
    match telegram
        .send_message(&format!("Bot starting - {} attempt", attempt))
        .await
    {
        Ok(()) => info!("Telegram connection verified"),
        Err(e) => warn!("Test message failed, continuing anyway: {}", e),
    }

    let feeds = FeedClient::new(config);
    info!("News sources configured: {} feeds", feeds.feeds().len());

    let history = SentHistory::load(&config.sent_headlines_file, config.max_stored_headlines);
    let filter = NewsFilter::new(FilterConfig::from_bot_config(config), history);

    let cycle = Arc::new(NewsCycle::new(
        feeds,
        telegram,
        filter,
        language,
        config.activity_file.clone(),
        CycleConfig::default(),
    ));

    info!("Running initial news fetch...");
    if let Err(e) = cycle.run_cycle_with_retry().await {
        error!("Initial news fetch failed: {}", e);
    }

    cycle.send_startup_notification().await;

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    let scheduler = Scheduler::new(cycle, JobSchedule::from_config(config), config.clone());
    info!("CryptoGoldAlertBot is now running");
    scheduler.run(shutdown_rx).await;

    info!("Bot stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to listen for Ctrl+C: {}", e);
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_backoff_is_progressive() {
        assert_eq!(startup_backoff(1), Duration::from_secs(30));
        assert_eq!(startup_backoff(2), Duration::from_secs(60));
    }
}
