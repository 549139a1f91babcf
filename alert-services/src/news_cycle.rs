//! One fetch → filter → deliver pass, plus the housekeeping jobs around it
//!
//! A title enters the sent history only after the sink confirmed delivery,
//! so an alert that failed to go out is offered again next cycle.

use std::path::PathBuf;
use std::time::Duration;

use alert_core::BotConfig;
use alert_news::{ArticleSource, NewsError};
use alert_telegram::format::{
    format_article_message, format_batch_header, format_daily_status, format_error_notification,
    format_status_update,
};
use alert_telegram::{translate, AlertSink, Language};
use chrono::{Local, Utc};
use thiserror::Error;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::filter::NewsFilter;

/// Run blocking history I/O without stalling other tasks on a multi-threaded runtime
fn blocking_io<R>(f: impl FnOnce() -> R) -> R {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}

/// Errors that abort a whole cycle
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] NewsError),
}

/// Timing knobs for the cycle
#[derive(Debug, Clone)]
pub struct CycleConfig {
    /// Extra attempts after a failed cycle
    pub max_cycle_retries: u32,
    pub retry_delay: Duration,
    /// Pause between two delivered alerts
    pub send_delay: Duration,
    /// Announce each batch with a per-category summary first
    pub send_batch_header: bool,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            max_cycle_retries: 2,
            retry_delay: Duration::from_secs(10),
            send_delay: Duration::from_secs(1),
            send_batch_header: false,
        }
    }
}

/// Counts from one completed cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub accepted: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Fetch, filter and deliver news alerts
pub struct NewsCycle<S, K> {
    source: S,
    sink: K,
    filter: Mutex<NewsFilter>,
    language: Language,
    activity_file: PathBuf,
    config: CycleConfig,
}

impl<S, K> NewsCycle<S, K>
where
    S: ArticleSource,
    K: AlertSink,
{
    pub fn new(
        source: S,
        sink: K,
        filter: NewsFilter,
        language: Language,
        activity_file: impl Into<PathBuf>,
        config: CycleConfig,
    ) -> Self {
        Self {
            source,
            sink,
            filter: Mutex::new(filter),
            language,
            activity_file: activity_file.into(),
            config,
        }
    }

    /// Snapshot of the delivered titles, oldest first
    pub async fn sent_titles(&self) -> Vec<String> {
        let filter = self.filter.lock().await;
        filter.history().titles().map(str::to_string).collect()
    }

    /// Run one cycle
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        info!("Starting news fetch cycle...");

        let articles = self.source.fetch_all().await?;
        let mut report = CycleReport {
            fetched: articles.len(),
            ..CycleReport::default()
        };

        if articles.is_empty() {
            warn!("No articles fetched");
        } else {
            // Held across delivery so cleanup cannot interleave with mark_sent
            let mut filter = self.filter.lock().await;
            let accepted = filter.filter_articles(&articles);
            report.accepted = accepted.len();

            if accepted.is_empty() {
                info!("No new relevant articles found");
            } else if self.config.send_batch_header {
                let header = format_batch_header(&accepted, self.language);
                if let Err(e) = self.sink.send(&header).await {
                    warn!("Failed to send batch header: {}", e);
                }
            }

            for article in &accepted {
                let message = format_article_message(article, self.language);
                match self.sink.send(&message).await {
                    Ok(()) => {
                        blocking_io(|| filter.mark_sent(&article.title));
                        report.sent += 1;
                        debug!("Sent alert: {}", article.title);
                        tokio::time::sleep(self.config.send_delay).await;
                    }
                    Err(e) => {
                        report.failed += 1;
                        error!("Failed to send article '{}': {}", article.title, e);
                    }
                }
            }
        }

        self.touch_activity().await;

        info!(
            "News cycle completed: {} fetched, {} accepted, {} sent, {} failed",
            report.fetched, report.accepted, report.sent, report.failed
        );
        Ok(report)
    }

    /// Run a cycle, retrying cycle-level failures; the final failure is reported to the chat
    pub async fn run_cycle_with_retry(&self) -> Result<CycleReport, CycleError> {
        let attempts = self.config.max_cycle_retries + 1;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.run_cycle().await {
                Ok(report) => return Ok(report),
                Err(e) => {
                    error!("Error in news fetch cycle (attempt {}): {}", attempt, e);

                    if attempt < attempts {
                        tokio::time::sleep(self.config.retry_delay).await;
                        continue;
                    }

                    let detail: String = e.to_string().chars().take(100).collect();
                    self.send_error_notification(&format!(
                        "News fetch failed after {} attempts: {}",
                        attempts, detail
                    ))
                    .await;
                    return Err(e);
                }
            }
        }
    }

    /// Send the daily status report
    pub async fn send_daily_status(&self, config: &BotConfig) {
        let status = format_daily_status(config, self.language, Local::now());
        self.send_status_update(&status).await;
        info!("Daily status sent");
    }

    /// Announce that the bot is up
    pub async fn send_startup_notification(&self) {
        self.send_status_update(&translate("bot_started", self.language))
            .await;
    }

    /// Re-bound and persist the history, then announce it
    pub async fn cleanup(&self) {
        info!("Running weekly cleanup...");
        {
            let mut filter = self.filter.lock().await;
            blocking_io(|| filter.cleanup());
        }
        self.send_status_update(&translate("cleanup_completed", self.language))
            .await;
        info!("Weekly cleanup completed");
    }

    /// Send a status notice; failures are logged
    pub async fn send_status_update(&self, status_message: &str) {
        let message = format_status_update(status_message, self.language);
        if let Err(e) = self.sink.send(&message).await {
            error!("Failed to send status update: {}", e);
        }
    }

    /// Send an error notice; failures are logged
    pub async fn send_error_notification(&self, error_message: &str) {
        let message = format_error_notification(error_message, self.language);
        if let Err(e) = self.sink.send(&message).await {
            error!("Failed to send error notification: {}", e);
        }
    }

    async fn touch_activity(&self) {
        if let Some(parent) = self.activity_file.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = tokio::fs::create_dir_all(parent).await {
                    error!("Failed to create {}: {}", parent.display(), e);
                    return;
                }
            }
        }

        if let Err(e) = tokio::fs::write(&self.activity_file, Utc::now().to_rfc3339()).await {
            error!(
                "Failed to update activity file {}: {}",
                self.activity_file.display(),
                e
            );
        }
    }
}
