//! Job scheduling
//!
//! Three jobs share one loop: the news cycle on a fixed interval, the daily
//! status report, and the weekly history cleanup. Wall-clock jobs run on
//! local time.

use std::sync::Arc;
use std::time::Duration;

use alert_core::BotConfig;
use alert_news::ArticleSource;
use alert_telegram::AlertSink;
use chrono::{Datelike, Days, Local, NaiveDateTime, NaiveTime, Weekday};
use tokio::sync::broadcast;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{error, info};

use crate::news_cycle::NewsCycle;

/// When each job runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSchedule {
    pub fetch_interval: Duration,
    pub daily_status_at: NaiveTime,
    pub cleanup_day: Weekday,
    pub cleanup_at: NaiveTime,
}

impl Default for JobSchedule {
    fn default() -> Self {
        Self {
            fetch_interval: Duration::from_secs(2 * 60),
            daily_status_at: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            cleanup_day: Weekday::Sun,
            cleanup_at: NaiveTime::from_hms_opt(2, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl JobSchedule {
    pub fn from_config(config: &BotConfig) -> Self {
        Self {
            fetch_interval: Duration::from_secs(
                config.fetch_interval_minutes.max(1).saturating_mul(60),
            ),
            ..Self::default()
        }
    }
}

/// Next occurrence of `at`, strictly after `now`
pub fn next_daily_run(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + Days::new(1)
    }
}

/// Next occurrence of `weekday` at `at`, strictly after `now`
pub fn next_weekly_run(now: NaiveDateTime, weekday: Weekday, at: NaiveTime) -> NaiveDateTime {
    let days_ahead =
        (7 + weekday.num_days_from_monday() - now.weekday().num_days_from_monday()) % 7;
    let candidate = (now.date() + Days::new(u64::from(days_ahead))).and_time(at);
    if candidate > now {
        candidate
    } else {
        candidate + Days::new(7)
    }
}

/// Time left until `next`; zero if it has already passed
pub fn until(now: NaiveDateTime, next: NaiveDateTime) -> Duration {
    (next - now).to_std().unwrap_or_default()
}

/// A job that runs at a wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallClockJob {
    DailyStatus,
    WeeklyCleanup,
}

/// Pending deadlines of the wall-clock jobs
///
/// A deadline only moves forward once its job has been handed out, so a job
/// whose slot passed while something else was running still fires late.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDeadlines {
    daily: NaiveDateTime,
    weekly: NaiveDateTime,
}

impl JobDeadlines {
    pub fn new(schedule: &JobSchedule, now: NaiveDateTime) -> Self {
        Self {
            daily: next_daily_run(now, schedule.daily_status_at),
            weekly: next_weekly_run(now, schedule.cleanup_day, schedule.cleanup_at),
        }
    }

    pub fn daily(&self) -> NaiveDateTime {
        self.daily
    }

    pub fn weekly(&self) -> NaiveDateTime {
        self.weekly
    }

    /// The nearest pending deadline
    pub fn earliest(&self) -> NaiveDateTime {
        self.daily.min(self.weekly)
    }

    /// Jobs whose deadline is at or before `now`; their deadlines advance past `now`
    pub fn take_due(&mut self, schedule: &JobSchedule, now: NaiveDateTime) -> Vec<WallClockJob> {
        let mut due = Vec::new();

        if self.daily <= now {
            due.push(WallClockJob::DailyStatus);
            self.daily = next_daily_run(now, schedule.daily_status_at);
        }
        if self.weekly <= now {
            due.push(WallClockJob::WeeklyCleanup);
            self.weekly = next_weekly_run(now, schedule.cleanup_day, schedule.cleanup_at);
        }

        due
    }
}

/// Drives the news cycle and housekeeping jobs until shutdown
pub struct Scheduler<S, K> {
    cycle: Arc<NewsCycle<S, K>>,
    schedule: JobSchedule,
    config: BotConfig,
}

impl<S, K> Scheduler<S, K>
where
    S: ArticleSource,
    K: AlertSink,
{
    pub fn new(cycle: Arc<NewsCycle<S, K>>, schedule: JobSchedule, config: BotConfig) -> Self {
        Self {
            cycle,
            schedule,
            config,
        }
    }

    /// Run until a shutdown signal arrives
    ///
    /// Jobs run inline, so at most one of them is in flight at a time. A slow
    /// cycle swallows the ticks it overlapped; wall-clock jobs it overlapped
    /// run as soon as it finishes.
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) {
        info!(
            "Scheduler started: news every {}s, daily status at {}, cleanup {} at {}",
            self.schedule.fetch_interval.as_secs(),
            self.schedule.daily_status_at,
            self.schedule.cleanup_day,
            self.schedule.cleanup_at
        );

        let mut ticker = interval(self.schedule.fetch_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick is immediate; the startup cycle already covered it
        ticker.tick().await;

        let mut deadlines = JobDeadlines::new(&self.schedule, Local::now().naive_local());

        loop {
            let now = Local::now().naive_local();
            for job in deadlines.take_due(&self.schedule, now) {
                self.run_job(job).await;
            }

            let wake = sleep(until(now, deadlines.earliest()));

            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.cycle.run_cycle_with_retry().await {
                        error!("News cycle gave up: {}", e);
                    }
                }
                // Due jobs are picked up at the top of the loop
                _ = wake => {}
                _ = shutdown_rx.recv() => {
                    info!("Scheduler received shutdown signal");
                    break;
                }
            }
        }
    }

    async fn run_job(&self, job: WallClockJob) {
        match job {
            WallClockJob::DailyStatus => self.cycle.send_daily_status(&self.config).await,
            WallClockJob::WeeklyCleanup => self.cycle.cleanup().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alert_core::Article;
    use alert_news::NewsError;
    use alert_telegram::{Language, TelegramError};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use crate::filter::{FilterConfig, NewsFilter, SentHistory};
    use crate::news_cycle::CycleConfig;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_next_daily_run_later_today() {
        // 2026-10-16 is a Friday
        let now = at(2026, 10, 16, 8, 30);
        assert_eq!(next_daily_run(now, time(9, 0)), at(2026, 10, 16, 9, 0));
    }

    #[test]
    fn test_next_daily_run_is_strictly_after_now() {
        let now = at(2026, 10, 16, 9, 0);
        assert_eq!(next_daily_run(now, time(9, 0)), at(2026, 10, 17, 9, 0));

        let now = at(2026, 10, 16, 23, 59);
        assert_eq!(next_daily_run(now, time(9, 0)), at(2026, 10, 17, 9, 0));
    }

    #[test]
    fn test_next_weekly_run() {
        let friday = at(2026, 10, 16, 12, 0);
        assert_eq!(
            next_weekly_run(friday, Weekday::Sun, time(2, 0)),
            at(2026, 10, 18, 2, 0)
        );

        // Sunday before the slot runs the same day, after it a week later
        let sunday_early = at(2026, 10, 18, 1, 0);
        assert_eq!(
            next_weekly_run(sunday_early, Weekday::Sun, time(2, 0)),
            at(2026, 10, 18, 2, 0)
        );
        let sunday_at_slot = at(2026, 10, 18, 2, 0);
        assert_eq!(
            next_weekly_run(sunday_at_slot, Weekday::Sun, time(2, 0)),
            at(2026, 10, 25, 2, 0)
        );
    }

    #[test]
    fn test_until() {
        let now = at(2026, 10, 16, 8, 0);
        assert_eq!(until(now, at(2026, 10, 16, 9, 0)), Duration::from_secs(3600));
        assert_eq!(until(now, at(2026, 10, 16, 7, 0)), Duration::ZERO);
    }

    #[test]
    fn test_schedule_from_config() {
        let config = BotConfig {
            fetch_interval_minutes: 5,
            ..BotConfig::default()
        };
        let schedule = JobSchedule::from_config(&config);
        assert_eq!(schedule.fetch_interval, Duration::from_secs(300));
        assert_eq!(schedule.daily_status_at, time(9, 0));
        assert_eq!(schedule.cleanup_day, Weekday::Sun);
        assert_eq!(schedule.cleanup_at, time(2, 0));
    }

    #[test]
    fn test_schedule_from_huge_interval_saturates() {
        let config = BotConfig {
            fetch_interval_minutes: u64::MAX,
            ..BotConfig::default()
        };
        let schedule = JobSchedule::from_config(&config);
        assert_eq!(schedule.fetch_interval, Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_daily_slot_survives_overrunning_cycle() {
        let schedule = JobSchedule::default();
        // A cycle starts at 08:59:30 and finishes 45 seconds later
        let mut deadlines = JobDeadlines::new(
            &schedule,
            at(2026, 10, 16, 8, 59) + chrono::Duration::seconds(30),
        );
        assert_eq!(deadlines.daily(), at(2026, 10, 16, 9, 0));

        let after_cycle = at(2026, 10, 16, 9, 0) + chrono::Duration::seconds(15);
        assert_eq!(
            deadlines.take_due(&schedule, after_cycle),
            vec![WallClockJob::DailyStatus]
        );
        assert_eq!(deadlines.daily(), at(2026, 10, 17, 9, 0));

        // Fired once only
        assert!(deadlines.take_due(&schedule, after_cycle).is_empty());
    }

    #[test]
    fn test_weekly_slot_survives_overrunning_cycle() {
        let schedule = JobSchedule::default();
        let mut deadlines = JobDeadlines::new(&schedule, at(2026, 10, 18, 1, 59));
        assert_eq!(deadlines.weekly(), at(2026, 10, 18, 2, 0));

        let due = deadlines.take_due(&schedule, at(2026, 10, 18, 2, 3));
        assert_eq!(due, vec![WallClockJob::WeeklyCleanup]);
        assert_eq!(deadlines.weekly(), at(2026, 10, 25, 2, 0));
        assert_eq!(deadlines.earliest(), deadlines.daily());
    }

    #[test]
    fn test_nothing_due_before_deadline() {
        let schedule = JobSchedule::default();
        let mut deadlines = JobDeadlines::new(&schedule, at(2026, 10, 16, 8, 0));
        assert!(deadlines.take_due(&schedule, at(2026, 10, 16, 8, 59)).is_empty());
        assert_eq!(deadlines.earliest(), at(2026, 10, 16, 9, 0));
    }

    struct EmptySource;

    #[async_trait]
    impl ArticleSource for EmptySource {
        async fn fetch_all(&self) -> Result<Vec<Article>, NewsError> {
            Ok(vec![])
        }
    }

    struct NullSink;

    #[async_trait]
    impl AlertSink for NullSink {
        async fn send(&self, _text: &str) -> Result<(), TelegramError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let dir = TempDir::new().unwrap();
        let history = SentHistory::load(dir.path().join("sent.json"), 50);
        let cycle = Arc::new(NewsCycle::new(
            EmptySource,
            NullSink,
            NewsFilter::new(FilterConfig::default(), history),
            Language::En,
            dir.path().join("activity.txt"),
            CycleConfig::default(),
        ));
        let scheduler = Scheduler::new(cycle, JobSchedule::default(), BotConfig::default());

        let (tx, rx) = broadcast::channel(1);
        tx.send(()).unwrap();

        let stopped = tokio::time::timeout(Duration::from_secs(5), scheduler.run(rx)).await;
        assert!(stopped.is_ok());
    }
}
