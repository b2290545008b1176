use crate::config::ScheduleSettings;
use crate::core::etl::UpdateReport;
use crate::core::service::RankService;
use crate::core::trading::{is_trading_time, market_now};
use crate::domain::ports::Storage;
use chrono::NaiveDateTime;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

#[derive(Debug)]
pub enum TickOutcome {
    Updated(UpdateReport),
    OutsideTradingHours,
    Failed(String),
    TimedOut,
}

/// Periodic leaderboard refresh.
pub struct Scheduler<S: Storage> {
    service: Arc<RankService<S>>,
    settings: ScheduleSettings,
}

impl<S: Storage> Scheduler<S> {
    pub fn new(service: Arc<RankService<S>>, settings: ScheduleSettings) -> Self {
        Self { service, settings }
    }

    pub async fn tick(&self) -> TickOutcome {
        self.tick_at(market_now()).await
    }

    pub async fn tick_at(&self, now: NaiveDateTime) -> TickOutcome {
        if self.settings.trading_time_check && !is_trading_time(now) {
            tracing::info!("⏸️ Outside trading hours ({}), skipping update", now.format("%H:%M"));
            return TickOutcome::OutsideTradingHours;
        }

        let limit = Duration::from_secs(self.settings.update_timeout_seconds);
        match tokio::time::timeout(limit, self.service.run_update()).await {
            Ok(Ok(report)) => TickOutcome::Updated(report),
            Ok(Err(e)) => {
                tracing::error!("❌ Scheduled update failed: {}", e.user_friendly_message());
                if e.is_retryable() {
                    tracing::info!("🔁 Will retry at the next refresh");
                } else {
                    tracing::warn!("💡 {}", e.recovery_suggestion());
                }
                TickOutcome::Failed(e.to_string())
            }
            Err(_) => {
                tracing::error!("⏰ Scheduled update exceeded {}s", limit.as_secs());
                TickOutcome::TimedOut
            }
        }
    }

    /// Runs until `shutdown` turns true or its sender is dropped.
    ///
    /// The first tick fires one full interval after the call.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let period = Duration::from_secs(self.settings.refresh_interval_seconds.max(1));
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!("⏱️ Scheduler started, refreshing every {}s", period.as_secs());
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!("🛑 Scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalStorage;
    use crate::config::CrawlerSettings;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn scheduler(dir: &TempDir, settings: ScheduleSettings) -> Scheduler<LocalStorage> {
        let crawler = CrawlerSettings {
            base_url: "http://127.0.0.1:9/rtV1".to_string(),
            retry_attempts: 1,
            retry_delay_millis: 0,
            ..CrawlerSettings::default()
        };
        let service = RankService::new(crawler, LocalStorage::new(dir.path())).unwrap();
        Scheduler::new(Arc::new(service), settings)
    }

    #[tokio::test]
    async fn test_tick_skips_outside_trading_hours() {
        let dir = TempDir::new().unwrap();
        let scheduler = scheduler(
            &dir,
            ScheduleSettings {
                trading_time_check: true,
                ..ScheduleSettings::default()
            },
        );
        // 週六
        let saturday = NaiveDate::from_ymd_opt(2024, 1, 13)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();

        assert!(matches!(
            scheduler.tick_at(saturday).await,
            TickOutcome::OutsideTradingHours
        ));
    }

    #[tokio::test]
    async fn test_tick_reports_failed_update() {
        let dir = TempDir::new().unwrap();
        let scheduler = scheduler(&dir, ScheduleSettings::default());
        let now = NaiveDate::from_ymd_opt(2024, 1, 13)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();

        assert!(matches!(scheduler.tick_at(now).await, TickOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let dir = TempDir::new().unwrap();
        let scheduler = scheduler(
            &dir,
            ScheduleSettings {
                refresh_interval_seconds: 3600,
                ..ScheduleSettings::default()
            },
        );
        let (tx, rx) = watch::channel(false);

        let stop = async {
            tx.send(true).unwrap();
        };
        let (_, ()) = tokio::join!(scheduler.run(rx), stop);
    }
}
