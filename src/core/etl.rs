use crate::domain::ports::Pipeline;
use crate::utils::error::{CrawlerError, Result};
use crate::utils::monitor::SystemMonitor;
use std::time::{Duration, Instant};

/// Outcome of one extract → transform → load pass.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateReport {
    pub cache_key: String,
    pub boards: usize,
    pub total_records: usize,
    pub elapsed: Duration,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<UpdateReport> {
        let started = Instant::now();
        tracing::info!("🚀 Starting rank update...");
        self.monitor.log_stats("Update started");

        tracing::info!("📥 Extracting leaderboards...");
        let boards = self.pipeline.extract().await?;
        let extracted: usize = boards.values().map(Vec::len).sum();
        if extracted == 0 {
            return Err(CrawlerError::EmptyDataError);
        }
        tracing::info!("📥 Extracted {} rows from {} boards", extracted, boards.len());
        self.monitor.log_stats("Extract completed");

        tracing::info!("🔄 Transforming...");
        let snapshot = self.pipeline.transform(boards).await?;
        let board_count = snapshot.data.len();
        let total_records = snapshot.total_records;
        tracing::info!("🔄 Snapshot holds {} rows", total_records);

        tracing::info!("💾 Saving snapshot...");
        let cache_key = self.pipeline.load(snapshot).await?;
        self.monitor.log_stats("Load completed");

        let elapsed = started.elapsed();
        tracing::info!("✅ Saved {} in {:.2?}", cache_key, elapsed);

        Ok(UpdateReport {
            cache_key,
            boards: board_count,
            total_records,
            elapsed,
        })
    }
}
