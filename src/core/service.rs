use crate::adapters::http::ApiClient;
use crate::config::CrawlerSettings;
use crate::core::cache::FileCache;
use crate::core::etl::{EtlEngine, UpdateReport};
use crate::core::holdings::{parse_hold_changes, summarize_by_stock, PortfolioRef};
use crate::core::portfolio::parse_portfolio_detail;
use crate::core::rank_pipeline::{clean_expired, RankPipeline};
use crate::core::ranking::{portfolio_rank_tags, summary_report, LATEST_KEY};
use crate::core::trading::{market_now, target_dates};
use crate::domain::model::{PortfolioDetail, RankSnapshot, StockSummary, TradeRecord};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use crate::utils::validation::validate_portfolio_id;
use chrono::NaiveDateTime;
use futures_util::stream::{self, StreamExt};
use std::collections::HashSet;

pub const RANK_CACHE_NAMESPACE: &str = "rank_cache";

/// Leaderboard snapshots, trade records and portfolio details on top of one
/// API client and one rank cache. Stateless between calls apart from the cache.
pub struct RankService<S: Storage> {
    client: ApiClient,
    cache: FileCache<S>,
    settings: CrawlerSettings,
    monitor_enabled: bool,
}

impl<S: Storage> RankService<S> {
    pub fn new(settings: CrawlerSettings, storage: S) -> Result<Self> {
        let client = ApiClient::new(&settings)?;
        Ok(Self {
            client,
            cache: FileCache::new(storage, RANK_CACHE_NAMESPACE),
            settings,
            monitor_enabled: false,
        })
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor_enabled = enabled;
        self
    }

    pub fn settings(&self) -> &CrawlerSettings {
        &self.settings
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn cache(&self) -> &FileCache<S> {
        &self.cache
    }

    /// Fetches all boards and stores a fresh snapshot.
    pub async fn run_update(&self) -> Result<UpdateReport> {
        let pipeline = RankPipeline::new(&self.client, &self.cache, &self.settings);
        EtlEngine::new_with_monitoring(pipeline, self.monitor_enabled)
            .run()
            .await
    }

    pub async fn load_latest(&self) -> Result<Option<RankSnapshot>> {
        self.cache.get(LATEST_KEY).await
    }

    /// The latest snapshot, updating first when the cache has nothing usable.
    pub async fn cached_rank_list(&self) -> Result<Option<RankSnapshot>> {
        if let Some(snapshot) = self.load_latest().await? {
            if !snapshot.is_empty() {
                return Ok(Some(snapshot));
            }
        }

        tracing::info!("📭 No cached leaderboard, updating now");
        if let Err(e) = self.run_update().await {
            tracing::warn!("⚠️ Update failed: {}", e);
        }
        Ok(self.load_latest().await?.filter(|s| !s.is_empty()))
    }

    pub async fn clean_expired_cache(&self, now: NaiveDateTime) -> Result<usize> {
        clean_expired(&self.cache, now, self.settings.cache_expire_hours).await
    }

    /// Position changes of every ranked portfolio on the target trading dates.
    ///
    /// With `use_cache == false` the leaderboard is refreshed first; a failed
    /// refresh falls back to whatever the cache holds.
    pub async fn tc_list(
        &self,
        days_back: u32,
        max_days_search: u32,
        use_cache: bool,
    ) -> Result<Vec<TradeRecord>> {
        let snapshot = if use_cache {
            self.cached_rank_list().await?
        } else {
            match self.run_update().await {
                Ok(report) => {
                    tracing::info!("🔄 Leaderboard refreshed ({} rows)", report.total_records);
                    self.load_latest().await?
                }
                Err(e) => {
                    tracing::warn!("⚠️ Refresh failed, using cached leaderboard: {}", e);
                    self.cached_rank_list().await?
                }
            }
        };

        let Some(snapshot) = snapshot else {
            tracing::warn!("📭 No leaderboard data available");
            return Ok(Vec::new());
        };

        let dates = target_dates(market_now(), days_back, max_days_search.max(1));
        tracing::info!("📅 Target dates: {}", dates.join(", "));
        Ok(self.trades_for_snapshot(&snapshot, &dates).await)
    }

    /// Fetches holdings for each distinct portfolio in `snapshot`, at most
    /// `concurrent_requests` at a time, preserving board order.
    pub async fn trades_for_snapshot(
        &self,
        snapshot: &RankSnapshot,
        dates: &[String],
    ) -> Vec<TradeRecord> {
        let mut seen = HashSet::new();
        let portfolios: Vec<PortfolioRef> = snapshot
            .entries()
            .filter_map(|entry| {
                let id = entry.portfolio_id()?;
                let name = entry.portfolio_name().unwrap_or_default();
                seen.insert(id.clone()).then_some(PortfolioRef { id, name })
            })
            .collect();
        tracing::info!("📡 Fetching holdings of {} portfolios", portfolios.len());

        let record_count = self.settings.holdings_record_count;
        let per_portfolio: Vec<Vec<TradeRecord>> = stream::iter(portfolios)
            .map(|portfolio| async move {
                match self.client.fetch_hold_changes(&portfolio.id, record_count).await {
                    Ok(changes) => parse_hold_changes(&portfolio, &changes, dates),
                    Err(e) => {
                        tracing::warn!("⚠️ Holdings of {} failed: {}", portfolio.id, e);
                        Vec::new()
                    }
                }
            })
            .buffered(self.settings.concurrent_requests.max(1))
            .collect()
            .await;

        let records: Vec<TradeRecord> = per_portfolio.into_iter().flatten().collect();
        tracing::info!("✅ Collected {} trade records", records.len());
        records
    }

    /// Trade records of a fresh refresh, grouped per stock.
    pub async fn stock_summary(
        &self,
        days_back: u32,
        max_days_search: u32,
    ) -> Result<Vec<StockSummary>> {
        let records = self.tc_list(days_back, max_days_search, false).await?;
        let tags = match self.load_latest().await? {
            Some(snapshot) => portfolio_rank_tags(&snapshot),
            None => Default::default(),
        };
        Ok(summarize_by_stock(&records, &tags))
    }

    pub async fn portfolio_detail(&self, portfolio_id: &str) -> Result<PortfolioDetail> {
        validate_portfolio_id(portfolio_id)?;
        let data = self.client.fetch_portfolio_detail(portfolio_id).await?;
        Ok(parse_portfolio_detail(portfolio_id, &data))
    }

    pub async fn latest_summary_report(&self) -> Result<Option<String>> {
        Ok(self.load_latest().await?.map(|snapshot| summary_report(&snapshot)))
    }
}
