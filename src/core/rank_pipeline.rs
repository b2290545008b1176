use crate::adapters::http::ApiClient;
use crate::config::CrawlerSettings;
use crate::core::cache::FileCache;
use crate::core::ranking::{
    build_snapshot, daily_key, deduplicate, is_expired_daily_key, DAILY_KEY_PREFIX, LATEST_KEY,
};
use crate::core::trading::market_now;
use crate::domain::model::{RankBoards, RankSnapshot};
use crate::domain::ports::{Pipeline, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;

/// Leaderboard pipeline: fetch every board, dedupe, snapshot, store.
pub struct RankPipeline<'a, S: Storage> {
    client: &'a ApiClient,
    cache: &'a FileCache<S>,
    settings: &'a CrawlerSettings,
}

impl<'a, S: Storage> RankPipeline<'a, S> {
    pub fn new(client: &'a ApiClient, cache: &'a FileCache<S>, settings: &'a CrawlerSettings) -> Self {
        Self {
            client,
            cache,
            settings,
        }
    }
}

#[async_trait]
impl<'a, S: Storage> Pipeline for RankPipeline<'a, S> {
    async fn extract(&self) -> Result<RankBoards> {
        let boards = self
            .client
            .fetch_all_boards(self.settings.records_per_board, self.settings.page_size)
            .await;
        Ok(boards.into_iter().collect())
    }

    async fn transform(&self, boards: RankBoards) -> Result<RankSnapshot> {
        let boards = if self.settings.enable_deduplication {
            let before: usize = boards.values().map(Vec::len).sum();
            let deduplicated = deduplicate(boards);
            let after: usize = deduplicated.values().map(Vec::len).sum();
            tracing::info!("🔄 Deduplicated {} → {} rows", before, after);
            deduplicated
        } else {
            boards
        };
        Ok(build_snapshot(boards, market_now()))
    }

    async fn load(&self, snapshot: RankSnapshot) -> Result<String> {
        let now = market_now();
        let key = daily_key(now.date());

        self.cache.delete(&key).await?;
        self.cache.set(&key, &snapshot).await?;
        self.cache.set(LATEST_KEY, &snapshot).await?;

        let removed = clean_expired(self.cache, now, self.settings.cache_expire_hours).await?;
        if removed > 0 {
            tracing::info!("🗑️ Removed {} expired snapshots", removed);
        }
        Ok(key)
    }
}

/// Deletes `rank_data_*` keys past retention; returns how many were removed.
pub async fn clean_expired<S: Storage>(
    cache: &FileCache<S>,
    now: NaiveDateTime,
    expire_hours: i64,
) -> Result<usize> {
    let mut removed = 0;
    for key in cache.keys().await? {
        if key.starts_with(DAILY_KEY_PREFIX)
            && is_expired_daily_key(&key, now, expire_hours)
            && cache.delete(&key).await?
        {
            tracing::debug!("🗑️ Removed expired cache key {}", key);
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalStorage;
    use chrono::NaiveDate;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_clean_expired_keeps_latest_and_recent() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(LocalStorage::new(dir.path()), "rank_cache");
        for key in [LATEST_KEY, "rank_data_20240110", "rank_data_20240115", "other"] {
            cache.set(key, &json!({})).await.unwrap();
        }

        let now = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(clean_expired(&cache, now, 1).await.unwrap(), 1);

        let mut keys = cache.keys().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["latest_rank_data", "other", "rank_data_20240115"]);
    }
}
