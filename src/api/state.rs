use crate::adapters::storage::LocalStorage;
use crate::config::{AppConfig, ServerSettings};
use crate::core::cache::FileCache;
use crate::core::service::RankService;
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Instant;

pub const DETAIL_CACHE_NAMESPACE: &str = "portfolio_cache";

/// Shared state for all handlers
pub struct AppState {
    pub service: Arc<RankService<LocalStorage>>,
    pub detail_cache: FileCache<LocalStorage>,
    pub server: ServerSettings,
    pub cache_dir: String,
    pub start_time: Instant,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Arc<Self>> {
        let storage = LocalStorage::new(&config.crawler.cache_dir);
        let service = RankService::new(config.crawler.clone(), storage.clone())?;
        Ok(Arc::new(Self::new(Arc::new(service), storage, config)))
    }

    pub fn new(
        service: Arc<RankService<LocalStorage>>,
        storage: LocalStorage,
        config: &AppConfig,
    ) -> Self {
        Self {
            service,
            detail_cache: FileCache::new(storage, DETAIL_CACHE_NAMESPACE),
            server: config.server.clone(),
            cache_dir: config.crawler.cache_dir.clone(),
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
