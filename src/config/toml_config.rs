use crate::core::trading::{MAX_DAYS_BACK, MAX_DAYS_SEARCH};
use crate::utils::error::{CrawlerError, Result};
use crate::utils::validation::{validate_path, validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://emdcspzhapi.dfcfs.cn/rtV1";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub crawler: CrawlerSettings,
    pub schedule: ScheduleSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerSettings {
    pub base_url: String,
    pub cache_dir: String,
    pub enable_deduplication: bool,
    pub records_per_board: usize,
    /// 上游每頁最多 20 筆
    pub page_size: usize,
    pub request_timeout_seconds: u64,
    pub holdings_timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_millis: u64,
    pub concurrent_requests: usize,
    pub holdings_record_count: usize,
    pub cache_expire_hours: i64,
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_dir: "./data/cache".to_string(),
            enable_deduplication: true,
            records_per_board: 100,
            page_size: 20,
            request_timeout_seconds: 30,
            holdings_timeout_seconds: 10,
            retry_attempts: 3,
            retry_delay_millis: 1000,
            concurrent_requests: 10,
            holdings_record_count: 50,
            cache_expire_hours: 1,
        }
    }
}

impl CrawlerSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn holdings_timeout(&self) -> Duration {
        Duration::from_secs(self.holdings_timeout_seconds)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    pub refresh_interval_seconds: u64,
    pub trading_time_check: bool,
    pub update_timeout_seconds: u64,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            refresh_interval_seconds: 100,
            trading_time_check: false,
            update_timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub detail_cache_ttl_seconds: u64,
    pub detail_timeout_seconds: u64,
    pub days_back: u32,
    pub max_days_search: u32,
}

impl ServerSettings {
    /// Port tried first when binding: an explicit override, else `port`.
    pub fn preferred_port(&self, override_port: Option<u16>) -> u16 {
        override_port.unwrap_or(self.port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8889,
            detail_cache_ttl_seconds: 60,
            detail_timeout_seconds: 8,
            days_back: 0,
            max_days_search: 1,
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CrawlerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CrawlerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${VERCEL_CACHE_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CrawlerError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Applies `HOST`, `PORT` and `CACHE_DIR` from the environment.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("HOST") {
            self.server.host = host;
        }
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Ok(dir) = std::env::var("CACHE_DIR") {
            self.crawler.cache_dir = dir;
        }
    }

    /// Serverless 實例沒有持久磁碟：快取目錄取 `VERCEL_CACHE_DIR`，否則用系統暫存目錄
    pub fn for_serverless() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.crawler.cache_dir = std::env::var("VERCEL_CACHE_DIR")
            .unwrap_or_else(|_| std::env::temp_dir().to_string_lossy().into_owned());
        config
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        let crawler = &self.crawler;
        validate_url("crawler.base_url", &crawler.base_url)?;
        validate_path("crawler.cache_dir", &crawler.cache_dir)?;
        validate_range("crawler.page_size", crawler.page_size, 1, 20)?;
        validate_range("crawler.records_per_board", crawler.records_per_board, 1, 500)?;
        validate_range("crawler.retry_attempts", crawler.retry_attempts, 1, 10)?;
        validate_range("crawler.concurrent_requests", crawler.concurrent_requests, 1, 100)?;
        validate_range("crawler.cache_expire_hours", crawler.cache_expire_hours, 0, 24 * 30)?;
        validate_range(
            "schedule.refresh_interval_seconds",
            self.schedule.refresh_interval_seconds,
            1,
            86_400,
        )?;
        validate_range("server.days_back", self.server.days_back, 0, MAX_DAYS_BACK)?;
        validate_range(
            "server.max_days_search",
            self.server.max_days_search,
            1,
            MAX_DAYS_SEARCH,
        )?;

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_upstream_limits() {
        let config = AppConfig::default();
        assert_eq!(config.crawler.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.crawler.page_size, 20);
        assert_eq!(config.crawler.records_per_board, 100);
        assert_eq!(config.schedule.update_timeout_seconds, 120);
        assert_eq!(config.server.detail_timeout_seconds, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
[crawler]
enable_deduplication = false
records_per_board = 40

[schedule]
trading_time_check = true
"#,
        )
        .unwrap();

        assert!(!config.crawler.enable_deduplication);
        assert_eq!(config.crawler.records_per_board, 40);
        assert_eq!(config.crawler.page_size, 20);
        assert!(config.schedule.trading_time_check);
        assert_eq!(config.server.port, 8889);
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("RANK_CRAWLER_TEST_DIR", "/tmp/rank-test");
        let config = AppConfig::from_toml_str(
            r#"
[crawler]
cache_dir = "${RANK_CRAWLER_TEST_DIR}/cache"
"#,
        )
        .unwrap();
        assert_eq!(config.crawler.cache_dir, "/tmp/rank-test/cache");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = AppConfig::default();
        config.crawler.page_size = 50;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.crawler.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.server.days_back = 1000;
        assert!(config.validate().is_err());

        assert!(AppConfig::from_toml_str("[crawler\nbroken").is_err());
    }

    #[test]
    fn test_configured_port_is_preferred() {
        let config = AppConfig::from_toml_str(
            r#"
[server]
port = 9000
"#,
        )
        .unwrap();

        assert_eq!(config.server.preferred_port(None), 9000);
        assert_eq!(config.server.preferred_port(Some(7000)), 7000);
    }
}
