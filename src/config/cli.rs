use crate::config::toml_config::AppConfig;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "rank-crawler")]
#[command(about = "Portfolio leaderboard crawler with trade-record summaries")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "RANK_CRAWLER_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub cache_dir: Option<String>,

    #[arg(long)]
    pub base_url: Option<String>,

    /// Seconds between scheduled refreshes
    #[arg(long)]
    pub refresh_interval: Option<u64>,

    /// Keep portfolios on every board they appear on
    #[arg(long)]
    pub no_dedup: bool,

    /// Only refresh during A-share trading hours
    #[arg(long)]
    pub trading_time_check: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process CPU and memory after each update")]
    pub monitor: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Update once, then keep refreshing on a schedule (default)
    Run,
    /// Run a single leaderboard update
    Once,
    /// Print the cached leaderboard summary
    Summary,
    /// List position changes of ranked portfolios
    Trades {
        #[arg(long, default_value = "0")]
        days_back: u32,
        #[arg(long, default_value = "3")]
        max_days: u32,
        /// Read the leaderboard from cache instead of refreshing it
        #[arg(long)]
        use_cache: bool,
        /// Write the records to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Aggregate position changes per stock
    Stocks {
        #[arg(long, default_value = "0")]
        days_back: u32,
        #[arg(long, default_value = "3")]
        max_days: u32,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

impl CliConfig {
    /// 合併 TOML 配置與命令列覆蓋
    pub fn load_app_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        config.apply_env_overrides();

        if let Some(dir) = &self.cache_dir {
            config.crawler.cache_dir = dir.clone();
        }
        if let Some(url) = &self.base_url {
            config.crawler.base_url = url.clone();
        }
        if let Some(interval) = self.refresh_interval {
            config.schedule.refresh_interval_seconds = interval;
        }
        if self.no_dedup {
            config.crawler.enable_deduplication = false;
        }
        if self.trading_time_check {
            config.schedule.trading_time_check = true;
        }
        Ok(config)
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}
