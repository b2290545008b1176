pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod deploy;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::{ApiClient, LocalStorage};
pub use config::AppConfig;
pub use core::{EtlEngine, RankPipeline, RankService, Scheduler, UpdateReport};
pub use utils::error::{CrawlerError, Result};
