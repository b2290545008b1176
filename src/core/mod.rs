pub mod cache;
pub mod etl;
pub mod holdings;
pub mod portfolio;
pub mod rank_pipeline;
pub mod ranking;
pub mod scheduler;
pub mod service;
pub mod trading;

pub use crate::domain::ports::{Pipeline, Storage};
pub use crate::utils::error::Result;
pub use cache::FileCache;
pub use etl::{EtlEngine, UpdateReport};
pub use rank_pipeline::RankPipeline;
pub use scheduler::{Scheduler, TickOutcome};
pub use service::{RankService, RANK_CACHE_NAMESPACE};
