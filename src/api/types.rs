use crate::domain::model::PortfolioDetail;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub days_back: Option<u32>,
    pub max_days: Option<u32>,
}

/// `/api/stock_summary` and `/api/tc_list` body.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ListResponse<T> {
    pub fn ok(data: Vec<T>, update_time: String) -> Self {
        Self {
            success: true,
            total: data.len(),
            data,
            update_time: Some(update_time),
            error: None,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            success: false,
            data: Vec::new(),
            total: 0,
            update_time: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub success: bool,
    pub data: Option<PortfolioDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_cache: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DetailResponse {
    pub fn ok(data: PortfolioDetail, update_time: String, from_cache: bool) -> Self {
        Self {
            success: true,
            data: Some(data),
            update_time: Some(update_time),
            from_cache: Some(from_cache),
            error: None,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            success: false,
            data: None,
            update_time: None,
            from_cache: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub cache_dir: String,
    pub version: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub service: String,
    pub version: String,
    pub endpoints: Vec<String>,
}
