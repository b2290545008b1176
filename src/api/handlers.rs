use super::error::ApiError;
use super::state::AppState;
use super::types::{DetailResponse, HealthResponse, IndexResponse, ListQuery, ListResponse};
use crate::core::trading::{market_now, MAX_DAYS_BACK, MAX_DAYS_SEARCH};
use crate::domain::model::{PortfolioDetail, StockSummary, TradeRecord};
use crate::utils::error::CrawlerError;
use crate::utils::validation::validate_portfolio_id;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::Uri,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

fn clock() -> String {
    market_now().format("%H:%M:%S").to_string()
}

/// Resolves `days_back` and `max_days` against the server defaults.
fn list_window(
    state: &AppState,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<(u32, u32), ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let days_back = query.days_back.unwrap_or(state.server.days_back);
    if days_back > MAX_DAYS_BACK {
        return Err(ApiError::BadRequest(format!(
            "days_back must be at most {}",
            MAX_DAYS_BACK
        )));
    }
    let max_days = query.max_days.unwrap_or(state.server.max_days_search);
    if !(1..=MAX_DAYS_SEARCH).contains(&max_days) {
        return Err(ApiError::BadRequest(format!(
            "max_days must be between 1 and {}",
            MAX_DAYS_SEARCH
        )));
    }
    Ok((days_back, max_days))
}

pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        service: "rank-crawler".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: [
            "/api/health",
            "/api/stock_summary",
            "/api/tc_list",
            "/api/portfolio_detail/{id}",
        ]
        .into_iter()
        .map(String::from)
        .collect(),
    })
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        cache_dir: state.cache_dir.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

pub async fn stock_summary(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response {
    let (days_back, max_days) = match list_window(&state, query) {
        Ok(window) => window,
        Err(e) => return e.into_list_response::<StockSummary>(),
    };
    match state.service.stock_summary(days_back, max_days).await {
        Ok(data) => Json(ListResponse::ok(data, clock())).into_response(),
        Err(e) => {
            tracing::error!("❌ Stock summary failed: {}", e);
            ApiError::from(e).into_list_response::<StockSummary>()
        }
    }
}

pub async fn tc_list(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response {
    let (days_back, max_days) = match list_window(&state, query) {
        Ok(window) => window,
        Err(e) => return e.into_list_response::<TradeRecord>(),
    };
    match state.service.tc_list(days_back, max_days, true).await {
        Ok(data) => Json(ListResponse::ok(data, clock())).into_response(),
        Err(e) => {
            tracing::error!("❌ Trade record list failed: {}", e);
            ApiError::from(e).into_list_response::<TradeRecord>()
        }
    }
}

/// Served from the detail cache when fresh, otherwise fetched under a timeout
/// and cached for `detail_cache_ttl_seconds`.
pub async fn portfolio_detail(
    State(state): State<Arc<AppState>>,
    Path(portfolio_id): Path<String>,
) -> Response {
    if let Err(e) = validate_portfolio_id(&portfolio_id) {
        return ApiError::from(e).into_detail_response();
    }

    let cache_key = format!("portfolio_{}", portfolio_id);
    match state.detail_cache.get::<PortfolioDetail>(&cache_key).await {
        Ok(Some(detail)) => {
            tracing::info!("📦 Portfolio {} served from cache", portfolio_id);
            return Json(DetailResponse::ok(detail, clock(), true)).into_response();
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("⚠️ Detail cache read failed: {}", e),
    }

    let seconds = state.server.detail_timeout_seconds;
    let fetched = tokio::time::timeout(
        Duration::from_secs(seconds),
        state.service.portfolio_detail(&portfolio_id),
    )
    .await
    .unwrap_or_else(|_| {
        Err(CrawlerError::TimeoutError {
            operation: format!("portfolio {} detail", portfolio_id),
            seconds,
        })
    });

    match fetched {
        Ok(detail) => {
            let ttl = Duration::from_secs(state.server.detail_cache_ttl_seconds);
            if let Err(e) = state.detail_cache.set_with_ttl(&cache_key, &detail, ttl).await {
                tracing::warn!("⚠️ Detail cache write failed: {}", e);
            }
            Json(DetailResponse::ok(detail, clock(), false)).into_response()
        }
        Err(e) => {
            tracing::error!("❌ Portfolio {} detail failed: {}", portfolio_id, e);
            ApiError::from(e).into_detail_response()
        }
    }
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("no route for {}", uri.path()))
}
