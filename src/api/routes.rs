use super::handlers;
use super::state::AppState;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Every path goes through this one router, both for the long-running server
/// and for the serverless entry.
pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health))
        .route("/stock_summary", get(handlers::stock_summary))
        .route("/tc_list", get(handlers::tc_list))
        .route("/portfolio_detail/:id", get(handlers::portfolio_detail));

    Router::new()
        .route("/", get(handlers::index))
        .nest("/api", api)
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
