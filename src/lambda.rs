use axum::body::Body;
use axum::Router;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use rank_crawler::api::{create_router, AppState};
use rank_crawler::utils::logger;
use rank_crawler::AppConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower::ServiceExt;

/// Every path is routed through the one router.
#[derive(Deserialize)]
pub struct Request {
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub query: Option<String>,
}

fn default_path() -> String {
    "/".to_string()
}

#[derive(Serialize)]
pub struct Response {
    pub status_code: u16,
    pub body: Value,
}

async fn function_handler(router: Router, event: LambdaEvent<Request>) -> Result<Response, Error> {
    let uri = match &event.payload.query {
        Some(query) if !query.is_empty() => format!("{}?{}", event.payload.path, query),
        _ => event.payload.path.clone(),
    };
    tracing::info!("Handling {}", uri);

    let request = axum::http::Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())?;
    let response = router.oneshot(request).await?;

    let status_code = response.status().as_u16();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

    Ok(Response { status_code, body })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_serverless_logger();

    let config = AppConfig::for_serverless();
    tracing::info!("Cache directory: {}", config.crawler.cache_dir);
    let router = create_router(AppState::from_config(&config)?);

    run(service_fn(move |event| function_handler(router.clone(), event))).await
}
