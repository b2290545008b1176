use crate::api::types::{DetailResponse, ListResponse};
use crate::utils::error::CrawlerError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// API-layer error; the body keeps the `{success: false, error, data}` shape.
#[derive(Debug)]
pub enum ApiError {
    /// 400
    BadRequest(String),
    /// 404
    NotFound(String),
    /// 502
    Upstream(String),
    /// 504
    Timeout(String),
    /// 500
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Upstream(msg)
            | ApiError::Timeout(msg)
            | ApiError::Internal(msg) => msg,
        }
    }

    /// List endpoints answer failures with an empty `data` array.
    pub fn into_list_response<T: serde::Serialize>(self) -> Response {
        let status = self.status();
        let body: ListResponse<T> = ListResponse::failed(self.message().to_string());
        (status, Json(body)).into_response()
    }

    pub fn into_detail_response(self) -> Response {
        let status = self.status();
        (status, Json(DetailResponse::failed(self.message().to_string()))).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "error": self.message(),
            "data": null,
        });
        (self.status(), Json(body)).into_response()
    }
}

impl From<CrawlerError> for ApiError {
    fn from(err: CrawlerError) -> Self {
        let message = err.user_friendly_message();
        match err {
            CrawlerError::InvalidPortfolioId(_) => ApiError::BadRequest(message),
            CrawlerError::TimeoutError { .. } => ApiError::Timeout(message),
            CrawlerError::HttpError(e) if e.is_timeout() => ApiError::Timeout(message),
            CrawlerError::HttpError(_)
            | CrawlerError::HttpStatusError { .. }
            | CrawlerError::ApiError { .. }
            | CrawlerError::EmptyDataError => ApiError::Upstream(message),
            _ => ApiError::Internal(message),
        }
    }
}
