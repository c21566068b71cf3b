mod posts;
mod views;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use xhs_core::{Credential, ItemError, PipelineError};
use xhs_pipeline::CrawlSettings;
use xhs_scraper::NoteSource;

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

const SERVICE_NAME: &str = "xhs-api";

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn NoteSource>,
    pub settings: CrawlSettings,
    /// Fallback session cookie for requests that do not send their own.
    pub cookies: Option<Credential>,
}

impl AppState {
    /// Per-request cookies win over the configured ones.
    pub(super) fn credential(&self, explicit: Option<&str>) -> Result<Credential, PipelineError> {
        Credential::resolve(explicit, self.cookies.as_ref())
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    service: &'static str,
}

#[derive(Debug, Serialize)]
struct ServiceIndex {
    service: &'static str,
    version: &'static str,
    endpoints: [&'static str; 5],
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(request_id: String, data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_pipeline_error(request_id: String, error: &PipelineError) -> ApiError {
    match error {
        PipelineError::InvalidInput { .. } | PipelineError::MissingCredential => {
            ApiError::new(request_id, "bad_request", error.to_string())
        }
        PipelineError::ListingFailed { .. } | PipelineError::ProfileFailed { .. } => {
            tracing::error!(error = %error, "pipeline aborted");
            ApiError::new(request_id, "upstream_error", error.to_string())
        }
    }
}

pub(super) fn map_item_error(request_id: String, error: &ItemError) -> ApiError {
    match error {
        ItemError::NotFound => ApiError::new(request_id, "not_found", "post not found"),
        ItemError::MissingIdentifier => {
            ApiError::new(request_id, "bad_request", "post URL has no note id")
        }
        ItemError::FetchFailed { .. } | ItemError::MalformedResponse { .. } => {
            tracing::warn!(error = %error, "post fetch failed");
            ApiError::new(request_id, "upstream_error", error.to_string())
        }
        ItemError::Cancelled => ApiError::new(request_id, "internal_error", "request cancelled"),
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

fn scraping_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/post", get(posts::get_post).post(posts::post_post))
        .route("/api/batch", axum::routing::post(posts::post_batch))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new()
        .route("/", get(index))
        .route("/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(scraping_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(60, Duration::from_secs(60))
}

async fn index(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    Json(ApiResponse::new(
        req_id.0,
        ServiceIndex {
            service: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
            endpoints: [
                "GET /",
                "GET /health",
                "GET /api/post?url=&cookies=",
                "POST /api/post",
                "POST /api/batch",
            ],
        },
    ))
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    Json(ApiResponse::new(
        req_id.0,
        HealthData {
            status: "healthy",
            service: SERVICE_NAME,
        },
    ))
}
