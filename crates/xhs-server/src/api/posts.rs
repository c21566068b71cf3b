use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use xhs_pipeline::crawl_posts;
use xhs_scraper::{resolve_detail, DetailTarget, NoteTarget};

use crate::middleware::RequestId;

use super::views::{BatchView, PostView};
use super::{map_item_error, map_pipeline_error, ApiError, ApiResponse, AppState};

/// Upper bound on URLs accepted by one batch call.
const MAX_BATCH_URLS: usize = 50;

#[derive(Debug, Deserialize)]
pub(super) struct PostRequest {
    pub url: String,
    pub cookies: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct BatchRequest {
    pub urls: Vec<String>,
    pub cookies: Option<String>,
}

pub(super) async fn get_post(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PostRequest>,
) -> Result<Json<ApiResponse<PostView>>, ApiError> {
    fetch_post(&state, req_id, query).await
}

pub(super) async fn post_post(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<PostRequest>,
) -> Result<Json<ApiResponse<PostView>>, ApiError> {
    fetch_post(&state, req_id, body).await
}

async fn fetch_post(
    state: &AppState,
    req_id: RequestId,
    request: PostRequest,
) -> Result<Json<ApiResponse<PostView>>, ApiError> {
    let credential = state
        .credential(request.cookies.as_deref())
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;
    let target =
        NoteTarget::parse(&request.url).map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    tracing::info!(note_id = %target.note_id, request_id = %req_id.0, "fetching post");
    let record = resolve_detail(
        state.source.as_ref(),
        &DetailTarget::Url(target.url),
        &credential,
    )
    .await
    .map_err(|e| map_item_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, PostView::from(record))))
}

pub(super) async fn post_batch(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<BatchRequest>,
) -> Result<Json<ApiResponse<BatchView>>, ApiError> {
    if body.urls.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "urls must not be empty",
        ));
    }
    if body.urls.len() > MAX_BATCH_URLS {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            format!("at most {MAX_BATCH_URLS} urls per batch"),
        ));
    }

    let credential = state
        .credential(body.cookies.as_deref())
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    // Dropping the handler future (client disconnect) abandons in-flight work.
    let cancel = CancellationToken::new();
    let result = crawl_posts(
        state.source.as_ref(),
        &state.settings,
        &body.urls,
        &credential,
        &cancel,
    )
    .await
    .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    tracing::info!(
        request_id = %req_id.0,
        total = result.total,
        succeeded = result.succeeded_count(),
        failed = result.failed_count(),
        "batch finished"
    );
    Ok(Json(ApiResponse::new(req_id.0, BatchView::from(result))))
}
