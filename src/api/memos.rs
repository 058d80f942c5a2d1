//! Memo API endpoints

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::models::{Memo, MemoInput, MemoStats, PageResult, PublishStatus};

/// Query parameters for memo listings
#[derive(Debug, Deserialize)]
pub struct MemoPageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    /// Admin only: status filter
    #[serde(default)]
    pub status: Option<i64>,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

/// Build the public memos router
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_public_memos))
        .route("/stats", get(get_memo_stats))
}

/// Build the admin memos router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_admin_memos).post(create_memo))
        .route("/{id}", axum::routing::put(update_memo).delete(delete_memo))
}

/// GET /api/v1/memos - published memos, pinned first
async fn list_public_memos(
    State(state): State<AppState>,
    Query(query): Query<MemoPageQuery>,
) -> Result<Json<PageResult<Memo>>, ApiError> {
    let page = state
        .memo_service
        .get_public_page(query.page.max(1), query.page_size.clamp(1, 100))
        .await?;
    Ok(Json(page))
}

/// GET /api/v1/memos/stats - statistics over published memos
async fn get_memo_stats(State(state): State<AppState>) -> Result<Json<MemoStats>, ApiError> {
    let stats = state.memo_service.get_stats().await?;
    Ok(Json(stats))
}

/// GET /api/v1/admin/memos - memos of any status
async fn list_admin_memos(
    State(state): State<AppState>,
    Query(query): Query<MemoPageQuery>,
) -> Result<Json<PageResult<Memo>>, ApiError> {
    let status = match query.status {
        Some(raw) => Some(
            PublishStatus::from_i64(raw)
                .ok_or_else(|| ApiError::bad_request(format!("invalid status: {}", raw)))?,
        ),
        None => None,
    };

    let page = state
        .memo_service
        .get_admin_page(query.page.max(1), query.page_size.clamp(1, 100), status)
        .await?;
    Ok(Json(page))
}

/// POST /api/v1/admin/memos - create a memo
async fn create_memo(
    State(state): State<AppState>,
    Json(input): Json<MemoInput>,
) -> Result<Json<Memo>, ApiError> {
    let memo = state.memo_service.create_memo(input).await?;
    Ok(Json(memo))
}

/// PUT /api/v1/admin/memos/{id} - update a memo
async fn update_memo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<MemoInput>,
) -> Result<Json<Memo>, ApiError> {
    let memo = state.memo_service.update_memo(id, input).await?;
    Ok(Json(memo))
}

/// DELETE /api/v1/admin/memos/{id} - soft-delete a memo
async fn delete_memo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.memo_service.delete_memo(id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
