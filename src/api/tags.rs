//! Tag API endpoints
//!
//! Public: the tag list with published-post counts. Admin: CRUD and the
//! paged list counting all posts.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::models::{PageResult, Tag, TagWithCount};

const TAG_NAME_MAX: usize = 100;

/// Request body for creating or renaming a tag
#[derive(Debug, Deserialize)]
pub struct TagNameRequest {
    pub name: String,
}

/// Query parameters for the admin tag page
#[derive(Debug, Deserialize)]
pub struct TagPageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

/// Response for a single tag
#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub id: i64,
    pub name: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::bad_request("tag name cannot be empty"));
    }
    if name.chars().count() > TAG_NAME_MAX {
        return Err(ApiError::bad_request("tag name is too long"));
    }
    Ok(())
}

/// Build the public tags router
pub fn public_router() -> Router<AppState> {
    Router::new().route("/", get(list_public_tags))
}

/// Build the admin tags router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_admin_tags).post(create_tag))
        .route("/{id}", axum::routing::put(rename_tag).delete(delete_tag))
}

/// GET /api/v1/tags - tags with published-post counts
async fn list_public_tags(
    State(state): State<AppState>,
) -> Result<Json<Vec<TagWithCount>>, ApiError> {
    let tags = state.tag_service.get_public_list().await?;
    Ok(Json(tags))
}

/// GET /api/v1/admin/tags - paged tags with all-post counts
async fn list_admin_tags(
    State(state): State<AppState>,
    Query(query): Query<TagPageQuery>,
) -> Result<Json<PageResult<TagWithCount>>, ApiError> {
    let page = state
        .tag_service
        .get_admin_page(query.page.max(1), query.page_size.clamp(1, 100))
        .await?;
    Ok(Json(page))
}

/// POST /api/v1/admin/tags - create a tag
async fn create_tag(
    State(state): State<AppState>,
    Json(request): Json<TagNameRequest>,
) -> Result<Json<TagResponse>, ApiError> {
    validate_name(&request.name)?;
    let tag = state.tag_service.create_tag(&request.name).await?;
    Ok(Json(tag.into()))
}

/// PUT /api/v1/admin/tags/{id} - rename a tag
async fn rename_tag(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<TagNameRequest>,
) -> Result<Json<TagResponse>, ApiError> {
    validate_name(&request.name)?;
    let tag = state.tag_service.rename_tag(id, &request.name).await?;
    Ok(Json(tag.into()))
}

/// DELETE /api/v1/admin/tags/{id} - delete an unused tag
async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.tag_service.delete_tag(id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
