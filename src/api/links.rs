//! Friend link API endpoints

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState};
use crate::models::{Link, LinkInput};

/// Build the public links router
pub fn public_router() -> Router<AppState> {
    Router::new().route("/", get(list_public_links))
}

/// Build the admin links router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_admin_links).post(create_link))
        .route("/{id}", axum::routing::put(update_link).delete(delete_link))
}

/// GET /api/v1/links - public links only
async fn list_public_links(State(state): State<AppState>) -> Result<Json<Vec<Link>>, ApiError> {
    let links = state.link_service.get_public_list().await?;
    Ok(Json(links))
}

/// GET /api/v1/admin/links - every link
async fn list_admin_links(State(state): State<AppState>) -> Result<Json<Vec<Link>>, ApiError> {
    let links = state.link_service.get_admin_list().await?;
    Ok(Json(links))
}

/// POST /api/v1/admin/links - create a link
async fn create_link(
    State(state): State<AppState>,
    Json(input): Json<LinkInput>,
) -> Result<Json<Link>, ApiError> {
    let link = state.link_service.create_link(input).await?;
    Ok(Json(link))
}

/// PUT /api/v1/admin/links/{id} - update a link
async fn update_link(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<LinkInput>,
) -> Result<Json<Link>, ApiError> {
    let link = state.link_service.update_link(id, input).await?;
    Ok(Json(link))
}

/// DELETE /api/v1/admin/links/{id} - remove a link
async fn delete_link(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.link_service.delete_link(id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
