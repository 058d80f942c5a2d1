//! Post API endpoints
//!
//! Public: listing, detail by slug, archive. Admin: full CRUD plus the
//! unfiltered page query. Request bodies are validated here (non-blank
//! fields, slug shape, bounded lengths) before the workflows run; slug
//! uniqueness stays a service-level concern.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{PostDetailResponse, PostSummaryResponse};
use crate::models::{CreatePostInput, PageResult, PostQuery, PublishStatus, UpdatePostInput};
use crate::services::ArchiveYear;

static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("valid regex"));

const TITLE_MAX: usize = 255;
const SLUG_MAX: usize = 200;
const SUMMARY_MAX: usize = 500;

/// Query parameters for post listings
#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub tag_id: Option<i64>,
    /// Admin only: status filter (0 = draft, 1 = published)
    #[serde(default)]
    pub status: Option<i64>,
    /// Admin only: neutral creation-time ordering
    #[serde(default)]
    pub ignore_pinned: bool,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

impl ListPostsQuery {
    fn into_query(self) -> Result<PostQuery, ApiError> {
        let status = match self.status {
            Some(raw) => Some(
                PublishStatus::from_i64(raw)
                    .ok_or_else(|| ApiError::bad_request(format!("invalid status: {}", raw)))?,
            ),
            None => None,
        };

        Ok(PostQuery {
            page: self.page.max(1),
            page_size: self.page_size.clamp(1, 100),
            keyword: self.keyword,
            tag_id: self.tag_id,
            status,
            ignore_pinned: self.ignore_pinned,
        })
    }
}

/// Query parameters for the archive
#[derive(Debug, Deserialize)]
pub struct ArchiveQuery {
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub tag_id: Option<i64>,
}

/// Response carrying the id of a newly created post
#[derive(Debug, Serialize)]
pub struct CreatedPostResponse {
    pub id: i64,
}

fn validate_post_fields(title: &str, slug: &str, summary: Option<&str>, content: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::bad_request("post title cannot be empty"));
    }
    if title.chars().count() > TITLE_MAX {
        return Err(ApiError::bad_request("post title is too long"));
    }
    if slug.len() > SLUG_MAX || !SLUG_PATTERN.is_match(slug) {
        return Err(ApiError::bad_request(
            "slug must be lowercase alphanumerics separated by single hyphens",
        ));
    }
    if let Some(summary) = summary {
        if summary.chars().count() > SUMMARY_MAX {
            return Err(ApiError::bad_request("post summary is too long"));
        }
    }
    if content.trim().is_empty() {
        return Err(ApiError::bad_request("post content cannot be empty"));
    }
    Ok(())
}

/// Build the public posts router
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_public_posts))
        .route("/{slug}", get(get_post_by_slug))
}

/// Build the admin posts router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_admin_posts).post(create_post))
        .route(
            "/{id}",
            get(get_post_by_id).put(update_post).delete(delete_post),
        )
}

/// GET /api/v1/posts - public post listing
async fn list_public_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<PageResult<PostSummaryResponse>>, ApiError> {
    let page = state
        .post_service
        .get_public_page(query.into_query()?)
        .await?;
    Ok(Json(page.map(PostSummaryResponse::from)))
}

/// GET /api/v1/posts/{slug} - public post detail, bumps the view counter
async fn get_post_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PostDetailResponse>, ApiError> {
    let detail = state.post_service.get_post_by_slug(&slug).await?;
    Ok(Json(detail.into()))
}

/// GET /api/v1/archive - year/month archive of published posts
pub async fn get_archive(
    State(state): State<AppState>,
    Query(query): Query<ArchiveQuery>,
) -> Result<Json<Vec<ArchiveYear>>, ApiError> {
    let archive = state
        .post_service
        .get_archive(query.keyword, query.tag_id)
        .await?;
    Ok(Json(archive))
}

/// GET /api/v1/admin/posts - admin listing with caller-controlled filters
async fn list_admin_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<PageResult<PostSummaryResponse>>, ApiError> {
    let page = state
        .post_service
        .get_admin_page(&query.into_query()?)
        .await?;
    Ok(Json(page.map(PostSummaryResponse::from)))
}

/// GET /api/v1/admin/posts/{id} - admin detail, no view bump
async fn get_post_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PostDetailResponse>, ApiError> {
    let detail = state.post_service.get_post_by_id(id).await?;
    Ok(Json(detail.into()))
}

/// POST /api/v1/admin/posts - create a post
async fn create_post(
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> Result<Json<CreatedPostResponse>, ApiError> {
    validate_post_fields(
        &input.title,
        &input.slug,
        input.summary.as_deref(),
        &input.content,
    )?;

    let post = state.post_service.create_post(input).await?;
    Ok(Json(CreatedPostResponse { id: post.id }))
}

/// PUT /api/v1/admin/posts/{id} - update a post
async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdatePostInput>,
) -> Result<Json<PostDetailResponse>, ApiError> {
    validate_post_fields(
        &input.title,
        &input.slug,
        input.summary.as_deref(),
        &input.content,
    )?;

    state.post_service.update_post(id, input).await?;
    let detail = state.post_service.get_post_by_id(id).await?;
    Ok(Json(detail.into()))
}

/// DELETE /api/v1/admin/posts/{id} - soft-delete a post
async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.post_service.delete_post(id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
