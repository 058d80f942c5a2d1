//! Shared API response types
//!
//! Response DTOs for the post endpoints. Timestamps are rendered as
//! RFC 3339 strings and statuses as the 0/1 integers of the storage
//! schema.

use serde::Serialize;

use crate::models::{PostDetail, PostNav, PostSummary, TagRef};

/// Full post response used by the detail endpoints
#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: String,
    pub cover_image: Option<String>,
    pub views: i64,
    pub read_time: i64,
    pub is_pinned: bool,
    pub status: i64,
    pub create_time: String,
    pub update_time: String,
    pub tags: Vec<TagRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<PostNav>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PostNav>,
}

impl From<PostDetail> for PostDetailResponse {
    fn from(detail: PostDetail) -> Self {
        let post = detail.post;
        Self {
            id: post.id,
            title: post.title,
            slug: post.slug,
            summary: post.summary,
            content: post.content,
            cover_image: post.cover_image,
            views: post.views,
            read_time: post.read_time,
            is_pinned: post.is_pinned,
            status: post.status.as_i64(),
            create_time: post.create_time.to_rfc3339(),
            update_time: post.update_time.to_rfc3339(),
            tags: detail.tags,
            previous: detail.previous,
            next: detail.next,
        }
    }
}

/// Simplified post response for list views
#[derive(Debug, Serialize)]
pub struct PostSummaryResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub cover_image: Option<String>,
    pub views: i64,
    pub read_time: i64,
    pub is_pinned: bool,
    pub status: i64,
    pub create_time: String,
    pub tags: Vec<TagRef>,
}

impl From<PostSummary> for PostSummaryResponse {
    fn from(summary: PostSummary) -> Self {
        Self {
            id: summary.id,
            title: summary.title,
            slug: summary.slug,
            summary: summary.summary,
            cover_image: summary.cover_image,
            views: summary.views,
            read_time: summary.read_time,
            is_pinned: summary.is_pinned,
            status: summary.status.as_i64(),
            create_time: summary.create_time.to_rfc3339(),
            tags: summary.tags,
        }
    }
}
