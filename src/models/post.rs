//! Post model
//!
//! This module provides:
//! - `Post` entity representing a blog post
//! - `PublishStatus` enum shared by posts, memos and links
//! - Input types for creating and updating posts
//! - Query/filter and pagination types for list queries

use crate::models::tag::TagRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post entity
///
/// Soft-deleted rows never surface here; every query path filters them out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// Post title
    pub title: String,
    /// URL-friendly unique slug
    pub slug: String,
    /// Short summary shown in listings
    pub summary: Option<String>,
    /// Raw markdown content
    pub content: String,
    /// Cover image URL
    pub cover_image: Option<String>,
    /// View counter, only ever incremented
    pub views: i64,
    /// Estimated reading time in minutes, derived from content
    pub read_time: i64,
    /// Whether the post sorts ahead of others in listings
    pub is_pinned: bool,
    /// Publication status
    pub status: PublishStatus,
    /// Creation timestamp
    pub create_time: DateTime<Utc>,
    /// Last content-change timestamp (view increments do not touch this)
    pub update_time: DateTime<Utc>,
}

/// Publication status, stored as an integer: draft = 0, published = 1.
///
/// Links reuse the same encoding with 0 = hidden, 1 = public.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum PublishStatus {
    /// Not visible on public paths
    #[default]
    Draft,
    /// Visible on public paths
    Published,
}

impl PublishStatus {
    /// Database/API integer representation
    pub fn as_i64(&self) -> i64 {
        match self {
            PublishStatus::Draft => 0,
            PublishStatus::Published => 1,
        }
    }

    /// Parse from the integer representation
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(PublishStatus::Draft),
            1 => Some(PublishStatus::Published),
            _ => None,
        }
    }
}

impl From<PublishStatus> for i64 {
    fn from(status: PublishStatus) -> Self {
        status.as_i64()
    }
}

impl TryFrom<i64> for PublishStatus {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        PublishStatus::from_i64(value).ok_or_else(|| format!("invalid publish status: {}", value))
    }
}

/// Input for creating a new post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostInput {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub content: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub status: PublishStatus,
    /// Tag ids to associate; every id must reference an existing tag
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

/// Input for updating an existing post.
///
/// Updates are full replacements of the editable fields, mirroring the
/// create input; the read time is recomputed from the new content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePostInput {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub content: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub status: PublishStatus,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

/// Filter and pagination parameters for post list queries
#[derive(Debug, Clone)]
pub struct PostQuery {
    /// Page number (1-indexed)
    pub page: i64,
    /// Page size; -1 means "all rows, skip the total count query"
    pub page_size: i64,
    /// Substring match on the title
    pub keyword: Option<String>,
    /// Restrict to posts carrying this tag
    pub tag_id: Option<i64>,
    /// Restrict to this status
    pub status: Option<PublishStatus>,
    /// Skip pinned-first ordering and sort purely by creation time
    pub ignore_pinned: bool,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            keyword: None,
            tag_id: None,
            status: None,
            ignore_pinned: false,
        }
    }
}

impl PostQuery {
    /// Whether the query requests the full result set without pagination
    pub fn is_unpaged(&self) -> bool {
        self.page_size == -1
    }

    /// Offset for the database query (zero when unpaged)
    pub fn offset(&self) -> i64 {
        if self.is_unpaged() {
            0
        } else {
            (self.page.max(1) - 1) * self.page_size
        }
    }
}

/// Direction for adjacent-post lookups relative to a reference timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjacentDirection {
    /// Nearest published post strictly older than the reference
    Previous,
    /// Nearest published post strictly newer than the reference
    Next,
}

/// Navigation entry pointing at an adjacent post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostNav {
    pub id: i64,
    pub title: String,
    pub slug: String,
}

/// Post list item with its resolved tags
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub cover_image: Option<String>,
    pub views: i64,
    pub read_time: i64,
    pub is_pinned: bool,
    pub status: PublishStatus,
    pub create_time: DateTime<Utc>,
    pub tags: Vec<TagRef>,
}

impl PostSummary {
    /// Build a summary from a post row; tags are attached by the caller.
    pub fn from_post(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            slug: post.slug,
            summary: post.summary,
            cover_image: post.cover_image,
            views: post.views,
            read_time: post.read_time,
            is_pinned: post.is_pinned,
            status: post.status,
            create_time: post.create_time,
            tags: Vec::new(),
        }
    }
}

/// Full post with tags and (for published posts) adjacent navigation
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub tags: Vec<TagRef>,
    pub previous: Option<PostNav>,
    pub next: Option<PostNav>,
}

/// Paginated result container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult<T> {
    /// Items in the current page
    pub records: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    /// Number of items per page (-1 when unpaged)
    pub page_size: i64,
    /// Current page number (1-indexed)
    pub current_page: i64,
}

impl<T> PageResult<T> {
    /// Create a new paginated result
    pub fn new(records: Vec<T>, total: i64, page_size: i64, current_page: i64) -> Self {
        Self {
            records,
            total,
            page_size,
            current_page,
        }
    }

    /// Map records into a different item type, keeping the page metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            records: self.records.into_iter().map(f).collect(),
            total: self.total,
            page_size: self.page_size,
            current_page: self.current_page,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_status_roundtrip() {
        assert_eq!(PublishStatus::Draft.as_i64(), 0);
        assert_eq!(PublishStatus::Published.as_i64(), 1);
        assert_eq!(PublishStatus::from_i64(0), Some(PublishStatus::Draft));
        assert_eq!(PublishStatus::from_i64(1), Some(PublishStatus::Published));
        assert_eq!(PublishStatus::from_i64(2), None);
    }

    #[test]
    fn test_publish_status_serializes_as_integer() {
        let json = serde_json::to_string(&PublishStatus::Published).unwrap();
        assert_eq!(json, "1");
        let status: PublishStatus = serde_json::from_str("0").unwrap();
        assert_eq!(status, PublishStatus::Draft);
        assert!(serde_json::from_str::<PublishStatus>("7").is_err());
    }

    #[test]
    fn test_post_query_offset() {
        let query = PostQuery::default();
        assert_eq!(query.offset(), 0);

        let query = PostQuery {
            page: 3,
            page_size: 10,
            ..Default::default()
        };
        assert_eq!(query.offset(), 20);

        let unpaged = PostQuery {
            page_size: -1,
            ..Default::default()
        };
        assert!(unpaged.is_unpaged());
        assert_eq!(unpaged.offset(), 0);
    }

    #[test]
    fn test_page_result_map() {
        let page = PageResult::new(vec![1, 2, 3], 3, 10, 1);
        let mapped = page.map(|n| n * 2);
        assert_eq!(mapped.records, vec![2, 4, 6]);
        assert_eq!(mapped.total, 3);
        assert_eq!(mapped.current_page, 1);
    }
}
