//! Post service
//!
//! Implements the post workflows: create, update, delete, detail and page
//! queries, and the chronological archive. Validation is fail-fast — slug
//! and tag checks both run before any write, and the repositories wrap the
//! writes themselves in transactions so a failed step never leaves a
//! partial post behind.

use std::collections::HashMap;
use std::sync::Arc;

use crate::db::repositories::{PostRepository, PostTagRepository, TagRepository};
use crate::models::{
    AdjacentDirection, CreatePostInput, PageResult, Post, PostDetail, PostQuery, PostSummary,
    PublishStatus, TagRef, UpdatePostInput,
};
use crate::services::archive::{build_archive, ArchiveYear};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::read_time::estimate_minutes;

/// Post service coordinating repositories and the derived views
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    tags: Arc<dyn TagRepository>,
    links: Arc<dyn PostTagRepository>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        tags: Arc<dyn TagRepository>,
        links: Arc<dyn PostTagRepository>,
    ) -> Self {
        Self { posts, tags, links }
    }

    /// Create a new post.
    ///
    /// Checks slug uniqueness and tag validity before writing anything;
    /// the insert and link replacement then run in one transaction.
    pub async fn create_post(&self, input: CreatePostInput) -> ServiceResult<Post> {
        if self.posts.exists_by_slug(&input.slug, None).await? {
            return Err(ServiceError::Conflict(format!(
                "post slug already taken: {}",
                input.slug
            )));
        }

        self.validate_tag_ids(&input.tag_ids).await?;

        let read_time = estimate_minutes(&input.content);
        let post = self.posts.create(&input, read_time).await?;

        tracing::info!(post_id = post.id, slug = %post.slug, "Post created");
        Ok(post)
    }

    /// Update a post, replacing its editable fields and tag links.
    pub async fn update_post(&self, id: i64, input: UpdatePostInput) -> ServiceResult<()> {
        if self.posts.get_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("post not found: {}", id)));
        }

        if self.posts.exists_by_slug(&input.slug, Some(id)).await? {
            return Err(ServiceError::Conflict(format!(
                "post slug already taken: {}",
                input.slug
            )));
        }

        self.validate_tag_ids(&input.tag_ids).await?;

        let read_time = estimate_minutes(&input.content);
        self.posts.update(id, &input, read_time).await?;
        Ok(())
    }

    /// Soft-delete a post, removing its links and freeing its slug.
    pub async fn delete_post(&self, id: i64) -> ServiceResult<()> {
        if self.posts.get_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("post not found: {}", id)));
        }

        self.posts.delete(id).await?;
        tracing::info!(post_id = id, "Post deleted");
        Ok(())
    }

    /// Admin detail lookup by id. Does not touch the view counter.
    pub async fn get_post_by_id(&self, id: i64) -> ServiceResult<PostDetail> {
        let post = self
            .posts
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("post not found: {}", id)))?;

        self.build_detail(post).await
    }

    /// Public detail lookup by slug.
    ///
    /// Drafts are invisible here even with a known slug. Bumps the view
    /// counter atomically; the returned row reflects the pre-increment
    /// value, the bump is visible to subsequent readers.
    pub async fn get_post_by_slug(&self, slug: &str) -> ServiceResult<PostDetail> {
        let post = self.posts.get_by_slug(slug).await?;
        let post = match post {
            Some(post) if post.status == PublishStatus::Published => post,
            _ => {
                return Err(ServiceError::NotFound(format!(
                    "post not found or unpublished: {}",
                    slug
                )))
            }
        };

        self.posts.increment_views(post.id).await?;

        self.build_detail(post).await
    }

    /// Admin page query honouring the caller's status and ordering flags.
    pub async fn get_admin_page(&self, query: &PostQuery) -> ServiceResult<PageResult<PostSummary>> {
        let page = self.posts.find_page(query).await?;
        self.attach_tags(page).await
    }

    /// Public page query: published posts only, pinned-first ordering.
    pub async fn get_public_page(&self, query: PostQuery) -> ServiceResult<PageResult<PostSummary>> {
        let query = PostQuery {
            status: Some(PublishStatus::Published),
            ignore_pinned: false,
            ..query
        };
        self.get_admin_page(&query).await
    }

    /// Build the year/month archive over published posts matching the
    /// optional keyword and tag filters.
    pub async fn get_archive(
        &self,
        keyword: Option<String>,
        tag_id: Option<i64>,
    ) -> ServiceResult<Vec<ArchiveYear>> {
        let query = PostQuery {
            page: 1,
            page_size: -1,
            keyword,
            tag_id,
            status: Some(PublishStatus::Published),
            ignore_pinned: false,
        };

        let page = self.get_admin_page(&query).await?;
        Ok(build_archive(page.records))
    }

    /// Fail-fast validation that every referenced tag id exists.
    ///
    /// Ids are deduplicated first so a repeated id cannot skew the count
    /// comparison.
    async fn validate_tag_ids(&self, tag_ids: &[i64]) -> ServiceResult<()> {
        if tag_ids.is_empty() {
            return Ok(());
        }

        let mut distinct: Vec<i64> = Vec::new();
        for &id in tag_ids {
            if !distinct.contains(&id) {
                distinct.push(id);
            }
        }

        let found = self.tags.count_existing(&distinct).await?;
        if found != distinct.len() as i64 {
            return Err(ServiceError::BadRequest(
                "post references nonexistent tags".to_string(),
            ));
        }
        Ok(())
    }

    /// Attach tag lists to a page of posts with one batch query.
    async fn attach_tags(&self, page: PageResult<Post>) -> ServiceResult<PageResult<PostSummary>> {
        if page.is_empty() {
            return Ok(page.map(PostSummary::from_post));
        }

        let post_ids: Vec<i64> = page.records.iter().map(|post| post.id).collect();
        let links = self.links.links_for_posts(&post_ids).await?;

        let mut tags_by_post: HashMap<i64, Vec<TagRef>> = HashMap::new();
        for link in links {
            tags_by_post.entry(link.post_id).or_default().push(TagRef {
                id: link.tag_id,
                name: link.tag_name,
            });
        }

        Ok(page.map(|post| {
            let mut summary = PostSummary::from_post(post);
            summary.tags = tags_by_post.remove(&summary.id).unwrap_or_default();
            summary
        }))
    }

    /// Assemble a detail response: tags always, previous/next navigation
    /// only for published posts.
    async fn build_detail(&self, post: Post) -> ServiceResult<PostDetail> {
        let tags = self.tags.find_by_post(post.id).await?;

        let (previous, next) = if post.status == PublishStatus::Published {
            (
                self.posts
                    .find_adjacent(post.create_time, AdjacentDirection::Previous)
                    .await?,
                self.posts
                    .find_adjacent(post.create_time, AdjacentDirection::Next)
                    .await?,
            )
        } else {
            (None, None)
        };

        Ok(PostDetail {
            post,
            tags,
            previous,
            next,
        })
    }
}
