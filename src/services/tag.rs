//! Tag service
//!
//! The tag registry: creation, renaming and deletion under the uniqueness
//! and referential-integrity rules, plus the public/admin usage listings.
//! Tags are never created implicitly — a post can only reference ids that
//! already exist.

use std::sync::Arc;

use crate::db::repositories::{PostTagRepository, TagRepository};
use crate::models::{PageResult, Tag, TagWithCount};
use crate::services::error::{ServiceError, ServiceResult};

/// Tag registry service
pub struct TagService {
    tags: Arc<dyn TagRepository>,
    links: Arc<dyn PostTagRepository>,
}

impl TagService {
    pub fn new(tags: Arc<dyn TagRepository>, links: Arc<dyn PostTagRepository>) -> Self {
        Self { tags, links }
    }

    /// Create a tag; the name must not already exist (case-sensitive).
    pub async fn create_tag(&self, name: &str) -> ServiceResult<Tag> {
        if self.tags.get_by_name(name).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "tag already exists: {}",
                name
            )));
        }

        let tag = self.tags.create(name).await?;
        Ok(tag)
    }

    /// Rename a tag in place.
    pub async fn rename_tag(&self, id: i64, name: &str) -> ServiceResult<Tag> {
        let tag = self
            .tags
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("tag not found: {}", id)))?;

        if self.tags.name_taken(name, Some(id)).await? {
            return Err(ServiceError::Conflict(format!(
                "tag name already taken: {}",
                name
            )));
        }

        self.tags.rename(id, name).await?;
        Ok(Tag {
            name: name.to_string(),
            ..tag
        })
    }

    /// Delete a tag. Blocked while any post still references it; the
    /// failure message reports the usage count so the caller can act.
    pub async fn delete_tag(&self, id: i64) -> ServiceResult<()> {
        let tag = self
            .tags
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("tag not found: {}", id)))?;

        let usage = self.links.count_by_tag(id).await?;
        if usage > 0 {
            return Err(ServiceError::Forbidden(format!(
                "cannot delete tag '{}': {} posts still use it",
                tag.name, usage
            )));
        }

        self.tags.delete(id).await?;
        Ok(())
    }

    /// Admin tag page: every tag with its count over all non-deleted posts.
    pub async fn get_admin_page(
        &self,
        page: i64,
        page_size: i64,
    ) -> ServiceResult<PageResult<TagWithCount>> {
        Ok(self.tags.page_with_counts(page, page_size).await?)
    }

    /// Public tag list: counts restricted to published posts.
    pub async fn get_public_list(&self) -> ServiceResult<Vec<TagWithCount>> {
        Ok(self.tags.list_with_counts(true).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::db::repositories::{SqlxPostTagRepository, SqlxTagRepository};
    use sqlx::SqlitePool;

    async fn setup() -> (SqlitePool, TagService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        let service = TagService::new(
            SqlxTagRepository::boxed(pool.clone()),
            SqlxPostTagRepository::boxed(pool.clone()),
        );
        (pool, service)
    }

    async fn insert_post(pool: &SqlitePool, slug: &str, status: i64) -> i64 {
        let result =
            sqlx::query("INSERT INTO post (title, slug, content, status) VALUES (?, ?, 'body', ?)")
                .bind(format!("Title {}", slug))
                .bind(slug)
                .bind(status)
                .execute(pool)
                .await
                .expect("Failed to insert post");
        result.last_insert_rowid()
    }

    async fn link(pool: &SqlitePool, post_id: i64, tag_id: i64) {
        sqlx::query("INSERT INTO post_tag (post_id, tag_id) VALUES (?, ?)")
            .bind(post_id)
            .bind(tag_id)
            .execute(pool)
            .await
            .expect("Failed to link");
    }

    #[tokio::test]
    async fn test_create_tag() {
        let (_pool, service) = setup().await;
        let tag = service.create_tag("rust").await.expect("Failed to create");
        assert!(tag.id > 0);
        assert_eq!(tag.name, "rust");
    }

    #[tokio::test]
    async fn test_create_duplicate_name_conflicts() {
        let (_pool, service) = setup().await;
        service.create_tag("rust").await.unwrap();

        let result = service.create_tag("rust").await;
        assert!(matches!(result, Err(ServiceError::Conflict(_))));

        // Case-sensitive: a different casing is a different tag
        service.create_tag("Rust").await.expect("different casing is allowed");
    }

    #[tokio::test]
    async fn test_rename_tag() {
        let (_pool, service) = setup().await;
        let tag = service.create_tag("rsut").await.unwrap();

        let renamed = service.rename_tag(tag.id, "rust").await.expect("Failed to rename");
        assert_eq!(renamed.name, "rust");
        assert_eq!(renamed.id, tag.id);
    }

    #[tokio::test]
    async fn test_rename_missing_tag() {
        let (_pool, service) = setup().await;
        let result = service.rename_tag(999, "anything").await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_rename_to_taken_name_conflicts() {
        let (_pool, service) = setup().await;
        service.create_tag("rust").await.unwrap();
        let other = service.create_tag("go").await.unwrap();

        let result = service.rename_tag(other.id, "rust").await;
        assert!(matches!(result, Err(ServiceError::Conflict(_))));

        // Renaming to its own current name is a no-op, not a conflict
        service.rename_tag(other.id, "go").await.expect("own name is fine");
    }

    #[tokio::test]
    async fn test_delete_tag_in_use_is_forbidden() {
        let (pool, service) = setup().await;
        let tag = service.create_tag("go").await.unwrap();
        let post = insert_post(&pool, "a", 1).await;
        link(&pool, post, tag.id).await;

        let result = service.delete_tag(tag.id).await;
        match result {
            Err(ServiceError::Forbidden(message)) => {
                assert!(message.contains("go"));
                assert!(message.contains('1'), "message reports the usage count");
            }
            other => panic!("expected Forbidden, got {:?}", other),
        }

        // Once the link is gone the tag can be deleted
        sqlx::query("DELETE FROM post_tag WHERE tag_id = ?")
            .bind(tag.id)
            .execute(&pool)
            .await
            .unwrap();
        service.delete_tag(tag.id).await.expect("delete succeeds once unused");
    }

    #[tokio::test]
    async fn test_delete_missing_tag() {
        let (_pool, service) = setup().await;
        let result = service.delete_tag(424242).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_public_list_counts_published_only() {
        let (pool, service) = setup().await;
        let tag = service.create_tag("rust").await.unwrap();
        let published = insert_post(&pool, "pub", 1).await;
        let draft = insert_post(&pool, "draft", 0).await;
        link(&pool, published, tag.id).await;
        link(&pool, draft, tag.id).await;

        let public = service.get_public_list().await.unwrap();
        assert_eq!(public[0].post_count, 1);

        let admin = service.get_admin_page(1, 10).await.unwrap();
        assert_eq!(admin.records[0].post_count, 2);
    }
}
