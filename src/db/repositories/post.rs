//! Post repository
//!
//! Database operations for posts. Multi-statement workflows (create,
//! update, delete) run their post write and link replacement inside one
//! transaction so a failure at any step rolls back the whole call.
//!
//! Soft delete: rows are flagged `is_deleted` rather than removed, and the
//! slug is mangled first so the freed value can be reused by new posts
//! despite the unique index.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::sync::Arc;

use super::post_tag::replace_links_in_tx;
use crate::models::{
    AdjacentDirection, CreatePostInput, PageResult, Post, PostNav, PostQuery, PublishStatus,
    UpdatePostInput,
};

const POST_COLUMNS: &str = "p.id, p.title, p.slug, p.summary, p.content, p.cover_image, \
     p.views, p.read_time, p.is_pinned, p.status, p.create_time, p.update_time";

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a post and its tag links in one transaction
    async fn create(&self, input: &CreatePostInput, read_time: i64) -> Result<Post>;

    /// Get post by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// Get post by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>>;

    /// Check if a slug is taken, optionally ignoring one post (for updates)
    async fn exists_by_slug(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool>;

    /// Filtered, paginated listing.
    ///
    /// `page_size = -1` returns every matching row and skips the count
    /// query. Default ordering is pinned-first then newest-first;
    /// `ignore_pinned` switches to plain newest-first.
    async fn find_page(&self, query: &PostQuery) -> Result<PageResult<Post>>;

    /// Replace a post's editable fields and tag links in one transaction
    async fn update(&self, id: i64, input: &UpdatePostInput, read_time: i64) -> Result<()>;

    /// Delete links, mangle the slug and soft-delete, in one transaction
    async fn delete(&self, id: i64) -> Result<()>;

    /// Atomic `views = views + 1`; must not touch `update_time`
    async fn increment_views(&self, id: i64) -> Result<()>;

    /// Nearest published post strictly before/after the given timestamp
    async fn find_adjacent(
        &self,
        create_time: DateTime<Utc>,
        direction: AdjacentDirection,
    ) -> Result<Option<PostNav>>;

    /// Count non-deleted posts with the given status
    async fn count_by_status(&self, status: PublishStatus) -> Result<i64>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: SqlitePool,
}

impl SqlxPostRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, input: &CreatePostInput, read_time: i64) -> Result<Post> {
        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin post creation transaction")?;

        let result = sqlx::query(
            r#"
            INSERT INTO post (title, slug, summary, content, cover_image, views, read_time, is_pinned, status, is_deleted, create_time, update_time)
            VALUES (?, ?, ?, ?, ?, 0, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.summary)
        .bind(&input.content)
        .bind(&input.cover_image)
        .bind(read_time)
        .bind(input.is_pinned)
        .bind(input.status.as_i64())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .context("Failed to create post")?;

        let id = result.last_insert_rowid();

        replace_links_in_tx(&mut tx, id, &input.tag_ids, now).await?;

        tx.commit()
            .await
            .context("Failed to commit post creation")?;

        Ok(Post {
            id,
            title: input.title.clone(),
            slug: input.slug.clone(),
            summary: input.summary.clone(),
            content: input.content.clone(),
            cover_image: input.cover_image.clone(),
            views: 0,
            read_time,
            is_pinned: input.is_pinned,
            status: input.status,
            create_time: now,
            update_time: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        let query = format!(
            "SELECT {} FROM post p WHERE p.id = ? AND p.is_deleted = 0",
            POST_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get post by ID")?;

        match row {
            Some(row) => Ok(Some(row_to_post(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let query = format!(
            "SELECT {} FROM post p WHERE p.slug = ? AND p.is_deleted = 0",
            POST_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get post by slug")?;

        match row {
            Some(row) => Ok(Some(row_to_post(&row)?)),
            None => Ok(None),
        }
    }

    async fn exists_by_slug(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        let row = match exclude_id {
            Some(id) => sqlx::query(
                "SELECT COUNT(*) as count FROM post WHERE slug = ? AND id != ? AND is_deleted = 0",
            )
            .bind(slug)
            .bind(id)
            .fetch_one(&self.pool)
            .await,
            None => sqlx::query("SELECT COUNT(*) as count FROM post WHERE slug = ? AND is_deleted = 0")
                .bind(slug)
                .fetch_one(&self.pool)
                .await,
        }
        .context("Failed to check post slug existence")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    async fn find_page(&self, query: &PostQuery) -> Result<PageResult<Post>> {
        let mut builder = QueryBuilder::new(format!("SELECT {} FROM post p", POST_COLUMNS));
        push_filters(&mut builder, query);
        if query.ignore_pinned {
            builder.push(" ORDER BY p.create_time DESC");
        } else {
            builder.push(" ORDER BY p.is_pinned DESC, p.create_time DESC");
        }
        if !query.is_unpaged() {
            builder
                .push(" LIMIT ")
                .push_bind(query.page_size)
                .push(" OFFSET ")
                .push_bind(query.offset());
        }

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .context("Failed to query post page")?;

        let mut posts = Vec::new();
        for row in &rows {
            posts.push(row_to_post(row)?);
        }

        // The unpaged path skips the count query; the result set is the total
        let total = if query.is_unpaged() {
            posts.len() as i64
        } else {
            let mut count_builder = QueryBuilder::new("SELECT COUNT(*) as count FROM post p");
            push_filters(&mut count_builder, query);
            let row = count_builder
                .build()
                .fetch_one(&self.pool)
                .await
                .context("Failed to count posts")?;
            row.get("count")
        };

        Ok(PageResult::new(posts, total, query.page_size, query.page))
    }

    async fn update(&self, id: i64, input: &UpdatePostInput, read_time: i64) -> Result<()> {
        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin post update transaction")?;

        let result = sqlx::query(
            r#"
            UPDATE post
            SET title = ?, slug = ?, summary = ?, content = ?, cover_image = ?, read_time = ?, is_pinned = ?, status = ?, update_time = ?
            WHERE id = ? AND is_deleted = 0
            "#,
        )
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.summary)
        .bind(&input.content)
        .bind(&input.cover_image)
        .bind(read_time)
        .bind(input.is_pinned)
        .bind(input.status.as_i64())
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to update post")?;

        if result.rows_affected() == 0 {
            return Err(anyhow!("Post not found for update: {}", id));
        }

        replace_links_in_tx(&mut tx, id, &input.tag_ids, now).await?;

        tx.commit().await.context("Failed to commit post update")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin post deletion transaction")?;

        let row = sqlx::query("SELECT slug FROM post WHERE id = ? AND is_deleted = 0")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to load post for deletion")?
            .ok_or_else(|| anyhow!("Post not found for deletion: {}", id))?;
        let slug: String = row.get("slug");

        sqlx::query("DELETE FROM post_tag WHERE post_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete post-tag links")?;

        // Free the unique index before soft-deleting
        let freed_slug = format!("{}-del-{}", slug, now.timestamp_millis());
        sqlx::query("UPDATE post SET slug = ?, update_time = ? WHERE id = ?")
            .bind(&freed_slug)
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to free post slug")?;

        sqlx::query("UPDATE post SET is_deleted = 1 WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to soft-delete post")?;

        tx.commit()
            .await
            .context("Failed to commit post deletion")?;
        Ok(())
    }

    async fn increment_views(&self, id: i64) -> Result<()> {
        // Single-column atomic bump; update_time is application-managed and
        // stays untouched so "someone read it" never looks like an edit.
        sqlx::query("UPDATE post SET views = views + 1 WHERE id = ? AND is_deleted = 0")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to increment post views")?;
        Ok(())
    }

    async fn find_adjacent(
        &self,
        create_time: DateTime<Utc>,
        direction: AdjacentDirection,
    ) -> Result<Option<PostNav>> {
        let query = match direction {
            AdjacentDirection::Previous => {
                "SELECT id, title, slug FROM post \
                 WHERE is_deleted = 0 AND status = 1 AND create_time < ? \
                 ORDER BY create_time DESC LIMIT 1"
            }
            AdjacentDirection::Next => {
                "SELECT id, title, slug FROM post \
                 WHERE is_deleted = 0 AND status = 1 AND create_time > ? \
                 ORDER BY create_time ASC LIMIT 1"
            }
        };

        let row = sqlx::query(query)
            .bind(create_time)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to find adjacent post")?;

        Ok(row.map(|row| PostNav {
            id: row.get("id"),
            title: row.get("title"),
            slug: row.get("slug"),
        }))
    }

    async fn count_by_status(&self, status: PublishStatus) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM post WHERE is_deleted = 0 AND status = ?")
            .bind(status.as_i64())
            .fetch_one(&self.pool)
            .await
            .context("Failed to count posts by status")?;
        Ok(row.get("count"))
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &PostQuery) {
    if let Some(tag_id) = query.tag_id {
        builder
            .push(" INNER JOIN post_tag pt ON pt.post_id = p.id AND pt.tag_id = ")
            .push_bind(tag_id);
    }
    builder.push(" WHERE p.is_deleted = 0");
    if let Some(keyword) = &query.keyword {
        if !keyword.is_empty() {
            builder
                .push(" AND p.title LIKE ")
                .push_bind(format!("%{}%", keyword));
        }
    }
    if let Some(status) = query.status {
        builder.push(" AND p.status = ").push_bind(status.as_i64());
    }
}

fn row_to_post(row: &sqlx::sqlite::SqliteRow) -> Result<Post> {
    let status_raw: i64 = row.get("status");
    let status = PublishStatus::from_i64(status_raw)
        .ok_or_else(|| anyhow!("Invalid post status: {}", status_raw))?;

    Ok(Post {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        summary: row.get("summary"),
        content: row.get("content"),
        cover_image: row.get("cover_image"),
        views: row.get("views"),
        read_time: row.get("read_time"),
        is_pinned: row.get("is_pinned"),
        status,
        create_time: row.get("create_time"),
        update_time: row.get("update_time"),
    })
}
