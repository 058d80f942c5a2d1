//! Tag repository
//!
//! Database operations for tags, including the usage-count joins that back
//! the public tag list and the admin tag page.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Row, SqlitePool};
use std::sync::Arc;

use crate::models::{PageResult, Tag, TagRef, TagWithCount};

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Insert a new tag
    async fn create(&self, name: &str) -> Result<Tag>;

    /// Get tag by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>>;

    /// Get tag by exact name (case-sensitive)
    async fn get_by_name(&self, name: &str) -> Result<Option<Tag>>;

    /// Check whether a name is already owned by another tag
    async fn name_taken(&self, name: &str, exclude_id: Option<i64>) -> Result<bool>;

    /// Update a tag's name in place
    async fn rename(&self, id: i64, name: &str) -> Result<()>;

    /// Delete a tag row
    async fn delete(&self, id: i64) -> Result<()>;

    /// Count how many of the given distinct ids exist in the tag table
    async fn count_existing(&self, ids: &[i64]) -> Result<i64>;

    /// Total number of tags
    async fn count_all(&self) -> Result<i64>;

    /// Number of tags referenced by at least one published post
    async fn count_used(&self) -> Result<i64>;

    /// All tags with per-tag post counts.
    ///
    /// `published_only` selects the public variant (counting published
    /// posts only); the admin variant counts every non-deleted post.
    async fn list_with_counts(&self, published_only: bool) -> Result<Vec<TagWithCount>>;

    /// Paged variant of the admin tag list
    async fn page_with_counts(&self, page: i64, page_size: i64) -> Result<PageResult<TagWithCount>>;

    /// Tags associated with one post
    async fn find_by_post(&self, post_id: i64) -> Result<Vec<TagRef>>;
}

/// SQLx-based tag repository implementation
pub struct SqlxTagRepository {
    pool: SqlitePool,
}

impl SqlxTagRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn create(&self, name: &str) -> Result<Tag> {
        let now = Utc::now();

        let result = sqlx::query("INSERT INTO tag (name, create_time, update_time) VALUES (?, ?, ?)")
            .bind(name)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await
            .context("Failed to create tag")?;

        Ok(Tag {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            create_time: now,
            update_time: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, name, create_time, update_time FROM tag WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get tag by ID")?;

        match row {
            Some(row) => Ok(Some(row_to_tag(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, name, create_time, update_time FROM tag WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get tag by name")?;

        match row {
            Some(row) => Ok(Some(row_to_tag(&row)?)),
            None => Ok(None),
        }
    }

    async fn name_taken(&self, name: &str, exclude_id: Option<i64>) -> Result<bool> {
        let row = match exclude_id {
            Some(id) => sqlx::query("SELECT COUNT(*) as count FROM tag WHERE name = ? AND id != ?")
                .bind(name)
                .bind(id)
                .fetch_one(&self.pool)
                .await,
            None => sqlx::query("SELECT COUNT(*) as count FROM tag WHERE name = ?")
                .bind(name)
                .fetch_one(&self.pool)
                .await,
        }
        .context("Failed to check tag name")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    async fn rename(&self, id: i64, name: &str) -> Result<()> {
        sqlx::query("UPDATE tag SET name = ?, update_time = ? WHERE id = ?")
            .bind(name)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to rename tag")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM tag WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete tag")?;
        Ok(())
    }

    async fn count_existing(&self, ids: &[i64]) -> Result<i64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::new("SELECT COUNT(*) as count FROM tag WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        builder.push(")");

        let row = builder
            .build()
            .fetch_one(&self.pool)
            .await
            .context("Failed to count existing tags")?;

        Ok(row.get("count"))
    }

    async fn count_all(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM tag")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count tags")?;
        Ok(row.get("count"))
    }

    async fn count_used(&self) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(DISTINCT t.id) as count
            FROM tag t
            INNER JOIN post_tag pt ON pt.tag_id = t.id
            INNER JOIN post p ON p.id = pt.post_id AND p.is_deleted = 0 AND p.status = 1
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to count used tags")?;
        Ok(row.get("count"))
    }

    async fn list_with_counts(&self, published_only: bool) -> Result<Vec<TagWithCount>> {
        let query = if published_only {
            r#"
            SELECT t.id, t.name, COUNT(p.id) as post_count
            FROM tag t
            LEFT JOIN post_tag pt ON pt.tag_id = t.id
            LEFT JOIN post p ON p.id = pt.post_id AND p.is_deleted = 0 AND p.status = 1
            GROUP BY t.id, t.name
            ORDER BY post_count DESC, t.name ASC
            "#
        } else {
            r#"
            SELECT t.id, t.name, COUNT(p.id) as post_count
            FROM tag t
            LEFT JOIN post_tag pt ON pt.tag_id = t.id
            LEFT JOIN post p ON p.id = pt.post_id AND p.is_deleted = 0
            GROUP BY t.id, t.name
            ORDER BY post_count DESC, t.name ASC
            "#
        };

        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list tags with counts")?;

        Ok(rows.iter().map(row_to_tag_with_count).collect())
    }

    async fn page_with_counts(&self, page: i64, page_size: i64) -> Result<PageResult<TagWithCount>> {
        let page = page.max(1);
        let offset = (page - 1) * page_size;

        let rows = sqlx::query(
            r#"
            SELECT t.id, t.name, COUNT(p.id) as post_count
            FROM tag t
            LEFT JOIN post_tag pt ON pt.tag_id = t.id
            LEFT JOIN post p ON p.id = pt.post_id AND p.is_deleted = 0
            GROUP BY t.id, t.name
            ORDER BY post_count DESC, t.name ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(page_size)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("Failed to page tags with counts")?;

        let total = self.count_all().await?;
        let records = rows.iter().map(row_to_tag_with_count).collect();

        Ok(PageResult::new(records, total, page_size, page))
    }

    async fn find_by_post(&self, post_id: i64) -> Result<Vec<TagRef>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.name
            FROM tag t
            INNER JOIN post_tag pt ON pt.tag_id = t.id
            WHERE pt.post_id = ?
            ORDER BY t.name
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to get tags by post")?;

        Ok(rows
            .iter()
            .map(|row| TagRef {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }
}

fn row_to_tag(row: &sqlx::sqlite::SqliteRow) -> Result<Tag> {
    Ok(Tag {
        id: row.get("id"),
        name: row.get("name"),
        create_time: row.get("create_time"),
        update_time: row.get("update_time"),
    })
}

fn row_to_tag_with_count(row: &sqlx::sqlite::SqliteRow) -> TagWithCount {
    TagWithCount {
        id: row.get("id"),
        name: row.get("name"),
        post_count: row.get("post_count"),
    }
}
