//! Post-tag link repository
//!
//! The association table abstraction. Links are only ever mutated as a
//! batch keyed by post id: `replace_links` deletes every existing link for
//! the post, deduplicates the incoming tag ids and bulk-inserts the rest.
//! The same replacement logic is exposed at transaction level so the post
//! workflows can run it atomically with their own writes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool, Transaction};
use std::sync::Arc;

/// One post-to-tag association joined with the tag name, for batch
/// assembly of N posts' tag lists in a single query.
#[derive(Debug, Clone)]
pub struct PostTagLink {
    pub post_id: i64,
    pub tag_id: i64,
    pub tag_name: String,
}

/// Post-tag link repository trait
#[async_trait]
pub trait PostTagRepository: Send + Sync {
    /// Replace all links for a post with the given tag ids.
    ///
    /// Duplicate ids are collapsed; an empty list removes every link.
    async fn replace_links(&self, post_id: i64, tag_ids: &[i64]) -> Result<()>;

    /// Count links referencing a tag
    async fn count_by_tag(&self, tag_id: i64) -> Result<i64>;

    /// Batch lookup of (post_id, tag_id, tag_name) tuples for the given posts
    async fn links_for_posts(&self, post_ids: &[i64]) -> Result<Vec<PostTagLink>>;
}

/// SQLx-based post-tag link repository implementation
pub struct SqlxPostTagRepository {
    pool: SqlitePool,
}

impl SqlxPostTagRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn PostTagRepository> {
        Arc::new(Self::new(pool))
    }
}

/// Full-replace link synchronization inside an existing transaction.
///
/// Delete-all-then-insert-distinct: the end state depends only on the
/// incoming id set, so calling this twice with the same ids is idempotent.
pub(crate) async fn replace_links_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    post_id: i64,
    tag_ids: &[i64],
    now: DateTime<Utc>,
) -> Result<()> {
    sqlx::query("DELETE FROM post_tag WHERE post_id = ?")
        .bind(post_id)
        .execute(&mut **tx)
        .await
        .context("Failed to delete existing post-tag links")?;

    if tag_ids.is_empty() {
        return Ok(());
    }

    // Dedup preserving order; callers may pass repeated ids
    let mut unique: Vec<i64> = Vec::new();
    for &tag_id in tag_ids {
        if !unique.contains(&tag_id) {
            unique.push(tag_id);
        }
    }

    for tag_id in unique {
        sqlx::query("INSERT INTO post_tag (post_id, tag_id, create_time) VALUES (?, ?, ?)")
            .bind(post_id)
            .bind(tag_id)
            .bind(now)
            .execute(&mut **tx)
            .await
            .context("Failed to insert post-tag link")?;
    }

    Ok(())
}

#[async_trait]
impl PostTagRepository for SqlxPostTagRepository {
    async fn replace_links(&self, post_id: i64, tag_ids: &[i64]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin link replacement transaction")?;

        replace_links_in_tx(&mut tx, post_id, tag_ids, Utc::now()).await?;

        tx.commit()
            .await
            .context("Failed to commit link replacement")?;
        Ok(())
    }

    async fn count_by_tag(&self, tag_id: i64) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM post_tag WHERE tag_id = ?")
            .bind(tag_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count links by tag")?;

        Ok(row.get("count"))
    }

    async fn links_for_posts(&self, post_ids: &[i64]) -> Result<Vec<PostTagLink>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::new(
            r#"
            SELECT pt.post_id, pt.tag_id, t.name as tag_name
            FROM post_tag pt
            INNER JOIN tag t ON t.id = pt.tag_id
            WHERE pt.post_id IN (
            "#,
        );
        let mut separated = builder.separated(", ");
        for id in post_ids {
            separated.push_bind(*id);
        }
        builder.push(") ORDER BY pt.post_id, t.name");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .context("Failed to query links for posts")?;

        Ok(rows
            .iter()
            .map(|row| PostTagLink {
                post_id: row.get("post_id"),
                tag_id: row.get("tag_id"),
                tag_name: row.get("tag_name"),
            })
            .collect())
    }
}
