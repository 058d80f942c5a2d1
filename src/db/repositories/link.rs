//! Friend link repository
//!
//! Plain CRUD over the link table. Links are hard-deleted; they carry no
//! history worth preserving.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::{Link, LinkInput, PublishStatus};

/// Friend link repository trait
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Insert a new link
    async fn create(&self, input: &LinkInput) -> Result<Link>;

    /// Get link by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Link>>;

    /// Replace a link's fields
    async fn update(&self, id: i64, input: &LinkInput) -> Result<()>;

    /// Remove a link row
    async fn delete(&self, id: i64) -> Result<()>;

    /// List links, optionally restricted to public ones
    async fn list(&self, public_only: bool) -> Result<Vec<Link>>;

    /// Count links with the given status
    async fn count_by_status(&self, status: PublishStatus) -> Result<i64>;
}

/// SQLx-based link repository implementation
pub struct SqlxLinkRepository {
    pool: SqlitePool,
}

impl SqlxLinkRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn LinkRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl LinkRepository for SqlxLinkRepository {
    async fn create(&self, input: &LinkInput) -> Result<Link> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO link (name, url, avatar, description, status, create_time, update_time)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.name)
        .bind(&input.url)
        .bind(&input.avatar)
        .bind(&input.description)
        .bind(input.status.as_i64())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create link")?;

        Ok(Link {
            id: result.last_insert_rowid(),
            name: input.name.clone(),
            url: input.url.clone(),
            avatar: input.avatar.clone(),
            description: input.description.clone(),
            status: input.status,
            create_time: now,
            update_time: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Link>> {
        let row = sqlx::query(
            "SELECT id, name, url, avatar, description, status, create_time, update_time FROM link WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get link by ID")?;

        match row {
            Some(row) => Ok(Some(row_to_link(&row)?)),
            None => Ok(None),
        }
    }

    async fn update(&self, id: i64, input: &LinkInput) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE link
            SET name = ?, url = ?, avatar = ?, description = ?, status = ?, update_time = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.name)
        .bind(&input.url)
        .bind(&input.avatar)
        .bind(&input.description)
        .bind(input.status.as_i64())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update link")?;

        if result.rows_affected() == 0 {
            return Err(anyhow!("Link not found for update: {}", id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM link WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete link")?;
        Ok(())
    }

    async fn list(&self, public_only: bool) -> Result<Vec<Link>> {
        let query = if public_only {
            "SELECT id, name, url, avatar, description, status, create_time, update_time \
             FROM link WHERE status = 1 ORDER BY create_time ASC"
        } else {
            "SELECT id, name, url, avatar, description, status, create_time, update_time \
             FROM link ORDER BY create_time ASC"
        };

        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list links")?;

        let mut links = Vec::new();
        for row in &rows {
            links.push(row_to_link(row)?);
        }
        Ok(links)
    }

    async fn count_by_status(&self, status: PublishStatus) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM link WHERE status = ?")
            .bind(status.as_i64())
            .fetch_one(&self.pool)
            .await
            .context("Failed to count links by status")?;
        Ok(row.get("count"))
    }
}

fn row_to_link(row: &sqlx::sqlite::SqliteRow) -> Result<Link> {
    let status_raw: i64 = row.get("status");
    let status = PublishStatus::from_i64(status_raw)
        .ok_or_else(|| anyhow!("Invalid link status: {}", status_raw))?;

    Ok(Link {
        id: row.get("id"),
        name: row.get("name"),
        url: row.get("url"),
        avatar: row.get("avatar"),
        description: row.get("description"),
        status,
        create_time: row.get("create_time"),
        update_time: row.get("update_time"),
    })
}
