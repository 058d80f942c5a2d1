//! Memo repository
//!
//! Database operations for memos. Memos follow the post conventions for
//! status, pinning and soft deletion, without slugs or tags.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{Datelike, TimeZone, Utc};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::{Memo, MemoInput, MemoStats, PageResult, PublishStatus};

/// Memo repository trait
#[async_trait]
pub trait MemoRepository: Send + Sync {
    /// Insert a new memo
    async fn create(&self, input: &MemoInput) -> Result<Memo>;

    /// Get memo by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Memo>>;

    /// Replace a memo's fields
    async fn update(&self, id: i64, input: &MemoInput) -> Result<()>;

    /// Soft-delete a memo
    async fn delete(&self, id: i64) -> Result<()>;

    /// Paged listing, pinned first then newest first
    async fn find_page(
        &self,
        page: i64,
        page_size: i64,
        status: Option<PublishStatus>,
    ) -> Result<PageResult<Memo>>;

    /// Count non-deleted memos with the given status
    async fn count_by_status(&self, status: PublishStatus) -> Result<i64>;

    /// Aggregate statistics over published memos
    async fn stats(&self) -> Result<MemoStats>;
}

/// SQLx-based memo repository implementation
pub struct SqlxMemoRepository {
    pool: SqlitePool,
}

impl SqlxMemoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn MemoRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl MemoRepository for SqlxMemoRepository {
    async fn create(&self, input: &MemoInput) -> Result<Memo> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO memo (content, is_pinned, status, is_deleted, create_time, update_time)
            VALUES (?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(&input.content)
        .bind(input.is_pinned)
        .bind(input.status.as_i64())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create memo")?;

        Ok(Memo {
            id: result.last_insert_rowid(),
            content: input.content.clone(),
            is_pinned: input.is_pinned,
            status: input.status,
            create_time: now,
            update_time: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Memo>> {
        let row = sqlx::query(
            "SELECT id, content, is_pinned, status, create_time, update_time FROM memo WHERE id = ? AND is_deleted = 0",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get memo by ID")?;

        match row {
            Some(row) => Ok(Some(row_to_memo(&row)?)),
            None => Ok(None),
        }
    }

    async fn update(&self, id: i64, input: &MemoInput) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE memo
            SET content = ?, is_pinned = ?, status = ?, update_time = ?
            WHERE id = ? AND is_deleted = 0
            "#,
        )
        .bind(&input.content)
        .bind(input.is_pinned)
        .bind(input.status.as_i64())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update memo")?;

        if result.rows_affected() == 0 {
            return Err(anyhow!("Memo not found for update: {}", id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE memo SET is_deleted = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete memo")?;
        Ok(())
    }

    async fn find_page(
        &self,
        page: i64,
        page_size: i64,
        status: Option<PublishStatus>,
    ) -> Result<PageResult<Memo>> {
        let page = page.max(1);
        let offset = (page - 1) * page_size;

        let (rows, count_row) = match status {
            Some(status) => {
                let rows = sqlx::query(
                    r#"
                    SELECT id, content, is_pinned, status, create_time, update_time
                    FROM memo
                    WHERE is_deleted = 0 AND status = ?
                    ORDER BY is_pinned DESC, create_time DESC
                    LIMIT ? OFFSET ?
                    "#,
                )
                .bind(status.as_i64())
                .bind(page_size)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
                .context("Failed to list memos")?;

                let count = sqlx::query("SELECT COUNT(*) as count FROM memo WHERE is_deleted = 0 AND status = ?")
                    .bind(status.as_i64())
                    .fetch_one(&self.pool)
                    .await
                    .context("Failed to count memos")?;
                (rows, count)
            }
            None => {
                let rows = sqlx::query(
                    r#"
                    SELECT id, content, is_pinned, status, create_time, update_time
                    FROM memo
                    WHERE is_deleted = 0
                    ORDER BY is_pinned DESC, create_time DESC
                    LIMIT ? OFFSET ?
                    "#,
                )
                .bind(page_size)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
                .context("Failed to list memos")?;

                let count = sqlx::query("SELECT COUNT(*) as count FROM memo WHERE is_deleted = 0")
                    .fetch_one(&self.pool)
                    .await
                    .context("Failed to count memos")?;
                (rows, count)
            }
        };

        let mut memos = Vec::new();
        for row in &rows {
            memos.push(row_to_memo(row)?);
        }
        let total: i64 = count_row.get("count");

        Ok(PageResult::new(memos, total, page_size, page))
    }

    async fn count_by_status(&self, status: PublishStatus) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM memo WHERE is_deleted = 0 AND status = ?")
            .bind(status.as_i64())
            .fetch_one(&self.pool)
            .await
            .context("Failed to count memos by status")?;
        Ok(row.get("count"))
    }

    async fn stats(&self) -> Result<MemoStats> {
        let now = Utc::now();
        let month_start = Utc
            .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
            .single()
            .ok_or_else(|| anyhow!("Failed to compute month start"))?;

        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) as total_count,
                COALESCE(SUM(LENGTH(content)), 0) as total_chars,
                COALESCE(SUM(CASE WHEN create_time >= ? THEN 1 ELSE 0 END), 0) as this_month_count,
                MAX(create_time) as latest_time
            FROM memo
            WHERE is_deleted = 0 AND status = 1
            "#,
        )
        .bind(month_start)
        .fetch_one(&self.pool)
        .await
        .context("Failed to compute memo stats")?;

        Ok(MemoStats {
            total_count: row.get("total_count"),
            total_chars: row.get("total_chars"),
            this_month_count: row.get("this_month_count"),
            latest_time: row.try_get("latest_time").ok(),
        })
    }
}

fn row_to_memo(row: &sqlx::sqlite::SqliteRow) -> Result<Memo> {
    let status_raw: i64 = row.get("status");
    let status = PublishStatus::from_i64(status_raw)
        .ok_or_else(|| anyhow!("Invalid memo status: {}", status_raw))?;

    Ok(Memo {
        id: row.get("id"),
        content: row.get("content"),
        is_pinned: row.get("is_pinned"),
        status,
        create_time: row.get("create_time"),
        update_time: row.get("update_time"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    async fn setup() -> SqlxMemoRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        SqlxMemoRepository::new(pool)
    }

    fn memo(content: &str, status: PublishStatus) -> MemoInput {
        MemoInput {
            content: content.to_string(),
            is_pinned: false,
            status,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = setup().await;
        let created = repo
            .create(&memo("hello", PublishStatus::Published))
            .await
            .expect("Failed to create memo");

        let found = repo.get_by_id(created.id).await.unwrap().expect("Memo not found");
        assert_eq!(found.content, "hello");
        assert_eq!(found.status, PublishStatus::Published);
    }

    #[tokio::test]
    async fn test_update_memo() {
        let repo = setup().await;
        let created = repo.create(&memo("before", PublishStatus::Draft)).await.unwrap();

        repo.update(created.id, &memo("after", PublishStatus::Published))
            .await
            .expect("Failed to update");

        let found = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.content, "after");
        assert_eq!(found.status, PublishStatus::Published);
    }

    #[tokio::test]
    async fn test_update_missing_memo_errors() {
        let repo = setup().await;
        let result = repo.update(9999, &memo("x", PublishStatus::Draft)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_soft_delete_hides_memo() {
        let repo = setup().await;
        let created = repo.create(&memo("gone", PublishStatus::Published)).await.unwrap();

        repo.delete(created.id).await.expect("Failed to delete");
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_page_filters_status_and_pins_first() {
        let repo = setup().await;
        repo.create(&memo("draft", PublishStatus::Draft)).await.unwrap();
        repo.create(&memo("old", PublishStatus::Published)).await.unwrap();
        tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
        let pinned = MemoInput {
            content: "pinned".to_string(),
            is_pinned: true,
            status: PublishStatus::Published,
        };
        repo.create(&pinned).await.unwrap();

        let page = repo
            .find_page(1, 10, Some(PublishStatus::Published))
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.records[0].content, "pinned");

        let all = repo.find_page(1, 10, None).await.unwrap();
        assert_eq!(all.total, 3);
    }

    #[tokio::test]
    async fn test_stats_over_published_memos() {
        let repo = setup().await;
        repo.create(&memo("abcd", PublishStatus::Published)).await.unwrap();
        repo.create(&memo("efgh", PublishStatus::Published)).await.unwrap();
        repo.create(&memo("draft-memo", PublishStatus::Draft)).await.unwrap();

        let stats = repo.stats().await.expect("Failed to compute stats");
        assert_eq!(stats.total_count, 2);
        assert_eq!(stats.total_chars, 8);
        assert_eq!(stats.this_month_count, 2);
        assert!(stats.latest_time.is_some());
    }

    #[tokio::test]
    async fn test_stats_empty() {
        let repo = setup().await;
        let stats = repo.stats().await.expect("Failed to compute stats");
        assert_eq!(stats.total_count, 0);
        assert_eq!(stats.total_chars, 0);
        assert!(stats.latest_time.is_none());
    }
}
