//! Site overview service
//!
//! Aggregates the owner profile and content statistics for the public
//! about/overview endpoint. Everything here is a read-only view over live
//! data.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::repositories::{LinkRepository, MemoRepository, PostRepository, TagRepository, UserRepository};
use crate::models::PublishStatus;
use crate::services::error::{ServiceError, ServiceResult};

/// Owner profile as shown publicly
#[derive(Debug, Clone, Serialize)]
pub struct OwnerInfo {
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    /// Site age is measured from the owner account's creation
    pub since: DateTime<Utc>,
}

/// Content counters for the overview
#[derive(Debug, Clone, Serialize)]
pub struct SiteStats {
    pub published_post_count: i64,
    pub draft_post_count: i64,
    /// Tags referenced by at least one published post
    pub used_tag_count: i64,
    pub unused_tag_count: i64,
    pub published_memo_count: i64,
    pub draft_memo_count: i64,
    pub public_link_count: i64,
    pub hidden_link_count: i64,
}

/// Owner profile plus site statistics
#[derive(Debug, Clone, Serialize)]
pub struct SiteOverview {
    pub owner: OwnerInfo,
    pub stats: SiteStats,
}

/// Site overview service
pub struct SiteService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    tags: Arc<dyn TagRepository>,
    memos: Arc<dyn MemoRepository>,
    links: Arc<dyn LinkRepository>,
}

impl SiteService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        tags: Arc<dyn TagRepository>,
        memos: Arc<dyn MemoRepository>,
        links: Arc<dyn LinkRepository>,
    ) -> Self {
        Self {
            users,
            posts,
            tags,
            memos,
            links,
        }
    }

    pub async fn get_overview(&self) -> ServiceResult<SiteOverview> {
        let owner = self
            .users
            .find_owner()
            .await?
            .ok_or_else(|| ServiceError::NotFound("site is not initialized".to_string()))?;

        let total_tags = self.tags.count_all().await?;
        let used_tags = self.tags.count_used().await?;

        let stats = SiteStats {
            published_post_count: self.posts.count_by_status(PublishStatus::Published).await?,
            draft_post_count: self.posts.count_by_status(PublishStatus::Draft).await?,
            used_tag_count: used_tags,
            unused_tag_count: total_tags - used_tags,
            published_memo_count: self.memos.count_by_status(PublishStatus::Published).await?,
            draft_memo_count: self.memos.count_by_status(PublishStatus::Draft).await?,
            public_link_count: self.links.count_by_status(PublishStatus::Published).await?,
            hidden_link_count: self.links.count_by_status(PublishStatus::Draft).await?,
        };

        Ok(SiteOverview {
            owner: OwnerInfo {
                nickname: owner.nickname,
                avatar: owner.avatar,
                bio: owner.bio,
                since: owner.create_time,
            },
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::db::repositories::{
        SqlxLinkRepository, SqlxMemoRepository, SqlxPostRepository, SqlxTagRepository,
        SqlxUserRepository,
    };
    use sqlx::SqlitePool;

    async fn setup() -> (SqlitePool, SiteService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        let service = SiteService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxPostRepository::boxed(pool.clone()),
            SqlxTagRepository::boxed(pool.clone()),
            SqlxMemoRepository::boxed(pool.clone()),
            SqlxLinkRepository::boxed(pool.clone()),
        );
        (pool, service)
    }

    #[tokio::test]
    async fn test_overview_before_setup_is_not_found() {
        let (_pool, service) = setup().await;
        let result = service.get_overview().await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_overview_counts() {
        let (pool, service) = setup().await;

        sqlx::query("INSERT INTO user (username, password_hash, nickname, is_owner) VALUES ('admin', 'h', 'Admin', 1)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO post (title, slug, content, status) VALUES ('A', 'a', 'x', 1)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO post (title, slug, content, status) VALUES ('B', 'b', 'x', 0)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO tag (name) VALUES ('used'), ('idle')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO post_tag (post_id, tag_id) SELECT p.id, t.id FROM post p, tag t WHERE p.slug = 'a' AND t.name = 'used'",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO memo (content, status) VALUES ('m1', 1), ('m2', 0)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO link (name, url, status) VALUES ('l1', 'https://x', 1)")
            .execute(&pool)
            .await
            .unwrap();

        let overview = service.get_overview().await.expect("Overview should build");

        assert_eq!(overview.owner.nickname.as_deref(), Some("Admin"));
        assert_eq!(overview.stats.published_post_count, 1);
        assert_eq!(overview.stats.draft_post_count, 1);
        assert_eq!(overview.stats.used_tag_count, 1);
        assert_eq!(overview.stats.unused_tag_count, 1);
        assert_eq!(overview.stats.published_memo_count, 1);
        assert_eq!(overview.stats.draft_memo_count, 1);
        assert_eq!(overview.stats.public_link_count, 1);
        assert_eq!(overview.stats.hidden_link_count, 0);
    }
}
