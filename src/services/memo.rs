//! Memo service

use std::sync::Arc;

use crate::db::repositories::MemoRepository;
use crate::models::{Memo, MemoInput, MemoStats, PageResult, PublishStatus};
use crate::services::error::{ServiceError, ServiceResult};

/// Memo service for short notes
pub struct MemoService {
    memos: Arc<dyn MemoRepository>,
}

impl MemoService {
    pub fn new(memos: Arc<dyn MemoRepository>) -> Self {
        Self { memos }
    }

    pub async fn create_memo(&self, input: MemoInput) -> ServiceResult<Memo> {
        if input.content.trim().is_empty() {
            return Err(ServiceError::BadRequest(
                "memo content cannot be empty".to_string(),
            ));
        }
        Ok(self.memos.create(&input).await?)
    }

    pub async fn update_memo(&self, id: i64, input: MemoInput) -> ServiceResult<Memo> {
        if self.memos.get_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("memo not found: {}", id)));
        }
        if input.content.trim().is_empty() {
            return Err(ServiceError::BadRequest(
                "memo content cannot be empty".to_string(),
            ));
        }

        self.memos.update(id, &input).await?;
        self.memos
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("memo not found: {}", id)))
    }

    pub async fn delete_memo(&self, id: i64) -> ServiceResult<()> {
        if self.memos.get_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("memo not found: {}", id)));
        }
        self.memos.delete(id).await?;
        Ok(())
    }

    /// Admin listing, any status
    pub async fn get_admin_page(
        &self,
        page: i64,
        page_size: i64,
        status: Option<PublishStatus>,
    ) -> ServiceResult<PageResult<Memo>> {
        Ok(self.memos.find_page(page, page_size, status).await?)
    }

    /// Public listing: published memos only
    pub async fn get_public_page(&self, page: i64, page_size: i64) -> ServiceResult<PageResult<Memo>> {
        Ok(self
            .memos
            .find_page(page, page_size, Some(PublishStatus::Published))
            .await?)
    }

    pub async fn get_stats(&self) -> ServiceResult<MemoStats> {
        Ok(self.memos.stats().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::db::repositories::SqlxMemoRepository;

    async fn setup() -> MemoService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        MemoService::new(SqlxMemoRepository::boxed(pool))
    }

    fn memo(content: &str, status: PublishStatus) -> MemoInput {
        MemoInput {
            content: content.to_string(),
            is_pinned: false,
            status,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_blank_content() {
        let service = setup().await;
        let result = service.create_memo(memo("   ", PublishStatus::Draft)).await;
        assert!(matches!(result, Err(ServiceError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_update_missing_memo() {
        let service = setup().await;
        let result = service.update_memo(99, memo("x", PublishStatus::Draft)).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_public_page_hides_drafts() {
        let service = setup().await;
        service.create_memo(memo("public note", PublishStatus::Published)).await.unwrap();
        service.create_memo(memo("private note", PublishStatus::Draft)).await.unwrap();

        let public = service.get_public_page(1, 10).await.unwrap();
        assert_eq!(public.total, 1);
        assert_eq!(public.records[0].content, "public note");

        let admin = service.get_admin_page(1, 10, None).await.unwrap();
        assert_eq!(admin.total, 2);
    }

    #[tokio::test]
    async fn test_crud_roundtrip() {
        let service = setup().await;
        let created = service
            .create_memo(memo("first draft", PublishStatus::Draft))
            .await
            .unwrap();

        let updated = service
            .update_memo(created.id, memo("now public", PublishStatus::Published))
            .await
            .unwrap();
        assert_eq!(updated.content, "now public");
        assert_eq!(updated.status, PublishStatus::Published);

        service.delete_memo(created.id).await.unwrap();
        let gone = service.delete_memo(created.id).await;
        assert!(matches!(gone, Err(ServiceError::NotFound(_))));
    }
}
