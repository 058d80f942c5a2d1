//! Friend link service

use std::sync::Arc;

use crate::db::repositories::LinkRepository;
use crate::models::{Link, LinkInput};
use crate::services::error::{ServiceError, ServiceResult};

/// Friend link service
pub struct LinkService {
    links: Arc<dyn LinkRepository>,
}

impl LinkService {
    pub fn new(links: Arc<dyn LinkRepository>) -> Self {
        Self { links }
    }

    pub async fn create_link(&self, input: LinkInput) -> ServiceResult<Link> {
        validate(&input)?;
        Ok(self.links.create(&input).await?)
    }

    pub async fn update_link(&self, id: i64, input: LinkInput) -> ServiceResult<Link> {
        if self.links.get_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("link not found: {}", id)));
        }
        validate(&input)?;

        self.links.update(id, &input).await?;
        self.links
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("link not found: {}", id)))
    }

    pub async fn delete_link(&self, id: i64) -> ServiceResult<()> {
        if self.links.get_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("link not found: {}", id)));
        }
        self.links.delete(id).await?;
        Ok(())
    }

    /// Every link, for the admin panel
    pub async fn get_admin_list(&self) -> ServiceResult<Vec<Link>> {
        Ok(self.links.list(false).await?)
    }

    /// Public links only
    pub async fn get_public_list(&self) -> ServiceResult<Vec<Link>> {
        Ok(self.links.list(true).await?)
    }
}

fn validate(input: &LinkInput) -> ServiceResult<()> {
    if input.name.trim().is_empty() {
        return Err(ServiceError::BadRequest(
            "link name cannot be empty".to_string(),
        ));
    }
    if !input.url.starts_with("http://") && !input.url.starts_with("https://") {
        return Err(ServiceError::BadRequest(
            "link url must start with http:// or https://".to_string(),
        ));
    }
    Ok(())
}
