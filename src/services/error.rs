//! Service failure taxonomy
//!
//! Every domain-rule violation is raised as a typed failure at the point
//! of detection and propagates untouched to the HTTP boundary, where it is
//! translated to a status code. Storage failures arrive through the
//! `Internal` variant and keep their full chain for server-side logging.

use thiserror::Error;

/// Domain failure kinds shared by all services
#[derive(Debug, Error)]
pub enum ServiceError {
    /// An id or slug lookup missed
    #[error("{0}")]
    NotFound(String),

    /// A uniqueness constraint (slug, tag name) would be violated
    #[error("{0}")]
    Conflict(String),

    /// The request references data that does not exist or is malformed
    #[error("{0}")]
    BadRequest(String),

    /// The operation is blocked by current state, user-correctable
    #[error("{0}")]
    Forbidden(String),

    /// Missing or invalid credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Underlying storage or infrastructure failure
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Result alias used across the services layer
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_pass_through() {
        let err = ServiceError::NotFound("post not found".to_string());
        assert_eq!(err.to_string(), "post not found");

        let err = ServiceError::Forbidden("tag in use".to_string());
        assert_eq!(err.to_string(), "tag in use");
    }

    #[test]
    fn test_anyhow_converts_to_internal() {
        fn failing() -> ServiceResult<()> {
            Err(anyhow::anyhow!("disk on fire"))?;
            Ok(())
        }
        assert!(matches!(failing(), Err(ServiceError::Internal(_))));
    }
}
