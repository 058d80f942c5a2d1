//! User service
//!
//! Owner-account workflows: first-run setup, login/logout with opaque
//! session tokens, session validation for the auth middleware, and
//! profile/password updates.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::repositories::{ProfileUpdate, UserRepository};
use crate::models::{Session, User};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::password::{hash_password, verify_password};

/// Login request payload
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// User service for the single owner account
pub struct UserService {
    users: Arc<dyn UserRepository>,
    session_ttl_hours: i64,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, session_ttl_hours: i64) -> Self {
        Self {
            users,
            session_ttl_hours,
        }
    }

    /// First-run setup: create the owner account. Conflicts once an owner
    /// exists — this is a single-owner system.
    pub async fn setup(
        &self,
        username: &str,
        password: &str,
        nickname: Option<&str>,
    ) -> ServiceResult<User> {
        if self.users.find_owner().await?.is_some() {
            return Err(ServiceError::Conflict(
                "site is already initialized".to_string(),
            ));
        }
        if username.trim().is_empty() || password.len() < 8 {
            return Err(ServiceError::BadRequest(
                "username must be non-empty and password at least 8 characters".to_string(),
            ));
        }

        let password_hash = hash_password(password)?;
        let user = self
            .users
            .create_owner(username, &password_hash, nickname)
            .await?;

        tracing::info!(username = %user.username, "Owner account created");
        Ok(user)
    }

    /// Verify credentials and issue a session token.
    ///
    /// The error is the same whether the username or the password was
    /// wrong, so the endpoint does not leak which accounts exist.
    pub async fn login(&self, input: &LoginInput) -> ServiceResult<(String, User)> {
        let Some(user) = self.users.find_by_username(&input.username).await? else {
            return Err(ServiceError::Unauthorized(
                "invalid username or password".to_string(),
            ));
        };
        if !verify_password(&input.password, &user.password_hash)? {
            return Err(ServiceError::Unauthorized(
                "invalid username or password".to_string(),
            ));
        }

        let now = Utc::now();
        let session = Session {
            token: Uuid::new_v4().to_string(),
            user_id: user.id,
            expires_at: now + Duration::hours(self.session_ttl_hours),
            create_time: now,
        };
        self.users.create_session(&session).await?;

        // Opportunistic cleanup keeps the session table from growing forever
        let _ = self.users.delete_expired_sessions(now).await;

        Ok((session.token, user))
    }

    /// Revoke a session token.
    pub async fn logout(&self, token: &str) -> ServiceResult<()> {
        self.users.delete_session(token).await?;
        Ok(())
    }

    /// Resolve a session token into its user, if valid and unexpired.
    pub async fn validate_session(&self, token: &str) -> ServiceResult<Option<User>> {
        let session = self.users.find_valid_session(token, Utc::now()).await?;
        match session {
            Some(session) => Ok(self.users.find_by_id(session.user_id).await?),
            None => Ok(None),
        }
    }

    /// Fetch a user by id.
    pub async fn get_profile(&self, id: i64) -> ServiceResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user not found: {}", id)))
    }

    /// Update the editable profile fields.
    pub async fn update_profile(&self, id: i64, update: ProfileUpdate) -> ServiceResult<User> {
        if self.users.find_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("user not found: {}", id)));
        }
        self.users.update_profile(id, &update).await?;
        self.get_profile(id).await
    }

    /// Change the password after verifying the current one.
    pub async fn update_password(
        &self,
        id: i64,
        old_password: &str,
        new_password: &str,
    ) -> ServiceResult<()> {
        let user = self.get_profile(id).await?;

        if !verify_password(old_password, &user.password_hash)? {
            return Err(ServiceError::Unauthorized(
                "current password is incorrect".to_string(),
            ));
        }
        if new_password.len() < 8 {
            return Err(ServiceError::BadRequest(
                "password must be at least 8 characters".to_string(),
            ));
        }

        let password_hash = hash_password(new_password)?;
        self.users.update_password(id, &password_hash).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::db::repositories::SqlxUserRepository;

    async fn setup() -> UserService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        UserService::new(SqlxUserRepository::boxed(pool), 24)
    }

    fn login(username: &str, password: &str) -> LoginInput {
        LoginInput {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_setup_once() {
        let service = setup().await;
        service
            .setup("admin", "password123", Some("Admin"))
            .await
            .expect("First setup succeeds");

        let again = service.setup("other", "password123", None).await;
        assert!(matches!(again, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_setup_rejects_weak_password() {
        let service = setup().await;
        let result = service.setup("admin", "short", None).await;
        assert!(matches!(result, Err(ServiceError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_login_and_validate_session() {
        let service = setup().await;
        service.setup("admin", "password123", None).await.unwrap();

        let (token, user) = service
            .login(&login("admin", "password123"))
            .await
            .expect("Login should succeed");
        assert_eq!(user.username, "admin");

        let validated = service
            .validate_session(&token)
            .await
            .expect("Validation should run")
            .expect("Session should resolve");
        assert_eq!(validated.id, user.id);
    }

    #[tokio::test]
    async fn test_login_wrong_credentials() {
        let service = setup().await;
        service.setup("admin", "password123", None).await.unwrap();

        let wrong_password = service.login(&login("admin", "nope-nope")).await;
        assert!(matches!(wrong_password, Err(ServiceError::Unauthorized(_))));

        let unknown_user = service.login(&login("ghost", "password123")).await;
        assert!(matches!(unknown_user, Err(ServiceError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_logout_revokes_session() {
        let service = setup().await;
        service.setup("admin", "password123", None).await.unwrap();
        let (token, _user) = service.login(&login("admin", "password123")).await.unwrap();

        service.logout(&token).await.expect("Logout should succeed");
        assert!(service.validate_session(&token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_password_requires_current() {
        let service = setup().await;
        let user = service.setup("admin", "password123", None).await.unwrap();

        let wrong = service.update_password(user.id, "wrong", "newpassword1").await;
        assert!(matches!(wrong, Err(ServiceError::Unauthorized(_))));

        service
            .update_password(user.id, "password123", "newpassword1")
            .await
            .expect("Password change should succeed");

        assert!(service.login(&login("admin", "password123")).await.is_err());
        service
            .login(&login("admin", "newpassword1"))
            .await
            .expect("New password should work");
    }

    #[tokio::test]
    async fn test_update_profile() {
        let service = setup().await;
        let user = service.setup("admin", "password123", None).await.unwrap();

        let updated = service
            .update_profile(
                user.id,
                ProfileUpdate {
                    nickname: Some("Writer".to_string()),
                    bio: Some("hello".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("Profile update should succeed");

        assert_eq!(updated.nickname.as_deref(), Some("Writer"));
        assert_eq!(updated.bio.as_deref(), Some("hello"));
    }
}
