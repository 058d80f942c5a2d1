//! User and session repository
//!
//! Persistence for the single owner account and its session tokens.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::{Session, User};

/// Profile fields editable through the API
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
}

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create the owner account
    async fn create_owner(
        &self,
        username: &str,
        password_hash: &str,
        nickname: Option<&str>,
    ) -> Result<User>;

    /// Get user by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// The site owner, if the site has been set up
    async fn find_owner(&self) -> Result<Option<User>>;

    /// Update profile fields
    async fn update_profile(&self, id: i64, update: &ProfileUpdate) -> Result<()>;

    /// Replace the stored password hash
    async fn update_password(&self, id: i64, password_hash: &str) -> Result<()>;

    /// Store a new session
    async fn create_session(&self, session: &Session) -> Result<()>;

    /// Look up a session that has not expired by `now`
    async fn find_valid_session(&self, token: &str, now: DateTime<Utc>) -> Result<Option<Session>>;

    /// Revoke one session
    async fn delete_session(&self, token: &str) -> Result<()>;

    /// Drop sessions past their expiry
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: SqlitePool,
}

impl SqlxUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

const USER_COLUMNS: &str =
    "id, username, password_hash, nickname, avatar, email, bio, is_owner, create_time, update_time";

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create_owner(
        &self,
        username: &str,
        password_hash: &str,
        nickname: Option<&str>,
    ) -> Result<User> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO user (username, password_hash, nickname, is_owner, is_deleted, create_time, update_time)
            VALUES (?, ?, ?, 1, 0, ?, ?)
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(nickname)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create owner account")?;

        Ok(User {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            nickname: nickname.map(str::to_string),
            avatar: None,
            email: None,
            bio: None,
            is_owner: true,
            create_time: now,
            update_time: now,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let query = format!(
            "SELECT {} FROM user WHERE id = ? AND is_deleted = 0",
            USER_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get user by ID")?;

        Ok(row.map(|row| row_to_user(&row)))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let query = format!(
            "SELECT {} FROM user WHERE username = ? AND is_deleted = 0",
            USER_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get user by username")?;

        Ok(row.map(|row| row_to_user(&row)))
    }

    async fn find_owner(&self) -> Result<Option<User>> {
        let query = format!(
            "SELECT {} FROM user WHERE is_owner = 1 AND is_deleted = 0 LIMIT 1",
            USER_COLUMNS
        );
        let row = sqlx::query(&query)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get owner")?;

        Ok(row.map(|row| row_to_user(&row)))
    }

    async fn update_profile(&self, id: i64, update: &ProfileUpdate) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE user
            SET nickname = ?, avatar = ?, email = ?, bio = ?, update_time = ?
            WHERE id = ? AND is_deleted = 0
            "#,
        )
        .bind(&update.nickname)
        .bind(&update.avatar)
        .bind(&update.email)
        .bind(&update.bio)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update profile")?;

        if result.rows_affected() == 0 {
            return Err(anyhow!("User not found for profile update: {}", id));
        }
        Ok(())
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE user SET password_hash = ?, update_time = ? WHERE id = ? AND is_deleted = 0",
        )
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update password")?;

        if result.rows_affected() == 0 {
            return Err(anyhow!("User not found for password update: {}", id));
        }
        Ok(())
    }

    async fn create_session(&self, session: &Session) -> Result<()> {
        sqlx::query(
            "INSERT INTO session (token, user_id, expires_at, create_time) VALUES (?, ?, ?, ?)",
        )
        .bind(&session.token)
        .bind(session.user_id)
        .bind(session.expires_at)
        .bind(session.create_time)
        .execute(&self.pool)
        .await
        .context("Failed to create session")?;
        Ok(())
    }

    async fn find_valid_session(&self, token: &str, now: DateTime<Utc>) -> Result<Option<Session>> {
        let row = sqlx::query(
            "SELECT token, user_id, expires_at, create_time FROM session WHERE token = ? AND expires_at > ?",
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to look up session")?;

        Ok(row.map(|row| Session {
            token: row.get("token"),
            user_id: row.get("user_id"),
            expires_at: row.get("expires_at"),
            create_time: row.get("create_time"),
        }))
    }

    async fn delete_session(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM session WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM session WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .context("Failed to delete expired sessions")?;
        Ok(result.rows_affected())
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        nickname: row.get("nickname"),
        avatar: row.get("avatar"),
        email: row.get("email"),
        bio: row.get("bio"),
        is_owner: row.get("is_owner"),
        create_time: row.get("create_time"),
        update_time: row.get("update_time"),
    }
}
