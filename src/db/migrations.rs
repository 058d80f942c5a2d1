//! Database migrations module
//!
//! Code-based migrations embedded in the binary for single-binary
//! deployment. Each migration has a unique sequential version; applied
//! versions are recorded in `schema_migrations` and skipped on later runs.
//!
//! `post_tag` deliberately carries no `ON DELETE CASCADE`: deleting a post
//! removes its links as an explicit ordered step inside the delete
//! transaction so the freed-slug behaviour stays visible at the
//! application layer.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Executor, Row, SqlitePool};

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version number (must be unique and sequential)
    pub version: i64,
    /// Human-readable migration name
    pub name: &'static str,
    /// SQL statements to apply
    pub up: &'static str,
}

/// All migrations for the Plumage blog system.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_user",
        up: r#"
            CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username VARCHAR(50) NOT NULL UNIQUE,
                password_hash VARCHAR(255) NOT NULL,
                nickname VARCHAR(100),
                avatar VARCHAR(255),
                email VARCHAR(255),
                bio TEXT,
                is_owner BOOLEAN NOT NULL DEFAULT 0,
                is_deleted BOOLEAN NOT NULL DEFAULT 0,
                create_time TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                update_time TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_user_username ON user(username);
        "#,
    },
    Migration {
        version: 2,
        name: "create_session",
        up: r#"
            CREATE TABLE IF NOT EXISTS session (
                token VARCHAR(64) PRIMARY KEY,
                user_id INTEGER NOT NULL,
                expires_at TIMESTAMP NOT NULL,
                create_time TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES user(id)
            );
            CREATE INDEX IF NOT EXISTS idx_session_user_id ON session(user_id);
            CREATE INDEX IF NOT EXISTS idx_session_expires_at ON session(expires_at);
        "#,
    },
    Migration {
        version: 3,
        name: "create_post",
        up: r#"
            CREATE TABLE IF NOT EXISTS post (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title VARCHAR(255) NOT NULL,
                slug VARCHAR(200) NOT NULL UNIQUE,
                summary VARCHAR(500),
                content TEXT NOT NULL,
                cover_image VARCHAR(255),
                views INTEGER NOT NULL DEFAULT 0,
                read_time INTEGER NOT NULL DEFAULT 1,
                is_pinned BOOLEAN NOT NULL DEFAULT 0,
                status INTEGER NOT NULL DEFAULT 0,
                is_deleted BOOLEAN NOT NULL DEFAULT 0,
                create_time TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                update_time TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_post_slug ON post(slug);
            CREATE INDEX IF NOT EXISTS idx_post_status ON post(status);
            CREATE INDEX IF NOT EXISTS idx_post_create_time ON post(create_time);
        "#,
    },
    Migration {
        version: 4,
        name: "create_tag",
        up: r#"
            CREATE TABLE IF NOT EXISTS tag (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(100) NOT NULL UNIQUE,
                create_time TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                update_time TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
        "#,
    },
    Migration {
        version: 5,
        name: "create_post_tag",
        up: r#"
            CREATE TABLE IF NOT EXISTS post_tag (
                post_id INTEGER NOT NULL,
                tag_id INTEGER NOT NULL,
                create_time TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (post_id, tag_id),
                FOREIGN KEY (post_id) REFERENCES post(id),
                FOREIGN KEY (tag_id) REFERENCES tag(id)
            );
            CREATE INDEX IF NOT EXISTS idx_post_tag_tag_id ON post_tag(tag_id);
        "#,
    },
    Migration {
        version: 6,
        name: "create_memo",
        up: r#"
            CREATE TABLE IF NOT EXISTS memo (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                is_pinned BOOLEAN NOT NULL DEFAULT 0,
                status INTEGER NOT NULL DEFAULT 0,
                is_deleted BOOLEAN NOT NULL DEFAULT 0,
                create_time TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                update_time TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_memo_status ON memo(status);
        "#,
    },
    Migration {
        version: 7,
        name: "create_link",
        up: r#"
            CREATE TABLE IF NOT EXISTS link (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(100) NOT NULL,
                url VARCHAR(255) NOT NULL,
                avatar VARCHAR(255),
                description VARCHAR(500),
                status INTEGER NOT NULL DEFAULT 0,
                create_time TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                update_time TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
        "#,
    },
];

/// Run all pending migrations against the pool.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    create_migrations_table(pool).await?;

    let applied = applied_versions(pool).await?;

    for migration in MIGRATIONS {
        if applied.contains(&migration.version) {
            continue;
        }

        tracing::info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );

        // Unprepared execution so multi-statement scripts run in one call
        pool.execute(migration.up)
            .await
            .with_context(|| format!("Failed to apply migration {} ({})", migration.version, migration.name))?;

        sqlx::query("INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)")
            .bind(migration.version)
            .bind(migration.name)
            .bind(Utc::now())
            .execute(pool)
            .await
            .with_context(|| format!("Failed to record migration {}", migration.version))?;
    }

    Ok(())
}

async fn create_migrations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            applied_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create schema_migrations table")?;
    Ok(())
}

async fn applied_versions(pool: &SqlitePool) -> Result<Vec<i64>> {
    let rows = sqlx::query("SELECT version FROM schema_migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .context("Failed to read applied migrations")?;

    Ok(rows.iter().map(|row| row.get("version")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::db::pool::create_pool;

    async fn fresh_pool() -> SqlitePool {
        let config = DatabaseConfig {
            url: ":memory:".to_string(),
        };
        create_pool(&config).await.expect("Failed to create pool")
    }

    #[tokio::test]
    async fn test_migrations_create_all_tables() {
        let pool = fresh_pool().await;
        run_migrations(&pool).await.expect("Migrations should succeed");

        for table in ["user", "session", "post", "tag", "post_tag", "memo", "link"] {
            let query = format!("SELECT COUNT(*) FROM {}", table);
            sqlx::query(&query)
                .fetch_one(&pool)
                .await
                .unwrap_or_else(|_| panic!("table {} should exist", table));
        }
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = fresh_pool().await;
        run_migrations(&pool).await.expect("First run should succeed");
        run_migrations(&pool).await.expect("Second run should succeed");

        let row = sqlx::query("SELECT COUNT(*) as count FROM schema_migrations")
            .fetch_one(&pool)
            .await
            .expect("Failed to count migrations");
        let count: i64 = row.get("count");
        assert_eq!(count, MIGRATIONS.len() as i64);
    }

    #[tokio::test]
    async fn test_versions_are_unique_and_sequential() {
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            assert_eq!(migration.version, i as i64 + 1);
        }
    }

    #[tokio::test]
    async fn test_post_slug_is_unique() {
        let pool = fresh_pool().await;
        run_migrations(&pool).await.expect("Migrations should succeed");

        sqlx::query("INSERT INTO post (title, slug, content) VALUES ('A', 'same', 'x')")
            .execute(&pool)
            .await
            .expect("First insert should succeed");
        let dup = sqlx::query("INSERT INTO post (title, slug, content) VALUES ('B', 'same', 'y')")
            .execute(&pool)
            .await;
        assert!(dup.is_err(), "Duplicate slug should violate the unique index");
    }
}
