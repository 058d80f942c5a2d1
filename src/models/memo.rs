//! Memo model
//!
//! Memos are short notes with the same draft/published/pinned conventions
//! as posts, minus slugs and tags.

use crate::models::post::PublishStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Memo entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memo {
    pub id: i64,
    pub content: String,
    pub is_pinned: bool,
    pub status: PublishStatus,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

/// Input for creating or updating a memo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoInput {
    pub content: String,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub status: PublishStatus,
}

/// Aggregate statistics over published memos
#[derive(Debug, Clone, Serialize)]
pub struct MemoStats {
    /// Number of published memos
    pub total_count: i64,
    /// Total character count across published memos
    pub total_chars: i64,
    /// Memos published since the start of the current month
    pub this_month_count: i64,
    /// Creation time of the most recent published memo
    pub latest_time: Option<DateTime<Utc>>,
}
