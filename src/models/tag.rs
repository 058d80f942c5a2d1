//! Tag model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tag entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    /// Unique identifier
    pub id: i64,
    /// Globally unique tag name (case-sensitive)
    pub name: String,
    /// Creation timestamp
    pub create_time: DateTime<Utc>,
    /// Last update timestamp
    pub update_time: DateTime<Utc>,
}

/// Minimal tag reference embedded in post responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    pub id: i64,
    pub name: String,
}

/// Tag joined with the number of posts referencing it
#[derive(Debug, Clone, Serialize)]
pub struct TagWithCount {
    pub id: i64,
    pub name: String,
    pub post_count: i64,
}
