//! Friend link model

use crate::models::post::PublishStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Friend link entity. Status: 1 = public, 0 = hidden.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub avatar: Option<String>,
    pub description: Option<String>,
    pub status: PublishStatus,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

/// Input for creating or updating a friend link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkInput {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: PublishStatus,
}
