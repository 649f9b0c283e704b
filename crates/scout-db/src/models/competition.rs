//! Competition database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for competitions table
///
/// `criteria` and `dates` are tagged JSON documents.
#[derive(Debug, Clone, FromRow)]
pub struct CompetitionModel {
    pub id: i32,
    pub server_id: i64,
    pub owner_id: i64,
    pub channel_id: i64,
    pub title: String,
    pub description: String,
    pub visibility: String,
    pub criteria: serde_json::Value,
    pub max_participants: i32,
    pub dates: serde_json::Value,
    pub is_cancelled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
