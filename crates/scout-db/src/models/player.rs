//! Player database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for players table
#[derive(Debug, Clone, FromRow)]
pub struct PlayerModel {
    pub id: i32,
    pub server_id: i64,
    pub alias: String,
    pub discord_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}
