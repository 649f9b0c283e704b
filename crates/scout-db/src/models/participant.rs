//! Competition participant database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for competition_participants table
#[derive(Debug, Clone, FromRow)]
pub struct ParticipantModel {
    pub competition_id: i32,
    pub player_id: i32,
    pub status: String,
    pub invited_by: Option<i64>,
    pub invited_at: Option<DateTime<Utc>>,
    pub joined_at: Option<DateTime<Utc>>,
    pub left_at: Option<DateTime<Utc>>,
}

impl ParticipantModel {
    /// Check if the row still counts toward the participant limit
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status != "LEFT"
    }
}
