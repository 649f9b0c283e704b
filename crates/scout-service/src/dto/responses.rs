//! Response DTOs
//!
//! Snowflake IDs serialize as strings.

use chrono::{DateTime, Utc};
use serde::Serialize;

use scout_core::{
    CompetitionCriteria, CompetitionId, CompetitionStatus, ParticipantStatus, PlayerId,
    Snowflake, Visibility,
};

/// Competition as shown to users
#[derive(Debug, Clone, Serialize)]
pub struct CompetitionResponse {
    pub id: CompetitionId,
    pub server_id: Snowflake,
    pub owner_id: Snowflake,
    pub channel_id: Snowflake,
    pub title: String,
    pub description: String,
    pub visibility: Visibility,
    pub criteria: CompetitionCriteria,
    pub status: CompetitionStatus,
    pub max_participants: i32,
    pub participant_count: i64,
    /// Missing when a season id is not in the calendar
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Participant row with the player's alias
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantResponse {
    pub player_id: PlayerId,
    /// Alias of the player, absent if the player row is gone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub status: ParticipantStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invited_by: Option<Snowflake>,
    pub invited_at: Option<DateTime<Utc>>,
    pub joined_at: Option<DateTime<Utc>>,
    pub left_at: Option<DateTime<Utc>>,
}

/// Whether a player may join a competition right now
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinEligibility {
    pub can_join: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl JoinEligibility {
    pub fn allowed() -> Self {
        Self {
            can_join: true,
            reason: None,
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            can_join: false,
            reason: Some(reason.into()),
        }
    }
}

/// Whether a user may create a competition right now
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreationEligibility {
    pub can_create: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Set when the creation cooldown is the blocker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<i64>,
}

impl CreationEligibility {
    pub fn allowed() -> Self {
        Self {
            can_create: true,
            reason: None,
            retry_after_secs: None,
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            can_create: false,
            reason: Some(reason.into()),
            retry_after_secs: None,
        }
    }

    pub fn rate_limited(reason: impl Into<String>, retry_after_secs: i64) -> Self {
        Self {
            can_create: false,
            reason: Some(reason.into()),
            retry_after_secs: Some(retry_after_secs),
        }
    }
}
