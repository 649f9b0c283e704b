//! Competition entity - a server-scoped leaderboard challenge

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::value_objects::{CompetitionCriteria, CompetitionId, SeasonCalendar, Snowflake};

/// Who may join a competition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    /// Anyone in the server can join
    Open,
    /// Only invited players can join
    InviteOnly,
    /// Every tracked player in the server is included
    ServerWide,
}

impl Visibility {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InviteOnly => "INVITE_ONLY",
            Self::ServerWide => "SERVER_WIDE",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Self::Open),
            "INVITE_ONLY" => Ok(Self::InviteOnly),
            "SERVER_WIDE" => Ok(Self::ServerWide),
            _ => Err(format!("Invalid visibility: {s}")),
        }
    }
}

/// Date range of a competition: explicit, or borrowed from a ranked season
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompetitionDates {
    Fixed {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    Season {
        season_id: String,
    },
}

impl CompetitionDates {
    /// Resolve to a concrete `(start, end)` pair
    ///
    /// Returns `None` for a season id the calendar does not know.
    pub fn resolve(&self, calendar: &SeasonCalendar) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match self {
            Self::Fixed { start, end } => Some((*start, *end)),
            Self::Season { season_id } => calendar.get(season_id).map(|s| (s.start, s.end)),
        }
    }

    /// Check that the range is well formed
    pub fn validate(&self, calendar: &SeasonCalendar) -> Result<(), String> {
        match self {
            Self::Fixed { start, end } if end <= start => {
                Err("End date must be after start date".to_string())
            }
            Self::Fixed { .. } => Ok(()),
            Self::Season { season_id } if calendar.get(season_id).is_none() => {
                Err(format!("Unknown season: {season_id}"))
            }
            Self::Season { .. } => Ok(()),
        }
    }
}

/// Lifecycle state derived from dates and the cancellation flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompetitionStatus {
    /// Not started yet
    Draft,
    Active,
    Ended,
    Cancelled,
}

impl CompetitionStatus {
    /// Draft and active competitions still accept changes
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Draft | Self::Active)
    }
}

/// Competition entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competition {
    pub id: CompetitionId,
    pub server_id: Snowflake,
    pub owner_id: Snowflake,
    pub channel_id: Snowflake,
    pub title: String,
    pub description: String,
    pub visibility: Visibility,
    pub criteria: CompetitionCriteria,
    pub max_participants: i32,
    pub dates: CompetitionDates,
    pub is_cancelled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Competition {
    /// Derive the lifecycle status at `now`
    ///
    /// A season id missing from the calendar cannot be placed in time and is
    /// treated as active so it stays visible to its owner.
    pub fn status_at(&self, now: DateTime<Utc>, calendar: &SeasonCalendar) -> CompetitionStatus {
        if self.is_cancelled {
            return CompetitionStatus::Cancelled;
        }
        match self.dates.resolve(calendar) {
            Some((start, _)) if now < start => CompetitionStatus::Draft,
            Some((_, end)) if now > end => CompetitionStatus::Ended,
            _ => CompetitionStatus::Active,
        }
    }

    /// Whether the competition has run past its end date
    pub fn has_ended(&self, now: DateTime<Utc>, calendar: &SeasonCalendar) -> bool {
        matches!(self.dates.resolve(calendar), Some((_, end)) if now > end)
    }

    /// Check if a user owns this competition
    #[inline]
    pub fn is_owner(&self, user_id: Snowflake) -> bool {
        self.owner_id == user_id
    }

    /// Soft-cancel the competition
    pub fn cancel(&mut self) {
        self.is_cancelled = true;
        self.updated_at = Utc::now();
    }

    /// Replace the date range
    pub fn set_dates(&mut self, dates: CompetitionDates) {
        self.dates = dates;
        self.updated_at = Utc::now();
    }
}

/// Values for inserting a competition; the database assigns the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompetition {
    pub server_id: Snowflake,
    pub owner_id: Snowflake,
    pub channel_id: Snowflake,
    pub title: String,
    pub description: String,
    pub visibility: Visibility,
    pub criteria: CompetitionCriteria,
    pub max_participants: i32,
    pub dates: CompetitionDates,
}

impl NewCompetition {
    /// Materialize with an assigned id and creation time
    pub fn into_competition(self, id: CompetitionId, now: DateTime<Utc>) -> Competition {
        Competition {
            id,
            server_id: self.server_id,
            owner_id: self.owner_id,
            channel_id: self.channel_id,
            title: self.title,
            description: self.description,
            visibility: self.visibility,
            criteria: self.criteria,
            max_participants: self.max_participants,
            dates: self.dates,
            is_cancelled: false,
            created_at: now,
            updated_at: now,
        }
    }
}
