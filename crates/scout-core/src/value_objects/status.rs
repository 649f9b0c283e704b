//! Participant status and its transition rules

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Participation state of a player in a competition
///
/// Transitions are one-directional:
/// `INVITED -> JOINED`, `INVITED -> LEFT`, `JOINED -> LEFT`. `LEFT` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantStatus {
    Joined,
    Invited,
    Left,
}

impl ParticipantStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Joined => "JOINED",
            Self::Invited => "INVITED",
            Self::Left => "LEFT",
        }
    }

    /// Whether this status counts toward the participant limit
    #[inline]
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::Left)
    }

    /// Check whether moving from `self` to `next` is allowed
    pub const fn can_transition_to(&self, next: ParticipantStatus) -> bool {
        matches!(
            (self, next),
            (Self::Invited, Self::Joined) | (Self::Invited, Self::Left) | (Self::Joined, Self::Left)
        )
    }
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParticipantStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JOINED" => Ok(Self::Joined),
            "INVITED" => Ok(Self::Invited),
            "LEFT" => Ok(Self::Left),
            _ => Err(format!("Invalid participant status: {s}")),
        }
    }
}
