//! Competition scoring criteria
//!
//! Stored as a JSON column; the `type` tag selects the variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Game queue a criterion is evaluated on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Queue {
    Solo,
    Flex,
    RankedAny,
    Aram,
    Arena,
    Quickplay,
}

impl Queue {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Solo => "SOLO",
            Self::Flex => "FLEX",
            Self::RankedAny => "RANKED_ANY",
            Self::Aram => "ARAM",
            Self::Arena => "ARENA",
            Self::Quickplay => "QUICKPLAY",
        }
    }

    /// Ranked queues carry a tier/division
    pub const fn is_ranked(&self) -> bool {
        matches!(self, Self::Solo | Self::Flex | Self::RankedAny)
    }
}

impl fmt::Display for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Queue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SOLO" => Ok(Self::Solo),
            "FLEX" => Ok(Self::Flex),
            "RANKED_ANY" => Ok(Self::RankedAny),
            "ARAM" => Ok(Self::Aram),
            "ARENA" => Ok(Self::Arena),
            "QUICKPLAY" => Ok(Self::Quickplay),
            _ => Err(format!("Invalid queue: {s}")),
        }
    }
}

/// How a competition ranks its participants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompetitionCriteria {
    MostGamesPlayed {
        queue: Queue,
    },
    HighestRank {
        queue: Queue,
    },
    MostRankClimb {
        queue: Queue,
    },
    MostWinsPlayer {
        queue: Queue,
    },
    MostWinsChampion {
        champion_id: i32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        queue: Option<Queue>,
    },
    HighestWinRate {
        min_games: i32,
        queue: Queue,
    },
}

impl CompetitionCriteria {
    /// Variant tag as stored in the `type` field
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MostGamesPlayed { .. } => "MOST_GAMES_PLAYED",
            Self::HighestRank { .. } => "HIGHEST_RANK",
            Self::MostRankClimb { .. } => "MOST_RANK_CLIMB",
            Self::MostWinsPlayer { .. } => "MOST_WINS_PLAYER",
            Self::MostWinsChampion { .. } => "MOST_WINS_CHAMPION",
            Self::HighestWinRate { .. } => "HIGHEST_WIN_RATE",
        }
    }

    /// Check criterion-specific constraints
    ///
    /// Rank-based criteria only make sense on ranked queues.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::HighestRank { queue } | Self::MostRankClimb { queue } if !queue.is_ranked() => {
                Err(format!("{} requires a ranked queue, got {queue}", self.kind()))
            }
            Self::MostWinsChampion { champion_id, .. } if *champion_id <= 0 => {
                Err("Champion id must be positive".to_string())
            }
            Self::HighestWinRate { min_games, .. } if *min_games < 1 => {
                Err("Minimum games must be at least 1".to_string())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tagged_json_shape() {
        let criteria = CompetitionCriteria::MostGamesPlayed { queue: Queue::Solo };
        let value = serde_json::to_value(&criteria).unwrap();
        assert_eq!(value, json!({"type": "MOST_GAMES_PLAYED", "queue": "SOLO"}));
    }

    #[test]
    fn test_champion_queue_is_optional() {
        let parsed: CompetitionCriteria =
            serde_json::from_value(json!({"type": "MOST_WINS_CHAMPION", "champion_id": 157}))
                .unwrap();
        assert_eq!(
            parsed,
            CompetitionCriteria::MostWinsChampion {
                champion_id: 157,
                queue: None
            }
        );
    }

    #[test]
    fn test_rank_criteria_need_ranked_queue() {
        assert!(CompetitionCriteria::HighestRank { queue: Queue::Aram }
            .validate()
            .is_err());
        assert!(CompetitionCriteria::HighestRank { queue: Queue::Flex }
            .validate()
            .is_ok());
        assert!(CompetitionCriteria::HighestWinRate {
            min_games: 0,
            queue: Queue::Solo
        }
        .validate()
        .is_err());
    }
}
