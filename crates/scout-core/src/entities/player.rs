//! Player entity - a tracked person within a server

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{PlayerId, Snowflake};

/// Player entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub server_id: Snowflake,
    pub alias: String,
    /// Linked Discord account, if the player claimed one
    pub discord_id: Option<Snowflake>,
    pub created_at: DateTime<Utc>,
}

impl Player {
    /// Name shown in competition listings
    pub fn display_name(&self) -> &str {
        &self.alias
    }

    /// Check if the player is linked to the given Discord user
    pub fn is_linked_to(&self, user_id: Snowflake) -> bool {
        self.discord_id == Some(user_id)
    }
}
