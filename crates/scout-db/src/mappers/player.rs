//! Player entity <-> model mapper

use scout_core::{Player, PlayerId, Snowflake};

use crate::models::PlayerModel;

impl From<PlayerModel> for Player {
    fn from(model: PlayerModel) -> Self {
        Player {
            id: PlayerId::new(model.id),
            server_id: Snowflake::new(model.server_id),
            alias: model.alias,
            discord_id: model.discord_id.map(Snowflake::new),
            created_at: model.created_at,
        }
    }
}
