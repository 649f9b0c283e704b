//! In-memory PlayerRepository

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use scout_core::{DomainError, Player, PlayerId, PlayerRepository, RepoResult, Snowflake};

/// In-memory implementation of PlayerRepository
#[derive(Default)]
pub struct InMemoryPlayerRepository {
    rows: RwLock<BTreeMap<PlayerId, Player>>,
}

impl InMemoryPlayerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlayerRepository for InMemoryPlayerRepository {
    async fn find_by_id(&self, id: PlayerId) -> RepoResult<Option<Player>> {
        Ok(self.rows.read().get(&id).cloned())
    }

    async fn find_by_discord_id(
        &self,
        server_id: Snowflake,
        discord_id: Snowflake,
    ) -> RepoResult<Option<Player>> {
        Ok(self
            .rows
            .read()
            .values()
            .find(|p| p.server_id == server_id && p.is_linked_to(discord_id))
            .cloned())
    }

    async fn find_by_server(&self, server_id: Snowflake) -> RepoResult<Vec<Player>> {
        let mut found: Vec<Player> = self
            .rows
            .read()
            .values()
            .filter(|p| p.server_id == server_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.alias.cmp(&b.alias));
        Ok(found)
    }

    async fn create(
        &self,
        server_id: Snowflake,
        alias: &str,
        discord_id: Option<Snowflake>,
    ) -> RepoResult<Player> {
        let mut rows = self.rows.write();
        if let Some(discord_id) = discord_id {
            if rows
                .values()
                .any(|p| p.server_id == server_id && p.is_linked_to(discord_id))
            {
                return Err(DomainError::ValidationError(
                    "Discord account is already linked to a player in this server".to_string(),
                ));
            }
        }

        let id = PlayerId::new(rows.keys().next_back().map_or(1, |last| last.into_inner() + 1));
        let player = Player {
            id,
            server_id,
            alias: alias.to_string(),
            discord_id,
            created_at: Utc::now(),
        };
        rows.insert(id, player.clone());
        Ok(player)
    }
}
