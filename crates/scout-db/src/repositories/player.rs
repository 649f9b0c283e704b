//! PostgreSQL implementation of PlayerRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use scout_core::{DomainError, Player, PlayerId, PlayerRepository, RepoResult, Snowflake};

use crate::models::PlayerModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of PlayerRepository
#[derive(Clone)]
pub struct PgPlayerRepository {
    pool: PgPool,
}

impl PgPlayerRepository {
    /// Create a new PgPlayerRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlayerRepository for PgPlayerRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: PlayerId) -> RepoResult<Option<Player>> {
        let result = sqlx::query_as::<_, PlayerModel>(
            r#"
            SELECT id, server_id, alias, discord_id, created_at
            FROM players
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Player::from))
    }

    #[instrument(skip(self))]
    async fn find_by_discord_id(
        &self,
        server_id: Snowflake,
        discord_id: Snowflake,
    ) -> RepoResult<Option<Player>> {
        let result = sqlx::query_as::<_, PlayerModel>(
            r#"
            SELECT id, server_id, alias, discord_id, created_at
            FROM players
            WHERE server_id = $1 AND discord_id = $2
            "#,
        )
        .bind(server_id.into_inner())
        .bind(discord_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Player::from))
    }

    #[instrument(skip(self))]
    async fn find_by_server(&self, server_id: Snowflake) -> RepoResult<Vec<Player>> {
        let results = sqlx::query_as::<_, PlayerModel>(
            r#"
            SELECT id, server_id, alias, discord_id, created_at
            FROM players
            WHERE server_id = $1
            ORDER BY alias ASC
            "#,
        )
        .bind(server_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Player::from).collect())
    }

    #[instrument(skip(self))]
    async fn create(
        &self,
        server_id: Snowflake,
        alias: &str,
        discord_id: Option<Snowflake>,
    ) -> RepoResult<Player> {
        let model = sqlx::query_as::<_, PlayerModel>(
            r#"
            INSERT INTO players (server_id, alias, discord_id)
            VALUES ($1, $2, $3)
            RETURNING id, server_id, alias, discord_id, created_at
            "#,
        )
        .bind(server_id.into_inner())
        .bind(alias)
        .bind(discord_id.map(Snowflake::into_inner))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                DomainError::ValidationError(
                    "Discord account is already linked to a player in this server".to_string(),
                )
            })
        })?;

        Ok(Player::from(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgPlayerRepository>();
    }
}
