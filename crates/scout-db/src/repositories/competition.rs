//! PostgreSQL implementation of CompetitionRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use scout_core::{
    Competition, CompetitionId, CompetitionRepository, NewCompetition, RepoResult, Snowflake,
};

use crate::mappers::{encode_dates, CompetitionInsert};
use crate::models::CompetitionModel;

use super::error::{competition_not_found, map_db_error};

const COMPETITION_COLUMNS: &str = "id, server_id, owner_id, channel_id, title, description, \
     visibility, criteria, max_participants, dates, is_cancelled, created_at, updated_at";

/// PostgreSQL implementation of CompetitionRepository
#[derive(Clone)]
pub struct PgCompetitionRepository {
    pool: PgPool,
}

impl PgCompetitionRepository {
    /// Create a new PgCompetitionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompetitionRepository for PgCompetitionRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: CompetitionId) -> RepoResult<Option<Competition>> {
        let result = sqlx::query_as::<_, CompetitionModel>(&format!(
            "SELECT {COMPETITION_COLUMNS} FROM competitions WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Competition::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_server(&self, server_id: Snowflake) -> RepoResult<Vec<Competition>> {
        let results = sqlx::query_as::<_, CompetitionModel>(&format!(
            "SELECT {COMPETITION_COLUMNS} FROM competitions \
             WHERE server_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(server_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(Competition::try_from).collect()
    }

    #[instrument(skip(self, competition), fields(server_id = %competition.server_id))]
    async fn create(&self, competition: &NewCompetition) -> RepoResult<Competition> {
        let insert = CompetitionInsert::new(competition)?;

        let model = sqlx::query_as::<_, CompetitionModel>(&format!(
            "INSERT INTO competitions (server_id, owner_id, channel_id, title, description, \
                                       visibility, criteria, max_participants, dates) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COMPETITION_COLUMNS}"
        ))
        .bind(insert.server_id)
        .bind(insert.owner_id)
        .bind(insert.channel_id)
        .bind(insert.title)
        .bind(insert.description)
        .bind(insert.visibility)
        .bind(insert.criteria)
        .bind(insert.max_participants)
        .bind(insert.dates)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Competition::try_from(model)
    }

    #[instrument(skip(self, competition), fields(competition_id = %competition.id))]
    async fn update(&self, competition: &Competition) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE competitions
            SET is_cancelled = $2, dates = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(competition.id.into_inner())
        .bind(competition.is_cancelled)
        .bind(encode_dates(&competition.dates)?)
        .bind(competition.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(competition_not_found(competition.id));
        }

        Ok(())
    }
}
