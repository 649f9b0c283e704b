//! PostgreSQL implementation of ParticipantRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use scout_core::{
    CompetitionId, CompetitionParticipant, DomainError, ParticipantRepository, PlayerId,
    RepoResult,
};

use crate::mappers::ParticipantWrite;
use crate::models::ParticipantModel;

use super::error::{map_db_error, map_unique_violation, participant_not_found};

/// PostgreSQL implementation of ParticipantRepository
#[derive(Clone)]
pub struct PgParticipantRepository {
    pool: PgPool,
}

impl PgParticipantRepository {
    /// Create a new PgParticipantRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParticipantRepository for PgParticipantRepository {
    #[instrument(skip(self))]
    async fn find(
        &self,
        competition_id: CompetitionId,
        player_id: PlayerId,
    ) -> RepoResult<Option<CompetitionParticipant>> {
        let result = sqlx::query_as::<_, ParticipantModel>(
            r#"
            SELECT competition_id, player_id, status, invited_by, invited_at, joined_at, left_at
            FROM competition_participants
            WHERE competition_id = $1 AND player_id = $2
            "#,
        )
        .bind(competition_id.into_inner())
        .bind(player_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(CompetitionParticipant::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_competition(
        &self,
        competition_id: CompetitionId,
    ) -> RepoResult<Vec<CompetitionParticipant>> {
        let results = sqlx::query_as::<_, ParticipantModel>(
            r#"
            SELECT competition_id, player_id, status, invited_by, invited_at, joined_at, left_at
            FROM competition_participants
            WHERE competition_id = $1
            ORDER BY COALESCE(joined_at, invited_at) ASC, player_id ASC
            "#,
        )
        .bind(competition_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results
            .into_iter()
            .map(CompetitionParticipant::try_from)
            .collect()
    }

    #[instrument(skip(self))]
    async fn count_active(&self, competition_id: CompetitionId) -> RepoResult<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM competition_participants
            WHERE competition_id = $1 AND status <> 'LEFT'
            "#,
        )
        .bind(competition_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(count.0)
    }

    #[instrument(skip(self, participant), fields(competition_id = %participant.competition_id, player_id = %participant.player_id))]
    async fn create(&self, participant: &CompetitionParticipant) -> RepoResult<()> {
        let write = ParticipantWrite::new(participant);

        sqlx::query(
            r#"
            INSERT INTO competition_participants
                (competition_id, player_id, status, invited_by, invited_at, joined_at, left_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(write.competition_id)
        .bind(write.player_id)
        .bind(write.status)
        .bind(write.invited_by)
        .bind(participant.invited_at)
        .bind(participant.joined_at)
        .bind(participant.left_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::AlreadyParticipant))?;

        Ok(())
    }

    #[instrument(skip(self, participant), fields(competition_id = %participant.competition_id, player_id = %participant.player_id))]
    async fn update(&self, participant: &CompetitionParticipant) -> RepoResult<()> {
        let write = ParticipantWrite::new(participant);

        let result = sqlx::query(
            r#"
            UPDATE competition_participants
            SET status = $3, invited_by = $4, invited_at = $5, joined_at = $6, left_at = $7
            WHERE competition_id = $1 AND player_id = $2
            "#,
        )
        .bind(write.competition_id)
        .bind(write.player_id)
        .bind(write.status)
        .bind(write.invited_by)
        .bind(participant.invited_at)
        .bind(participant.joined_at)
        .bind(participant.left_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(participant_not_found(
                participant.competition_id,
                participant.player_id,
            ));
        }

        Ok(())
    }
}
