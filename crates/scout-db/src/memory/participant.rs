//! In-memory ParticipantRepository

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use scout_core::{
    CompetitionId, CompetitionParticipant, DomainError, ParticipantRepository, PlayerId,
    RepoResult,
};

/// In-memory implementation of ParticipantRepository
///
/// Rows are keyed by `(competition, player)` like the table's primary key.
#[derive(Default)]
pub struct InMemoryParticipantRepository {
    rows: RwLock<BTreeMap<(CompetitionId, PlayerId), CompetitionParticipant>>,
}

impl InMemoryParticipantRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ParticipantRepository for InMemoryParticipantRepository {
    async fn find(
        &self,
        competition_id: CompetitionId,
        player_id: PlayerId,
    ) -> RepoResult<Option<CompetitionParticipant>> {
        Ok(self.rows.read().get(&(competition_id, player_id)).cloned())
    }

    async fn find_by_competition(
        &self,
        competition_id: CompetitionId,
    ) -> RepoResult<Vec<CompetitionParticipant>> {
        let mut found: Vec<CompetitionParticipant> = self
            .rows
            .read()
            .values()
            .filter(|p| p.competition_id == competition_id)
            .cloned()
            .collect();
        found.sort_by_key(|p| (p.joined_at.or(p.invited_at), p.player_id));
        Ok(found)
    }

    async fn count_active(&self, competition_id: CompetitionId) -> RepoResult<i64> {
        let count = self
            .rows
            .read()
            .values()
            .filter(|p| p.competition_id == competition_id && p.is_active())
            .count();
        Ok(count as i64)
    }

    async fn create(&self, participant: &CompetitionParticipant) -> RepoResult<()> {
        let key = (participant.competition_id, participant.player_id);
        let mut rows = self.rows.write();
        if rows.contains_key(&key) {
            return Err(DomainError::AlreadyParticipant);
        }
        rows.insert(key, participant.clone());
        Ok(())
    }

    async fn update(&self, participant: &CompetitionParticipant) -> RepoResult<()> {
        let key = (participant.competition_id, participant.player_id);
        let mut rows = self.rows.write();
        let stored = rows.get_mut(&key).ok_or(DomainError::ParticipantNotFound {
            competition_id: participant.competition_id,
            player_id: participant.player_id,
        })?;
        *stored = participant.clone();
        Ok(())
    }
}
