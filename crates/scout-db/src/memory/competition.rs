//! In-memory CompetitionRepository

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};

use scout_core::{
    Competition, CompetitionId, CompetitionRepository, DomainError, NewCompetition, RepoResult,
    Snowflake,
};

/// In-memory implementation of CompetitionRepository
#[derive(Default)]
pub struct InMemoryCompetitionRepository {
    rows: RwLock<BTreeMap<CompetitionId, Competition>>,
    next_id: AtomicI32,
}

impl InMemoryCompetitionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompetitionRepository for InMemoryCompetitionRepository {
    async fn find_by_id(&self, id: CompetitionId) -> RepoResult<Option<Competition>> {
        Ok(self.rows.read().get(&id).cloned())
    }

    async fn find_by_server(&self, server_id: Snowflake) -> RepoResult<Vec<Competition>> {
        let mut found: Vec<Competition> = self
            .rows
            .read()
            .values()
            .filter(|c| c.server_id == server_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(found)
    }

    async fn create(&self, competition: &NewCompetition) -> RepoResult<Competition> {
        let id = CompetitionId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let created = competition.clone().into_competition(id, Utc::now());
        self.rows.write().insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, competition: &Competition) -> RepoResult<()> {
        let mut rows = self.rows.write();
        let stored = rows
            .get_mut(&competition.id)
            .ok_or(DomainError::CompetitionNotFound(competition.id))?;
        stored.is_cancelled = competition.is_cancelled;
        stored.dates = competition.dates.clone();
        stored.updated_at = competition.updated_at;
        Ok(())
    }
}
