//! Service context - dependency container for services
//!
//! Holds the repositories, the creation rate limiter, the season calendar and
//! the configured competition limits.

use std::sync::Arc;

use scout_cache::CreationRateLimiter;
use scout_common::{AppConfig, CompetitionConfig};
use scout_core::{
    CompetitionRepository, ParticipantRepository, PermissionRepository, PlayerRepository,
    SeasonCalendar,
};
use scout_db::{
    InMemoryCompetitionRepository, InMemoryParticipantRepository, InMemoryPermissionRepository,
    InMemoryPlayerRepository, PgCompetitionRepository, PgParticipantRepository,
    PgPermissionRepository, PgPlayerRepository, PgPool, PoolSettings,
};
use tracing::info;

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    competition_repo: Arc<dyn CompetitionRepository>,
    participant_repo: Arc<dyn ParticipantRepository>,
    permission_repo: Arc<dyn PermissionRepository>,
    player_repo: Arc<dyn PlayerRepository>,

    // Rate limiting
    rate_limiter: CreationRateLimiter,

    // Settings
    seasons: Arc<SeasonCalendar>,
    limits: CompetitionConfig,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        competition_repo: Arc<dyn CompetitionRepository>,
        participant_repo: Arc<dyn ParticipantRepository>,
        permission_repo: Arc<dyn PermissionRepository>,
        player_repo: Arc<dyn PlayerRepository>,
        rate_limiter: CreationRateLimiter,
        seasons: Arc<SeasonCalendar>,
        limits: CompetitionConfig,
    ) -> Self {
        Self {
            competition_repo,
            participant_repo,
            permission_repo,
            player_repo,
            rate_limiter,
            seasons,
            limits,
        }
    }

    /// Context backed by PostgreSQL repositories
    pub fn postgres(
        pool: PgPool,
        rate_limiter: CreationRateLimiter,
        limits: CompetitionConfig,
    ) -> Self {
        Self::new(
            Arc::new(PgCompetitionRepository::new(pool.clone())),
            Arc::new(PgParticipantRepository::new(pool.clone())),
            Arc::new(PgPermissionRepository::new(pool.clone())),
            Arc::new(PgPlayerRepository::new(pool)),
            rate_limiter,
            Arc::new(SeasonCalendar::builtin()),
            limits,
        )
    }

    /// Connect, migrate, and pick the rate-limit store from `config`
    pub async fn connect(config: &AppConfig) -> ServiceResult<Self> {
        let pool = scout_db::connect(&PoolSettings::from(&config.database))
            .await
            .map_err(|e| ServiceError::internal(format!("database connection failed: {e}")))?;
        scout_db::run_migrations(&pool)
            .await
            .map_err(|e| ServiceError::internal(format!("migrations failed: {e}")))?;

        let limiter = CreationRateLimiter::from_config(
            config.redis.as_ref(),
            config.competition.creation_cooldown_secs,
        )?;
        info!(shared_rate_limit = config.redis.is_some(), "Service context ready");
        Ok(Self::postgres(pool, limiter, config.competition.clone()))
    }

    /// Context backed by in-memory repositories and an in-memory rate limiter
    pub fn in_memory(limits: CompetitionConfig) -> Self {
        let rate_limiter = CreationRateLimiter::in_memory(limits.creation_cooldown_secs);
        Self::new(
            Arc::new(InMemoryCompetitionRepository::new()),
            Arc::new(InMemoryParticipantRepository::new()),
            Arc::new(InMemoryPermissionRepository::new()),
            Arc::new(InMemoryPlayerRepository::new()),
            rate_limiter,
            Arc::new(SeasonCalendar::builtin()),
            limits,
        )
    }

    // === Repositories ===

    pub fn competition_repo(&self) -> &dyn CompetitionRepository {
        self.competition_repo.as_ref()
    }

    pub fn participant_repo(&self) -> &dyn ParticipantRepository {
        self.participant_repo.as_ref()
    }

    pub fn permission_repo(&self) -> &dyn PermissionRepository {
        self.permission_repo.as_ref()
    }

    pub fn player_repo(&self) -> &dyn PlayerRepository {
        self.player_repo.as_ref()
    }

    // === Rate limiting ===

    pub fn rate_limiter(&self) -> &CreationRateLimiter {
        &self.rate_limiter
    }

    // === Settings ===

    pub fn seasons(&self) -> &SeasonCalendar {
        self.seasons.as_ref()
    }

    pub fn limits(&self) -> &CompetitionConfig {
        &self.limits
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("rate_limiter", &self.rate_limiter)
            .field("limits", &self.limits)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
///
/// Repositories are required; the rate limiter, calendar and limits fall back
/// to an in-memory limiter, the built-in calendar and default limits.
#[derive(Default)]
pub struct ServiceContextBuilder {
    competition_repo: Option<Arc<dyn CompetitionRepository>>,
    participant_repo: Option<Arc<dyn ParticipantRepository>>,
    permission_repo: Option<Arc<dyn PermissionRepository>>,
    player_repo: Option<Arc<dyn PlayerRepository>>,
    rate_limiter: Option<CreationRateLimiter>,
    seasons: Option<Arc<SeasonCalendar>>,
    limits: Option<CompetitionConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn competition_repo(mut self, repo: Arc<dyn CompetitionRepository>) -> Self {
        self.competition_repo = Some(repo);
        self
    }

    pub fn participant_repo(mut self, repo: Arc<dyn ParticipantRepository>) -> Self {
        self.participant_repo = Some(repo);
        self
    }

    pub fn permission_repo(mut self, repo: Arc<dyn PermissionRepository>) -> Self {
        self.permission_repo = Some(repo);
        self
    }

    pub fn player_repo(mut self, repo: Arc<dyn PlayerRepository>) -> Self {
        self.player_repo = Some(repo);
        self
    }

    pub fn rate_limiter(mut self, limiter: CreationRateLimiter) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    pub fn seasons(mut self, seasons: SeasonCalendar) -> Self {
        self.seasons = Some(Arc::new(seasons));
        self
    }

    pub fn limits(mut self, limits: CompetitionConfig) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any repository is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let limits = self.limits.unwrap_or_default();
        let rate_limiter = self
            .rate_limiter
            .unwrap_or_else(|| CreationRateLimiter::in_memory(limits.creation_cooldown_secs));

        Ok(ServiceContext::new(
            self.competition_repo
                .ok_or_else(|| ServiceError::validation("competition_repo is required"))?,
            self.participant_repo
                .ok_or_else(|| ServiceError::validation("participant_repo is required"))?,
            self.permission_repo
                .ok_or_else(|| ServiceError::validation("permission_repo is required"))?,
            self.player_repo
                .ok_or_else(|| ServiceError::validation("player_repo is required"))?,
            rate_limiter,
            self.seasons
                .unwrap_or_else(|| Arc::new(SeasonCalendar::builtin())),
            limits,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_repositories() {
        let err = ServiceContextBuilder::new().build().unwrap_err();
        assert!(err.to_string().contains("competition_repo"));
    }

    #[test]
    fn test_builder_defaults() {
        let ctx = ServiceContextBuilder::new()
            .competition_repo(Arc::new(InMemoryCompetitionRepository::new()))
            .participant_repo(Arc::new(InMemoryParticipantRepository::new()))
            .permission_repo(Arc::new(InMemoryPermissionRepository::new()))
            .player_repo(Arc::new(InMemoryPlayerRepository::new()))
            .build()
            .unwrap();

        assert_eq!(ctx.limits().max_active_per_server, 5);
        assert_eq!(ctx.rate_limiter().cooldown().as_secs(), 60);
        assert!(ctx.seasons().get("2025_SEASON_1").is_some());
    }
}
