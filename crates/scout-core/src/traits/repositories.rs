//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation (PostgreSQL or in-memory).

use async_trait::async_trait;

use crate::entities::{
    Competition, CompetitionParticipant, NewCompetition, Player, ServerPermission,
};
use crate::error::DomainError;
use crate::value_objects::{CompetitionId, PermissionType, PlayerId, Snowflake};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Competition Repository
// ============================================================================

#[async_trait]
pub trait CompetitionRepository: Send + Sync {
    /// Find competition by ID (cancelled ones included)
    async fn find_by_id(&self, id: CompetitionId) -> RepoResult<Option<Competition>>;

    /// List all competitions in a server, newest first
    async fn find_by_server(&self, server_id: Snowflake) -> RepoResult<Vec<Competition>>;

    /// Insert a competition and return it with its assigned id
    async fn create(&self, competition: &NewCompetition) -> RepoResult<Competition>;

    /// Persist mutable fields (cancellation flag, dates)
    async fn update(&self, competition: &Competition) -> RepoResult<()>;
}

// ============================================================================
// Participant Repository
// ============================================================================

#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    /// Find a participant row
    async fn find(
        &self,
        competition_id: CompetitionId,
        player_id: PlayerId,
    ) -> RepoResult<Option<CompetitionParticipant>>;

    /// List participant rows of a competition (LEFT rows included)
    async fn find_by_competition(
        &self,
        competition_id: CompetitionId,
    ) -> RepoResult<Vec<CompetitionParticipant>>;

    /// Count rows whose status is not LEFT
    async fn count_active(&self, competition_id: CompetitionId) -> RepoResult<i64>;

    /// Insert a participant row
    ///
    /// Fails with `AlreadyParticipant` when the `(competition, player)` key exists.
    async fn create(&self, participant: &CompetitionParticipant) -> RepoResult<()>;

    /// Persist status and timestamps of an existing row
    async fn update(&self, participant: &CompetitionParticipant) -> RepoResult<()>;
}

// ============================================================================
// Permission Repository
// ============================================================================

#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Find a specific grant
    async fn find(
        &self,
        server_id: Snowflake,
        user_id: Snowflake,
        permission: PermissionType,
    ) -> RepoResult<Option<ServerPermission>>;

    /// List all grants in a server
    async fn find_by_server(&self, server_id: Snowflake) -> RepoResult<Vec<ServerPermission>>;

    /// Grant a permission; an existing grant is returned unchanged
    async fn grant(&self, permission: &ServerPermission) -> RepoResult<ServerPermission>;

    /// Delete a grant; returns whether one existed
    async fn revoke(
        &self,
        server_id: Snowflake,
        user_id: Snowflake,
        permission: PermissionType,
    ) -> RepoResult<bool>;
}

// ============================================================================
// Player Repository
// ============================================================================

#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// Find player by ID
    async fn find_by_id(&self, id: PlayerId) -> RepoResult<Option<Player>>;

    /// Find the player linked to a Discord account in a server
    async fn find_by_discord_id(
        &self,
        server_id: Snowflake,
        discord_id: Snowflake,
    ) -> RepoResult<Option<Player>>;

    /// List players tracked in a server
    async fn find_by_server(&self, server_id: Snowflake) -> RepoResult<Vec<Player>>;

    /// Insert a player and return it with its assigned id
    async fn create(
        &self,
        server_id: Snowflake,
        alias: &str,
        discord_id: Option<Snowflake>,
    ) -> RepoResult<Player>;
}
