//! In-memory repository implementations
//!
//! Same contracts as the PostgreSQL repositories, backed by locked maps.
//! Used by service tests and by the CI tool's local runs.

mod competition;
mod participant;
mod permission;
mod player;

pub use competition::InMemoryCompetitionRepository;
pub use participant::InMemoryParticipantRepository;
pub use permission::InMemoryPermissionRepository;
pub use player::InMemoryPlayerRepository;
