//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in scout-core.

mod competition;
mod error;
mod participant;
mod permission;
mod player;

pub use competition::PgCompetitionRepository;
pub use participant::PgParticipantRepository;
pub use permission::PgPermissionRepository;
pub use player::PgPlayerRepository;
