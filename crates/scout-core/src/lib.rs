//! # scout-core
//!
//! Domain layer for the competition backend: entities, value objects,
//! repository traits and domain errors.
//! This crate has zero dependencies on infrastructure (database, cache, Discord).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Competition, CompetitionDates, CompetitionParticipant, CompetitionStatus, NewCompetition,
    Player, ServerPermission, Visibility,
};
pub use error::DomainError;
pub use traits::{
    CompetitionRepository, ParticipantRepository, PermissionRepository, PlayerRepository,
    RepoResult,
};
pub use value_objects::{
    CompetitionCriteria, CompetitionId, ParticipantStatus, PermissionType, PlayerId, Queue,
    Season, SeasonCalendar, Snowflake, SnowflakeParseError,
};
