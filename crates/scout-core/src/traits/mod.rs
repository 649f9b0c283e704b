//! Repository traits

mod repositories;

pub use repositories::{
    CompetitionRepository, ParticipantRepository, PermissionRepository, PlayerRepository,
    RepoResult,
};
