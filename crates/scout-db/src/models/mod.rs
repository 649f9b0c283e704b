//! Database models - SQLx-compatible structs for PostgreSQL tables

mod competition;
mod participant;
mod permission;
mod player;

pub use competition::CompetitionModel;
pub use participant::ParticipantModel;
pub use permission::ServerPermissionModel;
pub use player::PlayerModel;
