//! Domain entities - core business objects

mod competition;
mod participant;
mod player;
mod server_permission;

pub use competition::{
    Competition, CompetitionDates, CompetitionStatus, NewCompetition, Visibility,
};
pub use participant::CompetitionParticipant;
pub use player::Player;
pub use server_permission::ServerPermission;
