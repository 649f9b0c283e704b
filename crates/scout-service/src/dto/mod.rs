//! Data transfer objects for command inputs and replies
//!
//! - Request DTOs with validation
//! - Response DTOs serialized back to the bot layer
//! - Mappers from domain entities to responses

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{CreateCompetitionRequest, UpdateDatesRequest};
pub use responses::{
    CompetitionResponse, CreationEligibility, JoinEligibility, ParticipantResponse,
};
