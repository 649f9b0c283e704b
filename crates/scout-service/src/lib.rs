//! # scout-service
//!
//! Application layer: competition, participant and permission workflows.
//!
//! Every operation follows the same shape: fetch, validate, one write, return.
//! Services borrow a [`ServiceContext`] that owns the repositories, the
//! creation rate limiter and the season calendar.

pub mod dto;
pub mod services;

pub use dto::{
    CompetitionResponse, CreateCompetitionRequest, CreationEligibility, JoinEligibility,
    ParticipantResponse, UpdateDatesRequest,
};
pub use services::{
    CompetitionService, ParticipantService, PermissionService, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult,
};
