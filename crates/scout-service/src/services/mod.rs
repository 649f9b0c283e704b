//! Business logic services
//!
//! Each service borrows the [`ServiceContext`] for the duration of a call.

pub mod competition;
pub mod context;
pub mod error;
pub mod participant;
pub mod permission;

pub use competition::CompetitionService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use participant::ParticipantService;
pub use permission::PermissionService;
