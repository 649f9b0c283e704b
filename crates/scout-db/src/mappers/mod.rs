//! Entity to model mappers
//!
//! - `TryFrom<Model> for Entity`: rows carry enum text and JSON documents that
//!   may fail to decode if the table was edited by hand
//! - `*Insert` structs: prepare entity data for database writes

mod competition;
mod participant;
mod permission;
mod player;

pub use competition::CompetitionInsert;
pub(crate) use competition::encode_dates;
pub use participant::ParticipantWrite;

use scout_core::DomainError;

/// Error for a stored value that no longer decodes into a domain type
pub(crate) fn corrupt_column(column: &str, detail: impl std::fmt::Display) -> DomainError {
    DomainError::DatabaseError(format!("Invalid value in column {column}: {detail}"))
}
