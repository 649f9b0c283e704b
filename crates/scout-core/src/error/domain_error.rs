//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{CompetitionId, ParticipantStatus, PermissionType, PlayerId};

/// Domain layer errors
///
/// Display strings are shown to Discord users as-is, so they stay plain.
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Competition {0} not found")]
    CompetitionNotFound(CompetitionId),

    #[error("Player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("Player {player_id} is not a participant in competition {competition_id}")]
    ParticipantNotFound {
        competition_id: CompetitionId,
        player_id: PlayerId,
    },

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid dates: {0}")]
    InvalidDates(String),

    #[error("Invalid criteria: {0}")]
    InvalidCriteria(String),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Missing permission: {0}")]
    MissingPermission(PermissionType),

    #[error("Only the competition owner or a server admin can do this")]
    NotCompetitionOwner,

    #[error("You are creating competitions too quickly; try again in {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: i64 },

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Already a participant in this competition")]
    AlreadyParticipant,

    #[error("Already invited to this competition")]
    AlreadyInvited,

    #[error("Competition {0} is already cancelled")]
    AlreadyCancelled(CompetitionId),

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Cannot rejoin a competition after leaving")]
    CannotRejoin,

    #[error("Competition is full: reached maximum participants ({max})")]
    CompetitionFull { max: i32 },

    #[error("Competition {0} is invite-only")]
    InviteOnly(CompetitionId),

    #[error("Competition {0} has been cancelled")]
    CompetitionCancelled(CompetitionId),

    #[error("Competition {0} has ended")]
    CompetitionEnded(CompetitionId),

    #[error("Player has no pending invitation to this competition")]
    NotInvited,

    #[error("Cannot change participant status from {from} to {to}")]
    InvalidStatusTransition {
        from: ParticipantStatus,
        to: ParticipantStatus,
    },

    #[error("Server already has the maximum number of active competitions ({max})")]
    TooManyActiveCompetitions { max: usize },

    #[error("You already own an active competition in this server")]
    OwnerHasActiveCompetition,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for logs and structured responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::CompetitionNotFound(_) => "UNKNOWN_COMPETITION",
            Self::PlayerNotFound(_) => "UNKNOWN_PLAYER",
            Self::ParticipantNotFound { .. } => "UNKNOWN_PARTICIPANT",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidDates(_) => "INVALID_DATES",
            Self::InvalidCriteria(_) => "INVALID_CRITERIA",

            // Authorization
            Self::MissingPermission(_) => "MISSING_PERMISSIONS",
            Self::NotCompetitionOwner => "NOT_COMPETITION_OWNER",
            Self::RateLimited { .. } => "RATE_LIMITED",

            // Conflict
            Self::AlreadyParticipant => "ALREADY_PARTICIPANT",
            Self::AlreadyInvited => "ALREADY_INVITED",
            Self::AlreadyCancelled(_) => "ALREADY_CANCELLED",

            // Business Rules
            Self::CannotRejoin => "CANNOT_REJOIN",
            Self::CompetitionFull { .. } => "COMPETITION_FULL",
            Self::InviteOnly(_) => "INVITE_ONLY",
            Self::CompetitionCancelled(_) => "COMPETITION_CANCELLED",
            Self::CompetitionEnded(_) => "COMPETITION_ENDED",
            Self::NotInvited => "NOT_INVITED",
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::TooManyActiveCompetitions { .. } => "TOO_MANY_ACTIVE_COMPETITIONS",
            Self::OwnerHasActiveCompetition => "OWNER_HAS_ACTIVE_COMPETITION",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CompetitionNotFound(_)
                | Self::PlayerNotFound(_)
                | Self::ParticipantNotFound { .. }
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_) | Self::InvalidDates(_) | Self::InvalidCriteria(_)
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::MissingPermission(_) | Self::NotCompetitionOwner | Self::RateLimited { .. }
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::AlreadyParticipant | Self::AlreadyInvited | Self::AlreadyCancelled(_)
        )
    }

    /// Check if this is a business rule violation
    pub fn is_rule_violation(&self) -> bool {
        matches!(
            self,
            Self::CannotRejoin
                | Self::CompetitionFull { .. }
                | Self::InviteOnly(_)
                | Self::CompetitionCancelled(_)
                | Self::CompetitionEnded(_)
                | Self::NotInvited
                | Self::InvalidStatusTransition { .. }
                | Self::TooManyActiveCompetitions { .. }
                | Self::OwnerHasActiveCompetition
        )
    }

    /// Infrastructure failures should not leak details to end users
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_) | Self::CacheError(_) | Self::InternalError(_)
        )
    }
}
