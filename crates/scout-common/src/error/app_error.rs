//! Application error types
//!
//! Unified error handling for the bot commands and the CI tool.

use scout_core::DomainError;
use serde::Serialize;
use std::fmt;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Resource errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    // Rate limiting
    #[error("Rate limited, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: i64 },

    // Database errors
    #[error("Database error: {0}")]
    Database(String),

    // Redis errors
    #[error("Cache error: {0}")]
    Cache(String),

    // knip, jscpd, cargo and friends
    #[error("External tool error: {0}")]
    ExternalTool(String),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Get error code for command replies and logs
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::PermissionDenied(_) => "PERMISSION_DENIED",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::ExternalTool(_) => "EXTERNAL_TOOL_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Domain(e) => e.code(),
        }
    }

    /// Whether the user caused this error (as opposed to an infrastructure fault)
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::Validation(_)
            | Self::NotFound(_)
            | Self::Conflict(_)
            | Self::PermissionDenied(_)
            | Self::RateLimited { .. } => true,
            Self::Database(_)
            | Self::Cache(_)
            | Self::ExternalTool(_)
            | Self::Internal(_)
            | Self::Config(_) => false,
            Self::Domain(e) => !e.is_internal(),
        }
    }

    /// Message safe to show to the invoking user
    ///
    /// Infrastructure failures collapse to a generic sentence; their details
    /// belong in logs only.
    #[must_use]
    pub fn user_message(&self) -> String {
        if self.is_user_error() {
            self.to_string()
        } else {
            "Something went wrong. Please try again later.".to_string()
        }
    }

    /// Create a not found error for a resource type
    #[must_use]
    pub fn not_found(resource: impl fmt::Display) -> Self {
        Self::NotFound(resource.to_string())
    }

    /// Create a validation error
    #[must_use]
    pub fn validation(msg: impl fmt::Display) -> Self {
        Self::Validation(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Reply payload sent back for a failed command
#[derive(Debug, Serialize)]
pub struct ErrorReply {
    pub code: String,
    pub message: String,
    /// Only the invoking user sees the reply
    pub ephemeral: bool,
}

impl From<&AppError> for ErrorReply {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.error_code().to_string(),
            message: err.user_message(),
            ephemeral: true,
        }
    }
}

impl From<AppError> for ErrorReply {
    fn from(err: AppError) -> Self {
        Self::from(&err)
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
