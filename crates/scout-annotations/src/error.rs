//! Annotation errors

use thiserror::Error;

/// Errors raised while reading annotation lines or tool output
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("Not an annotation line: {0}")]
    Malformed(String),

    #[error("Unknown annotation level: {0}")]
    UnknownLevel(String),

    #[error("Missing annotation property: {0}")]
    MissingProperty(&'static str),

    #[error("Invalid value for {property}: {value}")]
    InvalidNumber {
        property: &'static str,
        value: String,
    },

    #[error("Invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AnnotationResult<T> = Result<T, AnnotationError>;
