//! CI error types

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CiError {
    #[error("Step '{step}' failed with exit code {code:?}\n{stderr_tail}")]
    StepFailed {
        step: String,
        code: Option<i32>,
        stderr_tail: String,
    },

    #[error("Step '{step}' did not finish within {after:?}")]
    StepTimeout { step: String, after: Duration },

    #[error("Failed to start step '{step}': {source}")]
    Spawn {
        step: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Operation {operation} requires --{argument}")]
    MissingArgument {
        operation: &'static str,
        argument: &'static str,
    },

    #[error("Unknown package: {0}")]
    UnknownPackage(String),

    #[error("Smoke test failed: {0}")]
    SmokeTest(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Lint(#[from] scout_lint::LintError),

    #[error(transparent)]
    Annotation(#[from] scout_annotations::AnnotationError),

    #[error(transparent)]
    Tool(#[from] scout_lint::ToolError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CiError {
    /// Short machine-readable kind, used in the final log line
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StepFailed { .. } => "step_failed",
            Self::StepTimeout { .. } => "step_timeout",
            Self::Spawn { .. } => "spawn",
            Self::UnknownOperation(_) => "unknown_operation",
            Self::MissingArgument { .. } => "missing_argument",
            Self::UnknownPackage(_) => "unknown_package",
            Self::SmokeTest(_) => "smoke_test",
            Self::Config(_) => "config",
            Self::Lint(_) => "lint",
            Self::Annotation(_) => "annotation",
            Self::Tool(_) => "tool",
            Self::Io(_) => "io",
        }
    }
}

pub type CiResult<T> = Result<T, CiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_failed_message() {
        let err = CiError::StepFailed {
            step: "backend: bun run typecheck".to_string(),
            code: Some(2),
            stderr_tail: "src/index.ts(10,5): error TS2345".to_string(),
        };
        let message = err.to_string();
        assert!(message.starts_with("Step 'backend: bun run typecheck' failed with exit code Some(2)"));
        assert!(message.ends_with("TS2345"));
        assert_eq!(err.kind(), "step_failed");
    }

    #[test]
    fn test_missing_argument_message() {
        let err = CiError::MissingArgument {
            operation: "publish-backend-image",
            argument: "registry-token",
        };
        assert_eq!(err.to_string(), "Operation publish-backend-image requires --registry-token");
    }
}
