//! Lint and tool-runner errors

use std::time::Duration;
use thiserror::Error;

/// Errors that stop linting a file
#[derive(Debug, Error)]
pub enum LintError {
    #[error("Invalid AST JSON: {0}")]
    InvalidAst(#[from] serde_json::Error),

    #[error("AST root is not a Program node")]
    NotAProgram,

    #[error("Invalid ignore pattern {glob}: {source}")]
    InvalidGlob {
        glob: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid lint configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Tool(#[from] ToolError),
}

/// Failure inside one rule handler
///
/// Never escapes the linter; the handler's report is dropped instead.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Rule {rule} has no message {message_id}")]
    UnknownMessage {
        rule: &'static str,
        message_id: &'static str,
    },

    #[error("{0} node has no location")]
    MissingLocation(String),

    #[error("Report outside of a rule handler")]
    NoActiveRule,

    #[error("Unexpected AST shape: {0}")]
    UnexpectedShape(String),
}

/// External analysis tool failures
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("No command configured for {0}")]
    EmptyCommand(&'static str),

    #[error("Failed to start {tool}: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} did not finish within {after:?}")]
    Timeout { tool: &'static str, after: Duration },

    #[error("{tool} exited with code {code:?}: {stderr}")]
    Failed {
        tool: &'static str,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{tool} produced unreadable output: {source}")]
    InvalidOutput {
        tool: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type LintResult<T> = Result<T, LintError>;
pub type RuleResult<T> = Result<T, RuleError>;
