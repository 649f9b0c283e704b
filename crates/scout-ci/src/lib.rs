//! # scout-ci
//!
//! The monorepo's CI entry point. Operations (`check`, `build`, `ci`,
//! `deploy`, per-package `check-package` / `build-package` /
//! `coverage-package`, backend image build/publish/smoke test) are plain
//! async functions in an [`OperationTable`]. They assemble [`Step`]s into
//! [`Stage`]s and hand them to a [`Pipeline`], which runs stages concurrently
//! and fails fast.
//!
//! The same binary converts tool output into workflow annotations and runs
//! the custom lint rules.

pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod operations;
pub mod pipeline;
pub mod secret;

pub use cli::{execute, Cli, Command, InputFormat, Outcome};
pub use config::{BackendConfig, CiConfig, LintSettings, PackageConfig};
pub use error::{CiError, CiResult};
pub use executor::{CommandExecutor, DryRunExecutor, ProcessExecutor, Step, StepOutput};
pub use operations::{Operation, OperationArgs, OperationContext, OperationOutput, OperationTable};
pub use pipeline::{Pipeline, Stage};
pub use secret::Secret;
