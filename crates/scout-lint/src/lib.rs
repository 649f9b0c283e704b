//! # scout-lint
//!
//! Custom lint rules for the TypeScript packages, run over ESTree JSON.
//!
//! A rule declares its [`RuleMeta`] and builds a [`Visitors`] table that maps
//! node-type tags (`CallExpression`, `Program:exit`, ...) to handlers. The
//! [`Linter`] walks each file once, keeps the ancestor stack, and dispatches
//! every node to the handlers registered for its tag.
//!
//! Two rules are backed by whole-project tools (knip, jscpd) whose reports
//! come from the [`ToolRunner`] and are cached per project root.
//!
//! ```rust,ignore
//! use scout_lint::{LintConfig, Linter};
//!
//! let linter = Linter::with_builtin_rules(LintConfig::default());
//! let diagnostics = linter.lint_source("src/app.ts", &source, &ast_json)?;
//! ```

pub mod ast;
pub mod config;
pub mod context;
pub mod diagnostic;
pub mod error;
pub mod linter;
pub mod rule;
pub mod rules;
pub mod tools;

pub use ast::{NodeRef, Position, SourceLocation};
pub use config::{LintConfig, Severity};
pub use context::{Report, RuleContext};
pub use diagnostic::{apply_fixes, Diagnostic, Fix, FixOutcome};
pub use error::{LintError, LintResult, RuleError, RuleResult, ToolError};
pub use linter::Linter;
pub use rule::{Rule, RuleKind, RuleMeta, Visitors};
pub use tools::{JscpdReport, KnipReport, ToolRunner, ToolSettings};
