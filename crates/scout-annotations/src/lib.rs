//! # scout-annotations
//!
//! GitHub workflow-command annotations and the parsers that produce them.
//!
//! Each parser is a stateless function over one tool's output:
//!
//! - ESLint JSON formatter output
//! - `tsc` diagnostics
//! - JavaScript stack traces
//! - rustc / clippy human output, `cargo --message-format=json`
//! - `cargo fmt --check` and `cargo test` output
//!
//! ```rust,ignore
//! use scout_annotations::{parse_typescript_output, render_annotations};
//!
//! let annotations = parse_typescript_output(&tsc_stdout);
//! print!("{}", render_annotations(&annotations));
//! ```

pub mod annotation;
pub mod error;
pub mod format;
pub mod parsers;

pub use annotation::{Annotation, Level};
pub use error::{AnnotationError, AnnotationResult};
pub use format::{format_annotation, parse_annotation, render_annotations, summarize, Summary};
pub use parsers::{
    parse_cargo_fmt_output, parse_cargo_json, parse_cargo_test_output, parse_eslint_json,
    parse_rust_output, parse_stack_trace, parse_typescript_output,
};
