//! Tool output parsers
//!
//! Every parser is a pure function from one tool's output to annotations.
//! Lines a parser does not recognise are skipped.

mod cargo;
mod eslint;
mod rust;
mod stack_trace;
mod typescript;

pub use cargo::{parse_cargo_fmt_output, parse_cargo_json, parse_cargo_test_output};
pub use eslint::parse_eslint_json;
pub use rust::parse_rust_output;
pub use stack_trace::parse_stack_trace;
pub use typescript::parse_typescript_output;

use std::path::Path;

/// Express `file` relative to `root` when it lives under it
pub(crate) fn relativize(file: &str, root: Option<&Path>) -> String {
    let Some(root) = root else {
        return file.to_string();
    };
    Path::new(file)
        .strip_prefix(root)
        .map_or_else(|_| file.to_string(), |rel| rel.to_string_lossy().into_owned())
}
