//! rustc / clippy human-readable diagnostics
//!
//! ```text
//! error[E0308]: mismatched types
//!  --> src/lib.rs:10:5
//! warning: this `if` has identical blocks
//!  --> src/lib.rs:4:5
//!   = note: `#[warn(clippy::if_same_then_else)]` on by default
//! ```

use lazy_static::lazy_static;
use regex::Regex;

use crate::annotation::{Annotation, Level};

lazy_static! {
    static ref HEADER: Regex =
        Regex::new(r"^(?P<level>error|warning)(?:\[(?P<code>[^\]]+)\])?: (?P<msg>.+)$").unwrap();
    static ref LOCATION: Regex =
        Regex::new(r"^\s*--> (?P<file>.+?):(?P<line>\d+):(?P<col>\d+)\s*$").unwrap();
    static ref LINT_NOTE: Regex =
        Regex::new(r"#\[(?:warn|deny|forbid)\((?P<lint>[\w:]+)\)\]").unwrap();
    static ref SUMMARY: Regex = Regex::new(
        r"^(?:warning|error): (?:`[^`]+` \(.+\) generated \d+ warnings?|aborting due to|could not compile|build failed)"
    )
    .unwrap();
}

struct Pending {
    level: Level,
    title: Option<String>,
    message: String,
    location: Option<(String, u32, u32)>,
}

impl Pending {
    fn into_annotation(self) -> Option<Annotation> {
        let (file, line, col) = self.location?;
        let annotation = Annotation::new(self.level, file, line, col, self.message);
        Some(match self.title {
            Some(title) => annotation.with_title(title),
            None => annotation,
        })
    }
}

/// Parse `cargo build` / `cargo clippy` output without `--message-format`
///
/// Diagnostics without a `-->` location and the trailing summary lines are
/// skipped. The title is the error code, or the lint name from the
/// `#[warn(..)]` note when there is no code.
pub fn parse_rust_output(output: &str) -> Vec<Annotation> {
    let mut annotations = Vec::new();
    let mut current: Option<Pending> = None;

    for line in output.lines() {
        if SUMMARY.is_match(line) {
            annotations.extend(current.take().and_then(Pending::into_annotation));
            continue;
        }

        if let Some(caps) = HEADER.captures(line) {
            annotations.extend(current.take().and_then(Pending::into_annotation));
            current = Some(Pending {
                level: if &caps["level"] == "error" {
                    Level::Error
                } else {
                    Level::Warning
                },
                title: caps.name("code").map(|m| m.as_str().to_string()),
                message: caps["msg"].to_string(),
                location: None,
            });
            continue;
        }

        let Some(pending) = current.as_mut() else {
            continue;
        };

        if pending.location.is_none() {
            if let Some(caps) = LOCATION.captures(line) {
                pending.location = Some((
                    caps["file"].to_string(),
                    caps["line"].parse().unwrap_or(1),
                    caps["col"].parse().unwrap_or(1),
                ));
                continue;
            }
        }

        if pending.title.is_none() {
            if let Some(caps) = LINT_NOTE.captures(line) {
                pending.title = Some(caps["lint"].to_string());
            }
        }
    }

    annotations.extend(current.and_then(Pending::into_annotation));
    annotations
}
