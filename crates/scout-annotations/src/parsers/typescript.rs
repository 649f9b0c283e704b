//! `tsc` diagnostics: `file(line,col): error TS2322: message`

use lazy_static::lazy_static;
use regex::Regex;

use crate::annotation::{Annotation, Level};

lazy_static! {
    static ref TS_DIAGNOSTIC: Regex = Regex::new(
        r"^(?P<file>\S.*?)\((?P<line>\d+),(?P<col>\d+)\): (?P<level>error|warning|message) (?P<code>TS\d+): (?P<msg>.*)$"
    )
    .unwrap();
}

/// Parse `tsc --pretty false` output
///
/// Indented lines continue the previous diagnostic's message.
pub fn parse_typescript_output(output: &str) -> Vec<Annotation> {
    let mut annotations: Vec<Annotation> = Vec::new();

    for line in output.lines() {
        if let Some(caps) = TS_DIAGNOSTIC.captures(line) {
            let level = match &caps["level"] {
                "error" => Level::Error,
                "warning" => Level::Warning,
                _ => Level::Notice,
            };
            annotations.push(
                Annotation::new(
                    level,
                    caps["file"].trim(),
                    caps["line"].parse().unwrap_or(1),
                    caps["col"].parse().unwrap_or(1),
                    &caps["msg"],
                )
                .with_title(&caps["code"]),
            );
            continue;
        }

        if line.starts_with([' ', '\t']) && !line.trim().is_empty() {
            if let Some(last) = annotations.last_mut() {
                last.message.push('\n');
                last.message.push_str(line.trim());
            }
        }
    }

    annotations
}
