//! Cargo-specific output: JSON messages, rustfmt diffs, test panics

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::annotation::{Annotation, Level};

// ============================================================================
// cargo --message-format=json
// ============================================================================

#[derive(Debug, Deserialize)]
struct CargoMessage {
    reason: String,
    message: Option<CompilerMessage>,
}

#[derive(Debug, Deserialize)]
struct CompilerMessage {
    message: String,
    code: Option<DiagnosticCode>,
    level: String,
    #[serde(default)]
    spans: Vec<DiagnosticSpan>,
}

#[derive(Debug, Deserialize)]
struct DiagnosticCode {
    code: String,
}

#[derive(Debug, Deserialize)]
struct DiagnosticSpan {
    file_name: String,
    line_start: u32,
    line_end: u32,
    column_start: u32,
    column_end: u32,
    is_primary: bool,
}

/// Parse `cargo build --message-format=json` output
///
/// Only `compiler-message` records with a primary span produce annotations;
/// other records and non-JSON lines are skipped.
pub fn parse_cargo_json(output: &str) -> Vec<Annotation> {
    output
        .lines()
        .filter(|line| line.trim_start().starts_with('{'))
        .filter_map(|line| match serde_json::from_str::<CargoMessage>(line) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(error = %e, "Skipping unreadable cargo message");
                None
            }
        })
        .filter(|record| record.reason == "compiler-message")
        .filter_map(|record| record.message)
        .filter_map(|message| {
            let span = message.spans.iter().find(|s| s.is_primary)?;
            let level = match message.level.as_str() {
                "warning" => Level::Warning,
                "note" | "help" | "failure-note" => Level::Notice,
                _ => Level::Error,
            };
            let annotation = Annotation::new(
                level,
                span.file_name.clone(),
                span.line_start,
                span.column_start,
                message.message.clone(),
            )
            .with_end(Some(span.line_end), Some(span.column_end));
            Some(match message.code {
                Some(code) => annotation.with_title(code.code),
                None => annotation,
            })
        })
        .collect()
}

// ============================================================================
// cargo fmt --check
// ============================================================================

lazy_static! {
    static ref FMT_DIFF_AT_LINE: Regex =
        Regex::new(r"^Diff in (?P<file>.+?) at line (?P<line>\d+):\s*$").unwrap();
    static ref FMT_DIFF_COLON: Regex = Regex::new(r"^Diff in (?P<file>.+):(?P<line>\d+):\s*$").unwrap();
}

/// Parse `cargo fmt --check` output; one annotation per diff hunk
pub fn parse_cargo_fmt_output(output: &str) -> Vec<Annotation> {
    output
        .lines()
        .filter_map(|line| {
            FMT_DIFF_AT_LINE
                .captures(line)
                .or_else(|| FMT_DIFF_COLON.captures(line))
        })
        .map(|caps| {
            Annotation::new(
                Level::Error,
                &caps["file"],
                caps["line"].parse().unwrap_or(1),
                1,
                "Code is not formatted. Run `cargo fmt` to fix.",
            )
            .with_title("rustfmt")
        })
        .collect()
}

// ============================================================================
// cargo test
// ============================================================================

lazy_static! {
    static ref TEST_SECTION: Regex = Regex::new(r"^---- (?P<name>\S+) stdout ----$").unwrap();
    // Rust >= 1.73: location first, message on the following lines
    static ref PANIC_AT_LOCATION: Regex = Regex::new(
        r"^thread '(?P<thread>[^']+)' panicked at (?P<file>[^\s']+?):(?P<line>\d+):(?P<col>\d+):$"
    )
    .unwrap();
    // Older toolchains: quoted message, then the location
    static ref PANIC_QUOTED: Regex =
        Regex::new(r"^thread '(?P<thread>[^']+)' panicked at '(?P<rest>.*)$").unwrap();
    static ref QUOTED_END: Regex = Regex::new(
        r"(?s)^(?P<msg>.*)', (?P<file>[^\s']+):(?P<line>\d+):(?P<col>\d+)$"
    )
    .unwrap();
}

enum Pending {
    Quoted { title: String, buffer: String },
    Located(Annotation),
}

fn finish_quoted(title: &str, buffer: &str) -> Option<Annotation> {
    QUOTED_END.captures(buffer).map(|caps| {
        Annotation::new(
            Level::Error,
            &caps["file"],
            caps["line"].parse().unwrap_or(1),
            caps["col"].parse().unwrap_or(1),
            &caps["msg"],
        )
        .with_title(title)
    })
}

fn ends_panic_message(line: &str) -> bool {
    line.trim().is_empty()
        || line.starts_with("note:")
        || line.starts_with("---- ")
        || line.starts_with("thread '")
        || line.starts_with("stack backtrace:")
        || line.starts_with("failures:")
}

/// Lines a quoted panic message never spans
fn starts_new_block(line: &str) -> bool {
    TEST_SECTION.is_match(line)
        || line.starts_with("thread '")
        || line == "failures:"
        || line.starts_with("test result:")
}

fn close_located(mut annotation: Annotation) -> Annotation {
    if annotation.message.is_empty() {
        annotation.message = "panicked".to_string();
    }
    annotation
}

/// Parse `cargo test` output; one annotation per panic, titled with the test name
pub fn parse_cargo_test_output(output: &str) -> Vec<Annotation> {
    let mut annotations = Vec::new();
    let mut section: Option<String> = None;
    let mut pending: Option<Pending> = None;

    for line in output.lines() {
        match pending.take() {
            Some(Pending::Quoted { title, .. }) if starts_new_block(line) => {
                debug!(test = %title, "Dropping unterminated panic message");
            }
            Some(Pending::Quoted { title, mut buffer }) => {
                buffer.push('\n');
                buffer.push_str(line);
                match finish_quoted(&title, &buffer) {
                    Some(annotation) => annotations.push(annotation),
                    None => pending = Some(Pending::Quoted { title, buffer }),
                }
                continue;
            }
            Some(Pending::Located(mut annotation)) => {
                if ends_panic_message(line) {
                    annotations.push(close_located(annotation));
                } else {
                    if !annotation.message.is_empty() {
                        annotation.message.push('\n');
                    }
                    annotation.message.push_str(line);
                    pending = Some(Pending::Located(annotation));
                    continue;
                }
            }
            None => {}
        }

        if let Some(caps) = TEST_SECTION.captures(line) {
            section = Some(caps["name"].to_string());
            continue;
        }

        if let Some(caps) = PANIC_AT_LOCATION.captures(line) {
            let title = section.clone().unwrap_or_else(|| caps["thread"].to_string());
            pending = Some(Pending::Located(
                Annotation::new(
                    Level::Error,
                    &caps["file"],
                    caps["line"].parse().unwrap_or(1),
                    caps["col"].parse().unwrap_or(1),
                    String::new(),
                )
                .with_title(title),
            ));
            continue;
        }

        if let Some(caps) = PANIC_QUOTED.captures(line) {
            let title = section.clone().unwrap_or_else(|| caps["thread"].to_string());
            let buffer = caps["rest"].to_string();
            match finish_quoted(&title, &buffer) {
                Some(annotation) => annotations.push(annotation),
                None => pending = Some(Pending::Quoted { title, buffer }),
            }
        }
    }

    // An unterminated quoted panic has no location and is dropped
    if let Some(Pending::Located(annotation)) = pending {
        annotations.push(close_located(annotation));
    }
    annotations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cargo_json_primary_span() {
        let output = r#"{"reason":"compiler-artifact","package_id":"demo 0.1.0","target":{}}
{"reason":"compiler-message","package_id":"demo 0.1.0","message":{"message":"mismatched types","code":{"code":"E0308","explanation":null},"level":"error","spans":[{"file_name":"src/other.rs","line_start":1,"line_end":1,"column_start":1,"column_end":2,"is_primary":false},{"file_name":"src/lib.rs","line_start":10,"line_end":10,"column_start":5,"column_end":11,"is_primary":true}],"children":[],"rendered":"error[E0308]: mismatched types"}}
{"reason":"compiler-message","package_id":"demo 0.1.0","message":{"message":"aborting due to 1 previous error","code":null,"level":"error","spans":[],"children":[],"rendered":""}}
   Compiling demo v0.1.0
{"reason":"build-finished","success":false}"#;
        let annotations = parse_cargo_json(output);

        assert_eq!(annotations.len(), 1);
        let a = &annotations[0];
        assert_eq!(a.file, "src/lib.rs");
        assert_eq!((a.line, a.col), (10, 5));
        assert_eq!((a.end_line, a.end_column), (Some(10), Some(11)));
        assert_eq!(a.title.as_deref(), Some("E0308"));
    }

    #[test]
    fn test_fmt_both_header_forms() {
        let output = "\
Diff in /work/demo/src/main.rs at line 1:
 fn main() {
-    println!(\"hi\");
+println!(\"hi\");
Diff in /work/demo/src/lib.rs:12:
";
        let annotations = parse_cargo_fmt_output(output);

        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0].file, "/work/demo/src/main.rs");
        assert_eq!(annotations[0].line, 1);
        assert_eq!(annotations[1].file, "/work/demo/src/lib.rs");
        assert_eq!(annotations[1].line, 12);
        assert_eq!(annotations[1].title.as_deref(), Some("rustfmt"));
    }

    #[test]
    fn test_panic_with_location_first() {
        let output = "\
running 2 tests
test tests::passes ... ok
test tests::fails ... FAILED

failures:

---- tests::fails stdout ----
thread 'tests::fails' panicked at src/lib.rs:10:9:
assertion `left == right` failed
  left: 1
 right: 2
note: run with `RUST_BACKTRACE=1` environment variable to display a backtrace


failures:
    tests::fails
";
        let annotations = parse_cargo_test_output(output);

        assert_eq!(annotations.len(), 1);
        let a = &annotations[0];
        assert_eq!(a.title.as_deref(), Some("tests::fails"));
        assert_eq!(a.file, "src/lib.rs");
        assert_eq!((a.line, a.col), (10, 9));
        assert!(a.message.starts_with("assertion `left == right` failed"));
        assert!(a.message.contains("right: 2"));
    }

    #[test]
    fn test_panic_with_quoted_message() {
        let output = "\
---- tests::single stdout ----
thread 'tests::single' panicked at 'boom', src/lib.rs:3:5
---- tests::multi stdout ----
thread 'tests::multi' panicked at 'assertion failed: `(left == right)`
  left: `1`,
 right: `2`', src/lib.rs:20:9
";
        let annotations = parse_cargo_test_output(output);

        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0].message, "boom");
        assert_eq!(annotations[0].title.as_deref(), Some("tests::single"));
        assert_eq!(annotations[1].line, 20);
        assert!(annotations[1].message.contains("right: `2`"));
    }

    #[test]
    fn test_unterminated_quote_does_not_hide_later_panics() {
        let output = "\
---- tests::garbled stdout ----
thread 'tests::garbled' panicked at 'it's broken
note: run with `RUST_BACKTRACE=1` environment variable to display a backtrace

---- tests::next stdout ----
thread 'tests::next' panicked at src/lib.rs:42:7:
index out of bounds

failures:
    tests::garbled
    tests::next
";
        let annotations = parse_cargo_test_output(output);

        assert_eq!(annotations.len(), 1);
        let a = &annotations[0];
        assert_eq!(a.title.as_deref(), Some("tests::next"));
        assert_eq!((a.file.as_str(), a.line, a.col), ("src/lib.rs", 42, 7));
        assert_eq!(a.message, "index out of bounds");
    }
}
