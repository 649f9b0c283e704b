//! JavaScript stack traces
//!
//! ```text
//! TypeError: Cannot read properties of undefined (reading 'id')
//!     at getUser (/app/src/users.ts:14:22)
//!     at async main (/app/src/index.ts:5:3)
//! ```

use lazy_static::lazy_static;
use regex::Regex;

use crate::annotation::{Annotation, Level};

lazy_static! {
    static ref ERROR_HEADER: Regex =
        Regex::new(r"^\s*(?:Uncaught )?(?P<name>(?:[A-Za-z_$][\w$]*)?(?:Error|Exception)): (?P<msg>.*)$")
            .unwrap();
    /// `at fn (location)`
    static ref CALL_FRAME: Regex =
        Regex::new(r"^\s+at .*? \((?P<file>.+):(?P<line>\d+):(?P<col>\d+)\)\s*$").unwrap();
    /// `at location`
    static ref BARE_FRAME: Regex =
        Regex::new(r"^\s+at (?P<file>[^\s(].*):(?P<line>\d+):(?P<col>\d+)\s*$").unwrap();
}

struct Trace {
    name: String,
    message: String,
    location: Option<(String, u32, u32)>,
}

impl Trace {
    fn into_annotation(self) -> Option<Annotation> {
        let (file, line, col) = self.location?;
        Some(Annotation::new(Level::Error, file, line, col, self.message).with_title(self.name))
    }
}

fn is_internal_frame(file: &str) -> bool {
    file.contains("node_modules") || file.starts_with("node:") || file.starts_with("internal/")
}

/// One annotation per trace, pinned to its first application frame
///
/// Traces whose frames are all inside dependencies or the runtime are dropped.
pub fn parse_stack_trace(output: &str) -> Vec<Annotation> {
    let mut annotations = Vec::new();
    let mut current: Option<Trace> = None;

    for line in output.lines() {
        if let Some(caps) = ERROR_HEADER.captures(line) {
            if let Some(done) = current.take().and_then(Trace::into_annotation) {
                annotations.push(done);
            }
            current = Some(Trace {
                name: caps["name"].to_string(),
                message: caps["msg"].to_string(),
                location: None,
            });
            continue;
        }

        let Some(trace) = current.as_mut() else {
            continue;
        };
        if trace.location.is_some() {
            continue;
        }
        if let Some(caps) = CALL_FRAME
            .captures(line)
            .or_else(|| BARE_FRAME.captures(line))
        {
            let file = caps["file"].trim_start_matches("file://");
            if !is_internal_frame(file) {
                trace.location = Some((
                    file.to_string(),
                    caps["line"].parse().unwrap_or(1),
                    caps["col"].parse().unwrap_or(1),
                ));
            }
        }
    }

    if let Some(done) = current.and_then(Trace::into_annotation) {
        annotations.push(done);
    }
    annotations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_application_frame() {
        let output = "\
TypeError: Cannot read properties of undefined (reading 'id')
    at Object.get (/app/node_modules/@prisma/client/runtime/library.js:123:45)
    at getUser (/app/src/users.ts:14:22)
    at async main (/app/src/index.ts:5:3)
    at node:internal/process/task_queues:95:5";
        let annotations = parse_stack_trace(output);

        assert_eq!(annotations.len(), 1);
        let a = &annotations[0];
        assert_eq!(a.file, "/app/src/users.ts");
        assert_eq!((a.line, a.col), (14, 22));
        assert_eq!(a.title.as_deref(), Some("TypeError"));
        assert_eq!(a.message, "Cannot read properties of undefined (reading 'id')");
    }

    #[test]
    fn test_anonymous_frames_and_file_urls() {
        let output = "\
Error: boom
    at file:///repo/scripts/seed.ts:7:11
RangeError: Invalid array length
    at node:internal/modules/run_main:1:1";
        let annotations = parse_stack_trace(output);

        // The second trace has no application frame
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].file, "/repo/scripts/seed.ts");
        assert_eq!(annotations[0].line, 7);
    }

    #[test]
    fn test_paths_with_parentheses_and_spaces() {
        let output = "\
Error: not signed in
    at LoginPage (/app/src/app/(auth)/login/page.tsx:9:3)
TypeError: port is not a number
    at /srv/my app/server.js:4:1";
        let annotations = parse_stack_trace(output);

        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0].file, "/app/src/app/(auth)/login/page.tsx");
        assert_eq!((annotations[0].line, annotations[0].col), (9, 3));
        assert_eq!(annotations[1].file, "/srv/my app/server.js");
        assert_eq!((annotations[1].line, annotations[1].col), (4, 1));
    }
}
