//! Workflow-command line format
//!
//! `::{level} file={path},line={n},col={n}[,endLine=..][,endColumn=..][,title=..]::{message}`
//!
//! Messages escape `%`, CR and LF. Property values additionally escape `:`
//! and `,` so a value can never end the property list early.

use serde::Serialize;
use std::fmt;

use crate::annotation::{Annotation, Level};
use crate::error::{AnnotationError, AnnotationResult};

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

// %25 last, otherwise an escaped "%0A" literal would be decoded twice
fn unescape(value: &str) -> String {
    value
        .replace("%0D", "\r")
        .replace("%0A", "\n")
        .replace("%3A", ":")
        .replace("%2C", ",")
        .replace("%25", "%")
}

/// Render one annotation as a workflow command
pub fn format_annotation(annotation: &Annotation) -> String {
    let mut props = vec![
        format!("file={}", escape_property(&annotation.file)),
        format!("line={}", annotation.line),
        format!("col={}", annotation.col),
    ];
    if let Some(end_line) = annotation.end_line {
        props.push(format!("endLine={end_line}"));
    }
    if let Some(end_column) = annotation.end_column {
        props.push(format!("endColumn={end_column}"));
    }
    if let Some(title) = &annotation.title {
        props.push(format!("title={}", escape_property(title)));
    }

    format!(
        "::{} {}::{}",
        annotation.level,
        props.join(","),
        escape_data(&annotation.message)
    )
}

fn parse_number(property: &'static str, value: &str) -> AnnotationResult<u32> {
    value.parse().map_err(|_| AnnotationError::InvalidNumber {
        property,
        value: value.to_string(),
    })
}

/// Parse a line produced by [`format_annotation`]
pub fn parse_annotation(line: &str) -> AnnotationResult<Annotation> {
    let line = line.trim_end_matches(['\r', '\n']);
    let body = line
        .strip_prefix("::")
        .ok_or_else(|| AnnotationError::Malformed(line.to_string()))?;
    let (head, message) = body
        .split_once("::")
        .ok_or_else(|| AnnotationError::Malformed(line.to_string()))?;
    let (level, props) = head.split_once(' ').unwrap_or((head, ""));
    let level: Level = level.parse()?;

    let mut file = None;
    let mut line_no = None;
    let mut col = None;
    let mut end_line = None;
    let mut end_column = None;
    let mut title = None;

    for prop in props.split(',').filter(|p| !p.is_empty()) {
        let (key, value) = prop
            .split_once('=')
            .ok_or_else(|| AnnotationError::Malformed(line.to_string()))?;
        match key {
            "file" => file = Some(unescape(value)),
            "line" => line_no = Some(parse_number("line", value)?),
            "col" => col = Some(parse_number("col", value)?),
            "endLine" => end_line = Some(parse_number("endLine", value)?),
            "endColumn" => end_column = Some(parse_number("endColumn", value)?),
            "title" => title = Some(unescape(value)),
            // Unknown properties are tolerated
            _ => {}
        }
    }

    Ok(Annotation {
        level,
        file: file.ok_or(AnnotationError::MissingProperty("file"))?,
        line: line_no.ok_or(AnnotationError::MissingProperty("line"))?,
        col: col.ok_or(AnnotationError::MissingProperty("col"))?,
        end_line,
        end_column,
        title,
        message: unescape(message),
    })
}

/// One formatted line per annotation, newline terminated
pub fn render_annotations(annotations: &[Annotation]) -> String {
    annotations
        .iter()
        .map(|a| format_annotation(a) + "\n")
        .collect()
}

/// Per-level counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub notices: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.notices
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} error(s), {} warning(s), {} notice(s)",
            self.errors, self.warnings, self.notices
        )
    }
}

pub fn summarize(annotations: &[Annotation]) -> Summary {
    annotations
        .iter()
        .fold(Summary::default(), |mut summary, a| {
            match a.level {
                Level::Error => summary.errors += 1,
                Level::Warning => summary.warnings += 1,
                Level::Notice => summary.notices += 1,
            }
            summary
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_minimal() {
        let annotation = Annotation::new(Level::Warning, "src/index.ts", 3, 7, "Unexpected console");
        assert_eq!(
            format_annotation(&annotation),
            "::warning file=src/index.ts,line=3,col=7::Unexpected console"
        );
    }

    #[test]
    fn test_format_escapes() {
        let annotation = Annotation::new(Level::Error, "a,b:c.ts", 1, 1, "100% broken\nsecond line")
            .with_title("rule: x, y")
            .with_end(Some(2), Some(4));
        let line = format_annotation(&annotation);

        assert_eq!(
            line,
            "::error file=a%2Cb%3Ac.ts,line=1,col=1,endLine=2,endColumn=4,title=rule%3A x%2C y::100%25 broken%0Asecond line"
        );
        assert_eq!(parse_annotation(&line).unwrap(), annotation);
    }

    #[test]
    fn test_message_keeps_colons() {
        let line = "::notice file=x.rs,line=9,col=2::note: see https://example.com";
        let parsed = parse_annotation(line).unwrap();
        assert_eq!(parsed.message, "note: see https://example.com");
        assert_eq!(parsed.level, Level::Notice);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_annotation("error: something"),
            Err(AnnotationError::Malformed(_))
        ));
        assert!(matches!(
            parse_annotation("::fatal file=a,line=1,col=1::x"),
            Err(AnnotationError::UnknownLevel(_))
        ));
        assert!(matches!(
            parse_annotation("::error line=1,col=1::x"),
            Err(AnnotationError::MissingProperty("file"))
        ));
        assert!(matches!(
            parse_annotation("::error file=a,line=one,col=1::x"),
            Err(AnnotationError::InvalidNumber { property: "line", .. })
        ));
    }

    #[test]
    fn test_literal_percent_sequences_survive() {
        let annotation = Annotation::new(Level::Error, "f.ts", 1, 1, "literal %0A stays");
        let parsed = parse_annotation(&format_annotation(&annotation)).unwrap();
        assert_eq!(parsed.message, "literal %0A stays");
    }

    #[test]
    fn test_render_and_summarize() {
        let annotations = vec![
            Annotation::new(Level::Error, "a.ts", 1, 1, "one"),
            Annotation::new(Level::Warning, "b.ts", 2, 1, "two"),
            Annotation::new(Level::Error, "c.ts", 3, 1, "three"),
        ];
        let rendered = render_annotations(&annotations);
        assert_eq!(rendered.lines().count(), 3);
        assert!(rendered.ends_with('\n'));

        let summary = summarize(&annotations);
        assert_eq!(summary, Summary { errors: 2, warnings: 1, notices: 0 });
        assert_eq!(summary.total(), 3);
        assert!(summary.has_errors());
    }
}
