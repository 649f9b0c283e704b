//! Lint diagnostics, auto-fixes and their CI annotation form

use serde::Serialize;

use scout_annotations::{Annotation, Level};

use crate::config::Severity;

/// Replace `source[range.0..range.1]` with `text`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fix {
    pub range: (usize, usize),
    pub text: String,
}

impl Fix {
    pub fn insert_at(offset: usize, text: impl Into<String>) -> Self {
        Self {
            range: (offset, offset),
            text: text.into(),
        }
    }

    pub fn replace(range: (usize, usize), text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }
}

/// One rule violation in one file; positions are 1-based
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub rule: String,
    pub message_id: String,
    pub message: String,
    pub severity: Severity,
    pub file: String,
    pub line: u32,
    pub column: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
}

impl From<&Diagnostic> for Annotation {
    fn from(diagnostic: &Diagnostic) -> Self {
        let level = match diagnostic.severity {
            Severity::Error => Level::Error,
            Severity::Warn | Severity::Off => Level::Warning,
        };
        Annotation::new(
            level,
            diagnostic.file.clone(),
            diagnostic.line,
            diagnostic.column,
            diagnostic.message.clone(),
        )
        .with_end(diagnostic.end_line, diagnostic.end_column)
        .with_title(diagnostic.rule.clone())
    }
}

/// Result of [`apply_fixes`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixOutcome {
    pub output: String,
    pub applied: usize,
    /// Overlapping or out-of-range fixes left for a later pass
    pub skipped: usize,
}

/// Apply every fix that does not overlap an earlier one
///
/// Fixes are ordered by start offset; ties keep their input order.
pub fn apply_fixes<'f>(source: &str, fixes: impl IntoIterator<Item = &'f Fix>) -> FixOutcome {
    let mut ordered: Vec<&Fix> = fixes.into_iter().collect();
    ordered.sort_by_key(|fix| fix.range.0);

    let mut output = String::with_capacity(source.len());
    let mut cursor = 0;
    let mut applied = 0;
    let mut skipped = 0;

    for fix in ordered {
        let (start, end) = fix.range;
        let in_bounds = start <= end
            && source.get(start..end).is_some()
            && source.get(cursor..start).is_some();
        if start < cursor || !in_bounds {
            skipped += 1;
            continue;
        }
        output.push_str(&source[cursor..start]);
        output.push_str(&fix.text);
        cursor = end;
        applied += 1;
    }
    output.push_str(&source[cursor..]);

    FixOutcome {
        output,
        applied,
        skipped,
    }
}
