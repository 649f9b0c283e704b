//! ESLint `--format json` output

use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use super::relativize;
use crate::annotation::{Annotation, Level};
use crate::error::AnnotationResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileResult {
    file_path: String,
    #[serde(default)]
    messages: Vec<LintMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LintMessage {
    rule_id: Option<String>,
    severity: u8,
    message: String,
    line: Option<u32>,
    column: Option<u32>,
    end_line: Option<u32>,
    end_column: Option<u32>,
}

/// Parse ESLint JSON output; severity 2 is an error, 1 a warning
///
/// Paths are made relative to `root` when given.
pub fn parse_eslint_json(json: &str, root: Option<&Path>) -> AnnotationResult<Vec<Annotation>> {
    let results: Vec<FileResult> = serde_json::from_str(json)?;

    let mut annotations = Vec::new();
    for result in results {
        let file = relativize(&result.file_path, root);
        for message in result.messages {
            let level = match message.severity {
                2 => Level::Error,
                1 => Level::Warning,
                other => {
                    debug!(severity = other, "Skipping ESLint message");
                    continue;
                }
            };

            let mut annotation = Annotation::new(
                level,
                file.clone(),
                message.line.unwrap_or(1),
                message.column.unwrap_or(1),
                message.message,
            )
            .with_end(message.end_line, message.end_column);
            if let Some(rule_id) = message.rule_id {
                annotation = annotation.with_title(rule_id);
            }
            annotations.push(annotation);
        }
    }

    Ok(annotations)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = r#"[
        {
            "filePath": "/work/repo/packages/backend/src/index.ts",
            "messages": [
                {"ruleId": "no-console", "severity": 1, "message": "Unexpected console statement.", "line": 4, "column": 3, "endLine": 4, "endColumn": 14},
                {"ruleId": null, "severity": 2, "message": "Parsing error: ';' expected.", "line": 9, "column": 1, "fatal": true}
            ],
            "errorCount": 1,
            "warningCount": 1
        },
        {"filePath": "/work/repo/clean.ts", "messages": []}
    ]"#;

    #[test]
    fn test_levels_and_titles() {
        let annotations = parse_eslint_json(OUTPUT, None).unwrap();
        assert_eq!(annotations.len(), 2);

        assert_eq!(annotations[0].level, Level::Warning);
        assert_eq!(annotations[0].title.as_deref(), Some("no-console"));
        assert_eq!(annotations[0].end_column, Some(14));

        assert_eq!(annotations[1].level, Level::Error);
        assert!(annotations[1].title.is_none());
        assert_eq!(annotations[1].line, 9);
    }

    #[test]
    fn test_paths_relative_to_root() {
        let annotations = parse_eslint_json(OUTPUT, Some(Path::new("/work/repo"))).unwrap();
        assert_eq!(annotations[0].file, "packages/backend/src/index.ts");

        let annotations = parse_eslint_json(OUTPUT, Some(Path::new("/elsewhere"))).unwrap();
        assert_eq!(annotations[0].file, "/work/repo/packages/backend/src/index.ts");
    }

    #[test]
    fn test_invalid_json() {
        assert!(parse_eslint_json("not json", None).is_err());
    }
}
