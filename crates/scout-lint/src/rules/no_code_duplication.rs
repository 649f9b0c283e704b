//! Surface jscpd clones as diagnostics on both copies

use std::sync::Arc;

use crate::context::{Report, RuleContext, Span};
use crate::rule::{Rule, RuleKind, RuleMeta, Visitors};
use crate::tools::{JscpdLocation, JscpdReport};

static META: RuleMeta = RuleMeta {
    name: "no-code-duplication",
    kind: RuleKind::Suggestion,
    description: "Report code blocks that jscpd found duplicated",
    messages: &[(
        "duplicate",
        "{{lines}} lines duplicated in {{other}}:{{otherLine}} (jscpd).",
    )],
    fixable: false,
};

pub struct NoCodeDuplication {
    project_root: String,
    report: Arc<JscpdReport>,
}

impl NoCodeDuplication {
    pub fn new(project_root: impl Into<String>, report: Arc<JscpdReport>) -> Self {
        Self {
            project_root: project_root.into(),
            report,
        }
    }
}

fn span_of(location: &JscpdLocation) -> Span {
    Span {
        line: location.start,
        column: 1,
        end_line: Some(location.end),
        end_column: None,
    }
}

impl Rule for NoCodeDuplication {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, _ctx: &RuleContext<'a>) -> Visitors<'a> {
        let report = Arc::clone(&self.report);
        let root = self.project_root.clone();

        Visitors::new().on("Program", move |ctx, _| {
            for clone in report.clones_in(ctx.file_name(), &root) {
                ctx.report(
                    Report::at(span_of(clone.here), "duplicate")
                        .with_data("lines", clone.lines.to_string())
                        .with_data("other", clone.other.name.as_str())
                        .with_data("otherLine", clone.other.start.to_string()),
                )?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{lint, program};

    fn report() -> Arc<JscpdReport> {
        let raw = r#"{
            "duplicates": [{
                "format": "typescript",
                "lines": 14,
                "firstFile": {"name": "src/a.ts", "start": 10, "end": 23},
                "secondFile": {"name": "src/b.ts", "start": 40, "end": 53}
            }]
        }"#;
        Arc::new(serde_json::from_str(raw).unwrap())
    }

    #[test]
    fn test_both_sides_reported() {
        let first = lint(NoCodeDuplication::new("/repo", report()), "/repo/src/a.ts", "", &program(vec![]));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].line, 10);
        assert_eq!(first[0].end_line, Some(23));
        assert_eq!(first[0].message, "14 lines duplicated in src/b.ts:40 (jscpd).");

        let second = lint(NoCodeDuplication::new("/repo", report()), "src/b.ts", "", &program(vec![]));
        assert_eq!(second.len(), 1);
        assert!(second[0].message.ends_with("src/a.ts:10 (jscpd)."));
    }

    #[test]
    fn test_unrelated_file() {
        let diagnostics = lint(NoCodeDuplication::new("/repo", report()), "/repo/src/c.ts", "", &program(vec![]));
        assert!(diagnostics.is_empty());
    }
}
