//! Surface knip's unused files and exports as diagnostics

use std::sync::Arc;

use crate::context::{Report, RuleContext, Span};
use crate::rule::{Rule, RuleKind, RuleMeta, Visitors};
use crate::tools::KnipReport;

static META: RuleMeta = RuleMeta {
    name: "no-unused-exports",
    kind: RuleKind::Suggestion,
    description: "Report exports and files that knip found unused",
    messages: &[
        ("unusedExport", "`{{name}}` is exported but never imported (knip)."),
        ("unusedType", "Type `{{name}}` is exported but never imported (knip)."),
        ("unusedFile", "File is not imported anywhere (knip)."),
    ],
    fixable: false,
};

pub struct NoUnusedExports {
    project_root: String,
    report: Arc<KnipReport>,
}

impl NoUnusedExports {
    pub fn new(project_root: impl Into<String>, report: Arc<KnipReport>) -> Self {
        Self {
            project_root: project_root.into(),
            report,
        }
    }
}

fn point(line: Option<u32>, column: Option<u32>) -> Span {
    Span {
        line: line.unwrap_or(1),
        column: column.unwrap_or(1),
        end_line: None,
        end_column: None,
    }
}

impl Rule for NoUnusedExports {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, _ctx: &RuleContext<'a>) -> Visitors<'a> {
        let report = Arc::clone(&self.report);
        let root = self.project_root.clone();

        Visitors::new().on("Program", move |ctx, _| {
            let file = ctx.file_name();
            if report.is_unused_file(file, &root) {
                ctx.report(Report::at(point(None, None), "unusedFile"))?;
            }

            let Some(issues) = report.issues_for(file, &root) else {
                return Ok(());
            };
            for symbol in &issues.exports {
                ctx.report(
                    Report::at(point(symbol.line, symbol.col), "unusedExport").with_data("name", symbol.name.as_str()),
                )?;
            }
            for symbol in &issues.types {
                ctx.report(
                    Report::at(point(symbol.line, symbol.col), "unusedType").with_data("name", symbol.name.as_str()),
                )?;
            }
            Ok(())
        })
    }
}
