//! Per-file state shared by all rule handlers

use std::cell::{Cell, RefCell};

use crate::ast::NodeRef;
use crate::config::Severity;
use crate::diagnostic::{Diagnostic, Fix};
use crate::error::{RuleError, RuleResult};
use crate::rule::RuleMeta;

/// 1-based span of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: u32,
    pub column: u32,
    pub end_line: Option<u32>,
    pub end_column: Option<u32>,
}

/// A report under construction
#[derive(Debug, Clone)]
pub struct Report {
    message_id: &'static str,
    span: Span,
    data: Vec<(String, String)>,
    fix: Option<Fix>,
}

impl Report {
    /// Report covering `node`
    pub fn at_node(node: NodeRef<'_>, message_id: &'static str) -> RuleResult<Self> {
        let loc = node
            .loc()
            .ok_or_else(|| RuleError::MissingLocation(node.node_type().to_string()))?;
        Ok(Self::at(
            Span {
                line: loc.start.line,
                column: loc.start.column + 1,
                end_line: Some(loc.end.line),
                end_column: Some(loc.end.column + 1),
            },
            message_id,
        ))
    }

    /// Report at an explicit position
    pub fn at(span: Span, message_id: &'static str) -> Self {
        Self {
            message_id,
            span,
            data: Vec::new(),
            fix: None,
        }
    }

    /// Value for a `{{key}}` placeholder
    pub fn with_data(mut self, key: &str, value: impl Into<String>) -> Self {
        self.data.push((key.to_string(), value.into()));
        self
    }

    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fix = Some(fix);
        self
    }
}

fn interpolate(template: &str, data: &[(String, String)]) -> String {
    data.iter().fold(template.to_string(), |message, (key, value)| {
        message.replace(&format!("{{{{{key}}}}}"), value)
    })
}

/// Context handed to every handler while one file is linted
pub struct RuleContext<'a> {
    file_name: &'a str,
    source: &'a str,
    ancestors: RefCell<Vec<NodeRef<'a>>>,
    active: Cell<Option<(&'static RuleMeta, Severity)>>,
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl<'a> RuleContext<'a> {
    pub fn new(file_name: &'a str, source: &'a str) -> Self {
        Self {
            file_name,
            source,
            ancestors: RefCell::new(Vec::new()),
            active: Cell::new(None),
            diagnostics: RefCell::new(Vec::new()),
        }
    }

    pub fn file_name(&self) -> &'a str {
        self.file_name
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Test files by naming convention
    pub fn is_test_file(&self) -> bool {
        let name = self.file_name.replace('\\', "/");
        name.contains(".test.") || name.contains(".spec.") || name.contains("/__tests__/")
    }

    /// Parent of the node being visited
    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.ancestors.borrow().last().copied()
    }

    /// Ancestors of the node being visited, nearest first
    pub fn ancestors(&self) -> Vec<NodeRef<'a>> {
        self.ancestors.borrow().iter().rev().copied().collect()
    }

    /// Emit a diagnostic for the rule whose handler is running
    pub fn report(&self, report: Report) -> RuleResult<()> {
        let (meta, severity) = self.active.get().ok_or(RuleError::NoActiveRule)?;
        let template = meta
            .message(report.message_id)
            .ok_or(RuleError::UnknownMessage {
                rule: meta.name,
                message_id: report.message_id,
            })?;

        self.diagnostics.borrow_mut().push(Diagnostic {
            rule: meta.name.to_string(),
            message_id: report.message_id.to_string(),
            message: interpolate(template, &report.data),
            severity,
            file: self.file_name.to_string(),
            line: report.span.line,
            column: report.span.column,
            end_line: report.span.end_line,
            end_column: report.span.end_column,
            fix: report.fix,
        });
        Ok(())
    }

    // === Linter bookkeeping ===

    pub(crate) fn enter(&self, node: NodeRef<'a>) {
        self.ancestors.borrow_mut().push(node);
    }

    pub(crate) fn leave(&self) {
        self.ancestors.borrow_mut().pop();
    }

    pub(crate) fn activate(&self, meta: &'static RuleMeta, severity: Severity) {
        self.active.set(Some((meta, severity)));
    }

    pub(crate) fn deactivate(&self) {
        self.active.set(None);
    }

    pub(crate) fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics.into_inner()
    }
}

impl std::fmt::Debug for RuleContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleContext")
            .field("file_name", &self.file_name)
            .field("depth", &self.ancestors.borrow().len())
            .finish_non_exhaustive()
    }
}
