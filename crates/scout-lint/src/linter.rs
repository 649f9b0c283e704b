//! Single-pass AST walker with per-tag dispatch

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::ast::NodeRef;
use crate::config::{LintConfig, Severity};
use crate::context::RuleContext;
use crate::diagnostic::Diagnostic;
use crate::error::{LintError, LintResult};
use crate::rule::{Rule, RuleMeta, Visitors};
use crate::rules;
use crate::tools::{JscpdReport, KnipReport};

struct ActiveRule<'a> {
    meta: &'static RuleMeta,
    severity: Severity,
    visitors: Visitors<'a>,
}

/// Runs a set of rules over ESTree documents
#[derive(Clone)]
pub struct Linter {
    rules: Vec<Arc<dyn Rule>>,
    config: LintConfig,
}

impl std::fmt::Debug for Linter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.rules.iter().map(|r| r.meta().name).collect();
        f.debug_struct("Linter")
            .field("rules", &names)
            .field("config", &self.config)
            .finish()
    }
}

impl Linter {
    /// Linter without rules
    pub fn new(config: LintConfig) -> Self {
        Self {
            rules: Vec::new(),
            config,
        }
    }

    /// Linter with every AST-only rule
    pub fn with_builtin_rules(config: LintConfig) -> Self {
        let mut linter = Self::new(config);
        linter.rules.extend(rules::ast_rules());
        linter
    }

    /// Linter with every rule, the tool-backed ones reading the given reports
    pub fn with_project_reports(
        config: LintConfig,
        project_root: impl Into<String>,
        knip: Arc<KnipReport>,
        jscpd: Arc<JscpdReport>,
    ) -> Self {
        let mut linter = Self::with_builtin_rules(config);
        linter
            .rules
            .extend(rules::tool_rules(project_root.into(), knip, jscpd));
        linter
    }

    pub fn add_rule(&mut self, rule: Arc<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> impl Iterator<Item = &'static RuleMeta> + '_ {
        self.rules.iter().map(|r| r.meta())
    }

    pub fn config(&self) -> &LintConfig {
        &self.config
    }

    /// Lint one file given its source and ESTree JSON
    pub fn lint_source(
        &self,
        file_name: &str,
        source: &str,
        ast_json: &str,
    ) -> LintResult<Vec<Diagnostic>> {
        if self.config.is_ignored(file_name) {
            debug!(file = file_name, "File ignored");
            return Ok(Vec::new());
        }
        let ast: Value = serde_json::from_str(ast_json)?;
        self.lint_ast(file_name, source, &ast)
    }

    /// Lint an already parsed ESTree document
    #[instrument(skip(self, source, ast))]
    pub fn lint_ast(
        &self,
        file_name: &str,
        source: &str,
        ast: &Value,
    ) -> LintResult<Vec<Diagnostic>> {
        if self.config.is_ignored(file_name) {
            return Ok(Vec::new());
        }
        let program = NodeRef::new(ast)
            .filter(|node| node.is("Program"))
            .ok_or(LintError::NotAProgram)?;

        let ctx = RuleContext::new(file_name, source);
        let mut active: Vec<ActiveRule<'_>> = self
            .rules
            .iter()
            .filter_map(|rule| {
                let meta = rule.meta();
                let severity = self.config.severity_for(meta.name, meta.default_severity());
                (severity != Severity::Off).then(|| ActiveRule {
                    meta,
                    severity,
                    visitors: rule.create(&ctx),
                })
            })
            .collect();

        walk(&ctx, &mut active, program);
        drop(active);

        let mut diagnostics = ctx.into_diagnostics();
        diagnostics.sort_by(|a, b| (a.line, a.column).cmp(&(b.line, b.column)));
        debug!(count = diagnostics.len(), "File linted");
        Ok(diagnostics)
    }
}

fn walk<'a>(ctx: &RuleContext<'a>, rules: &mut [ActiveRule<'a>], node: NodeRef<'a>) {
    dispatch(ctx, rules, node.node_type(), node);

    ctx.enter(node);
    for child in node.children() {
        walk(ctx, rules, child);
    }
    ctx.leave();

    let exit = format!("{}:exit", node.node_type());
    dispatch(ctx, rules, &exit, node);
}

fn dispatch<'a>(ctx: &RuleContext<'a>, rules: &mut [ActiveRule<'a>], tag: &str, node: NodeRef<'a>) {
    for ActiveRule {
        meta,
        severity,
        visitors,
    } in rules.iter_mut()
    {
        let Some(handlers) = visitors.handlers_for(tag) else {
            continue;
        };

        ctx.activate(*meta, *severity);
        for handler in handlers.iter_mut() {
            if let Err(e) = handler(ctx, node) {
                debug!(rule = meta.name, file = ctx.file_name(), error = %e, "Rule handler failed");
            }
        }
        ctx.deactivate();
    }
}
