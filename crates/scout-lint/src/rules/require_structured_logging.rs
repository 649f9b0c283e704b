//! Disallow `console.*` logging in favour of the structured logger

use crate::context::{Report, RuleContext};
use crate::rule::{Rule, RuleKind, RuleMeta, Visitors};

static META: RuleMeta = RuleMeta {
    name: "require-structured-logging",
    kind: RuleKind::Suggestion,
    description: "Require the structured logger instead of console methods",
    messages: &[(
        "useLogger",
        "Use the structured logger instead of console.{{method}}().",
    )],
    fixable: false,
};

const CONSOLE_METHODS: &[&str] = &["log", "info", "warn", "error", "debug"];

pub struct RequireStructuredLogging;

impl Rule for RequireStructuredLogging {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, _ctx: &RuleContext<'a>) -> Visitors<'a> {
        Visitors::new().on("CallExpression", |ctx, node| {
            let Some(callee) = node.child("callee") else {
                return Ok(());
            };
            let Some(method) = callee.member_property_name() else {
                return Ok(());
            };
            let on_console = callee
                .child("object")
                .is_some_and(|object| object.is_identifier("console"));

            if on_console && CONSOLE_METHODS.contains(&method) {
                ctx.report(Report::at_node(node, "useLogger")?.with_data("method", method))?;
            }
            Ok(())
        })
    }
}
