//! Disallow `x as T` and `<T>x`
//!
//! `as const` and `as unknown` are allowed; the latter is the usual first half
//! of a double assertion, and the outer one is still reported.

use crate::ast::NodeRef;
use crate::context::{Report, RuleContext};
use crate::error::{RuleError, RuleResult};
use crate::rule::{Rule, RuleKind, RuleMeta, Visitors};

static META: RuleMeta = RuleMeta {
    name: "no-type-assertions",
    kind: RuleKind::Problem,
    description: "Disallow type assertions other than `as const` and `as unknown`",
    messages: &[(
        "noTypeAssertion",
        "Type assertion to `{{type}}` bypasses type checking; narrow with a type guard or validate with a schema instead.",
    )],
    fixable: false,
};

pub struct NoTypeAssertions;

fn is_allowed(annotation: NodeRef<'_>) -> bool {
    annotation.is("TSUnknownKeyword")
        || (annotation.is("TSTypeReference")
            && annotation
                .child("typeName")
                .is_some_and(|name| name.is_identifier("const")))
}

fn check<'a>(ctx: &RuleContext<'a>, node: NodeRef<'a>) -> RuleResult<()> {
    let annotation = node
        .child("typeAnnotation")
        .ok_or_else(|| RuleError::UnexpectedShape(format!("{} without typeAnnotation", node.node_type())))?;
    if is_allowed(annotation) {
        return Ok(());
    }

    let type_text = annotation
        .text(ctx.source())
        .unwrap_or_else(|| annotation.node_type());
    ctx.report(Report::at_node(node, "noTypeAssertion")?.with_data("type", type_text))
}

impl Rule for NoTypeAssertions {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, _ctx: &RuleContext<'a>) -> Visitors<'a> {
        Visitors::new()
            .on("TSAsExpression", check)
            .on("TSTypeAssertion", check)
    }
}
