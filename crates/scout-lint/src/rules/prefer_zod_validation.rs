//! Require schema validation of parsed JSON
//!
//! `JSON.parse(..)` and `await response.json()` must appear (within a few
//! levels) inside the arguments of a `schema.parse`-style call.

use crate::ast::NodeRef;
use crate::context::{Report, RuleContext};
use crate::error::RuleResult;
use crate::rule::{Rule, RuleKind, RuleMeta, Visitors};

static META: RuleMeta = RuleMeta {
    name: "prefer-zod-validation",
    kind: RuleKind::Problem,
    description: "Require Zod validation of JSON.parse and response.json results",
    messages: &[(
        "unvalidatedJson",
        "Result of {{source}} is used without schema validation; pass it through a Zod schema's parse or safeParse.",
    )],
    fixable: false,
};

const SCHEMA_METHODS: &[&str] = &["parse", "safeParse", "parseAsync", "safeParseAsync"];

/// How far up the tree a validating call may sit
const MAX_PARENT_DEPTH: usize = 4;

pub struct PreferZodValidation;

fn is_json_parse(call: NodeRef<'_>) -> bool {
    call.child("callee").is_some_and(|callee| {
        callee.member_property_name() == Some("parse")
            && callee
                .child("object")
                .is_some_and(|object| object.is_identifier("JSON"))
    })
}

fn is_schema_call(call: NodeRef<'_>) -> bool {
    call.is("CallExpression")
        && call.child("callee").is_some_and(|callee| {
            callee
                .member_property_name()
                .is_some_and(|name| SCHEMA_METHODS.contains(&name))
                && !callee
                    .child("object")
                    .is_some_and(|object| object.is_identifier("JSON"))
        })
}

fn is_function_boundary(node: NodeRef<'_>) -> bool {
    matches!(
        node.node_type(),
        "FunctionDeclaration" | "FunctionExpression" | "ArrowFunctionExpression"
    )
}

fn is_validated(ctx: &RuleContext<'_>, node: NodeRef<'_>) -> bool {
    let mut child = node;
    for ancestor in ctx.ancestors().into_iter().take(MAX_PARENT_DEPTH) {
        if is_function_boundary(ancestor) {
            return false;
        }
        if is_schema_call(ancestor)
            && !ancestor
                .child("callee")
                .is_some_and(|callee| callee.same(&child))
        {
            return true;
        }
        child = ancestor;
    }
    false
}

impl Rule for PreferZodValidation {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, _ctx: &RuleContext<'a>) -> Visitors<'a> {
        Visitors::new()
            .on("CallExpression", |ctx, node| -> RuleResult<()> {
                if is_json_parse(node) && !is_validated(ctx, node) {
                    ctx.report(Report::at_node(node, "unvalidatedJson")?.with_data("source", "JSON.parse()"))?;
                }
                Ok(())
            })
            .on("AwaitExpression", |ctx, node| {
                let Some(call) = node.child("argument").filter(|arg| arg.is("CallExpression")) else {
                    return Ok(());
                };
                let Some(callee) = call.child("callee") else {
                    return Ok(());
                };
                if callee.member_property_name() != Some("json") || !call.child_list("arguments").is_empty() {
                    return Ok(());
                }
                if is_validated(ctx, node) {
                    return Ok(());
                }

                let receiver = callee
                    .child("object")
                    .and_then(|object| object.text(ctx.source()))
                    .unwrap_or("response");
                ctx.report(
                    Report::at_node(node, "unvalidatedJson")?.with_data("source", format!("{receiver}.json()")),
                )
            })
    }
}
