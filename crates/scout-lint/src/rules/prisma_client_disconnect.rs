//! Test files that create a `PrismaClient` must disconnect it in `afterAll`

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::NodeRef;
use crate::context::{Report, RuleContext};
use crate::diagnostic::Fix;
use crate::error::RuleResult;
use crate::rule::{Rule, RuleKind, RuleMeta, Visitors};

static META: RuleMeta = RuleMeta {
    name: "prisma-client-disconnect",
    kind: RuleKind::Problem,
    description: "Require $disconnect() in afterAll for PrismaClient instances created in tests",
    messages: &[(
        "missingDisconnect",
        "PrismaClient `{{name}}` is never disconnected; add `afterAll(() => {{name}}.$disconnect())`.",
    )],
    fixable: true,
};

const DEFAULT_CLIENT_NAME: &str = "prisma";

pub struct PrismaClientDisconnect;

#[derive(Default)]
struct State<'a> {
    client: Option<(NodeRef<'a>, String)>,
    disconnected: bool,
}

/// Name the new client is bound to, if any
fn binding_name(parent: Option<NodeRef<'_>>) -> Option<String> {
    let parent = parent?;
    let target = match parent.node_type() {
        "VariableDeclarator" => parent.child("id"),
        "AssignmentExpression" => parent.child("left"),
        _ => None,
    }?;
    target
        .identifier_name()
        .or_else(|| target.member_property_name())
        .map(str::to_string)
}

fn inside_after_all(ctx: &RuleContext<'_>) -> bool {
    ctx.ancestors().iter().any(|ancestor| {
        ancestor.is("CallExpression")
            && ancestor
                .child("callee")
                .is_some_and(|callee| callee.is_identifier("afterAll"))
    })
}

fn disconnect_hook(source: &str, client: &str) -> Fix {
    let separator = if source.is_empty() || source.ends_with('\n') { "" } else { "\n" };
    Fix::insert_at(
        source.len(),
        format!("{separator}\nafterAll(async () => {{\n  await {client}.$disconnect();\n}});\n"),
    )
}

impl Rule for PrismaClientDisconnect {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, ctx: &RuleContext<'a>) -> Visitors<'a> {
        if !ctx.is_test_file() {
            return Visitors::new();
        }

        let state = Rc::new(RefCell::new(State::default()));
        let on_new = Rc::clone(&state);
        let on_member = Rc::clone(&state);

        Visitors::new()
            .on("NewExpression", move |ctx, node| {
                let creates_client = node
                    .child("callee")
                    .is_some_and(|callee| callee.is_identifier("PrismaClient"));
                let mut state = on_new.borrow_mut();
                if creates_client && state.client.is_none() {
                    let name = binding_name(ctx.parent()).unwrap_or_else(|| DEFAULT_CLIENT_NAME.to_string());
                    state.client = Some((node, name));
                }
                Ok(())
            })
            .on("MemberExpression", move |ctx, node| {
                if node.member_property_name() == Some("$disconnect") && inside_after_all(ctx) {
                    on_member.borrow_mut().disconnected = true;
                }
                Ok(())
            })
            .on("Program:exit", move |ctx, _| -> RuleResult<()> {
                let state = state.borrow();
                let Some((node, name)) = state.client.as_ref().filter(|_| !state.disconnected) else {
                    return Ok(());
                };
                ctx.report(
                    Report::at_node(*node, "missingDisconnect")?
                        .with_data("name", name.as_str())
                        .with_fix(disconnect_hook(ctx.source(), name)),
                )
            })
    }
}
