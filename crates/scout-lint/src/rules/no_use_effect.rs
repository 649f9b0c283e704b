//! Disallow `useEffect` / `React.useEffect`

use crate::ast::NodeRef;
use crate::context::{Report, RuleContext};
use crate::error::RuleResult;
use crate::rule::{Rule, RuleKind, RuleMeta, Visitors};

static META: RuleMeta = RuleMeta {
    name: "no-use-effect",
    kind: RuleKind::Suggestion,
    description: "Disallow useEffect in components",
    messages: &[(
        "noUseEffect",
        "Avoid useEffect; derive values during render, handle events directly, or use a data-fetching hook.",
    )],
    fixable: false,
};

pub struct NoUseEffect;

fn is_use_effect(callee: NodeRef<'_>) -> bool {
    callee.is_identifier("useEffect")
        || (callee.member_property_name() == Some("useEffect")
            && callee
                .child("object")
                .is_some_and(|object| object.is_identifier("React")))
}

impl Rule for NoUseEffect {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn create<'a>(&self, _ctx: &RuleContext<'a>) -> Visitors<'a> {
        Visitors::new().on("CallExpression", |ctx, node| -> RuleResult<()> {
            match node.child("callee") {
                Some(callee) if is_use_effect(callee) => {
                    ctx.report(Report::at_node(node, "noUseEffect")?)
                }
                _ => Ok(()),
            }
        })
    }
}
