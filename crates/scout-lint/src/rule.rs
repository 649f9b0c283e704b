//! Rule contract: metadata plus a tag -> handler dispatch table

use std::collections::HashMap;

use crate::ast::NodeRef;
use crate::config::Severity;
use crate::context::RuleContext;
use crate::error::RuleResult;

/// What kind of issue a rule reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Likely bug
    Problem,
    /// Better way to write the same thing
    Suggestion,
    /// Formatting
    Layout,
}

/// Static description of a rule
#[derive(Debug)]
pub struct RuleMeta {
    pub name: &'static str,
    pub kind: RuleKind,
    pub description: &'static str,
    /// `(message_id, template)`; templates interpolate `{{key}}`
    pub messages: &'static [(&'static str, &'static str)],
    pub fixable: bool,
}

impl RuleMeta {
    pub fn message(&self, message_id: &str) -> Option<&'static str> {
        self.messages
            .iter()
            .find(|(id, _)| *id == message_id)
            .map(|(_, template)| *template)
    }

    /// Severity used when the configuration does not mention the rule
    pub fn default_severity(&self) -> Severity {
        match self.kind {
            RuleKind::Problem => Severity::Error,
            RuleKind::Suggestion | RuleKind::Layout => Severity::Warn,
        }
    }
}

pub type Handler<'a> = Box<dyn FnMut(&RuleContext<'a>, NodeRef<'a>) -> RuleResult<()> + 'a>;

/// Handlers keyed by node type, or `<type>:exit` for post-order visits
#[derive(Default)]
pub struct Visitors<'a> {
    handlers: HashMap<String, Vec<Handler<'a>>>,
}

impl<'a> Visitors<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `tag`
    pub fn on<F>(mut self, tag: &str, handler: F) -> Self
    where
        F: FnMut(&RuleContext<'a>, NodeRef<'a>) -> RuleResult<()> + 'a,
    {
        self.handlers
            .entry(tag.to_string())
            .or_default()
            .push(Box::new(handler));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub(crate) fn handlers_for(&mut self, tag: &str) -> Option<&mut Vec<Handler<'a>>> {
        self.handlers.get_mut(tag)
    }
}

impl std::fmt::Debug for Visitors<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<&String> = self.handlers.keys().collect();
        tags.sort();
        f.debug_struct("Visitors").field("tags", &tags).finish()
    }
}

/// A lint rule
///
/// `create` runs once per file; state a rule needs across handlers lives in
/// the closures it returns.
pub trait Rule: Send + Sync {
    fn meta(&self) -> &'static RuleMeta;

    fn create<'a>(&self, ctx: &RuleContext<'a>) -> Visitors<'a>;
}
