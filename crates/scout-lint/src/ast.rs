//! Read-only view over an ESTree JSON document
//!
//! The AST is kept as `serde_json::Value`; [`NodeRef`] is a cheap copyable
//! handle to one node (any object carrying a string `type`).

use serde::Deserialize;
use serde_json::Value;

/// 1-based line, 0-based column, as ESTree reports them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SourceLocation {
    pub start: Position,
    pub end: Position,
}

// Metadata fields that never hold child nodes worth visiting
const SKIPPED_FIELDS: &[&str] = &["type", "loc", "range", "parent", "tokens", "comments"];

#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    value: &'a Value,
}

impl<'a> NodeRef<'a> {
    /// Wrap `value` if it is a node
    pub fn new(value: &'a Value) -> Option<Self> {
        value
            .get("type")
            .and_then(Value::as_str)
            .map(|_| Self { value })
    }

    pub fn node_type(&self) -> &'a str {
        self.value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    #[inline]
    pub fn is(&self, node_type: &str) -> bool {
        self.node_type() == node_type
    }

    pub fn raw(&self) -> &'a Value {
        self.value
    }

    /// Single child node stored under `field`
    pub fn child(&self, field: &str) -> Option<NodeRef<'a>> {
        self.value.get(field).and_then(NodeRef::new)
    }

    /// Child nodes stored in the array under `field`
    pub fn child_list(&self, field: &str) -> Vec<NodeRef<'a>> {
        self.value
            .get(field)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(NodeRef::new).collect())
            .unwrap_or_default()
    }

    pub fn str_field(&self, field: &str) -> Option<&'a str> {
        self.value.get(field).and_then(Value::as_str)
    }

    /// `name` of an `Identifier` (or `PrivateIdentifier`)
    pub fn identifier_name(&self) -> Option<&'a str> {
        match self.node_type() {
            "Identifier" | "PrivateIdentifier" => self.str_field("name"),
            _ => None,
        }
    }

    /// Whether this is an `Identifier` called `name`
    pub fn is_identifier(&self, name: &str) -> bool {
        self.identifier_name() == Some(name)
    }

    /// Property name of a non-computed `MemberExpression`
    pub fn member_property_name(&self) -> Option<&'a str> {
        if !self.is("MemberExpression") || self.value.get("computed") == Some(&Value::Bool(true)) {
            return None;
        }
        self.child("property")?.identifier_name()
    }

    /// All child nodes in source order
    ///
    /// Children without a `range` follow the ranged ones, in field-name order.
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        let Some(fields) = self.value.as_object() else {
            return Vec::new();
        };
        let mut children = Vec::new();
        for (key, value) in fields {
            if SKIPPED_FIELDS.contains(&key.as_str()) {
                continue;
            }
            match value {
                Value::Object(_) => children.extend(NodeRef::new(value)),
                Value::Array(items) => children.extend(items.iter().filter_map(NodeRef::new)),
                _ => {}
            }
        }
        children.sort_by_key(|child| child.range().map_or(usize::MAX, |(start, _)| start));
        children
    }

    /// `[start, end)` offsets into the source, in UTF-16 code units
    pub fn range(&self) -> Option<(usize, usize)> {
        let range = self.value.get("range")?.as_array()?;
        let start = usize::try_from(range.first()?.as_u64()?).ok()?;
        let end = usize::try_from(range.get(1)?.as_u64()?).ok()?;
        Some((start, end))
    }

    pub fn loc(&self) -> Option<SourceLocation> {
        self.value
            .get("loc")
            .and_then(|loc| SourceLocation::deserialize(loc).ok())
    }

    /// Source text covered by this node
    pub fn text<'s>(&self, source: &'s str) -> Option<&'s str> {
        let (start, end) = self.range()?;
        let start = utf16_to_byte_offset(source, start)?;
        let end = utf16_to_byte_offset(source, end)?;
        source.get(start..end)
    }

    /// Identity comparison (same JSON object)
    pub fn same(&self, other: &NodeRef<'_>) -> bool {
        std::ptr::eq(self.value, other.value)
    }
}

/// Byte offset of the `units`-th UTF-16 code unit, if it falls on a char boundary
fn utf16_to_byte_offset(source: &str, units: usize) -> Option<usize> {
    let mut seen = 0;
    for (byte, ch) in source.char_indices() {
        if seen == units {
            return Some(byte);
        }
        if seen > units {
            return None;
        }
        seen += ch.len_utf16();
    }
    (seen == units).then_some(source.len())
}
