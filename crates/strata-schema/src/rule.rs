//! Compiled schema rules

use std::collections::BTreeMap;

use strata_doc::{Mapping, Node};

/// Field name to rule, for the keys of a mapping
pub type Fields = BTreeMap<String, SchemaNode>;

/// Rule describing what a nested container may hold
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NestedRule {
    #[default]
    Empty,
    /// Rules for the keys of a mapping
    Fields(Fields),
    /// Rule applied to every element of a sequence
    Item(Box<SchemaNode>),
    /// Rule registered under an id in the [`RuleRegistry`](crate::RuleRegistry)
    Reference(String),
    /// A rule payload taken verbatim from the document
    Raw(Node),
}

impl NestedRule {
    /// Whether the rule constrains nothing
    pub fn is_empty(&self) -> bool {
        match self {
            NestedRule::Empty => true,
            NestedRule::Fields(fields) => fields.is_empty(),
            _ => false,
        }
    }
}

/// A node of the compiled schema
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Dict { nested: NestedRule, attrs: Mapping },
    List { nested: NestedRule, attrs: Mapping },
    /// Leaf rules, taken verbatim from `oc_schema`
    Rule(Node),
}

impl SchemaNode {
    pub fn dict(fields: Fields) -> Self {
        SchemaNode::Dict {
            nested: NestedRule::Fields(fields),
            attrs: Mapping::new(),
        }
    }

    pub fn list(item: Option<SchemaNode>) -> Self {
        SchemaNode::List {
            nested: item
                .map(|item| NestedRule::Item(Box::new(item)))
                .unwrap_or_default(),
            attrs: Mapping::new(),
        }
    }

    /// Validation attributes attached to this node
    pub fn attrs(&self) -> Option<&Mapping> {
        match self {
            SchemaNode::Dict { attrs, .. } | SchemaNode::List { attrs, .. } => Some(attrs),
            SchemaNode::Rule(payload) => payload.as_mapping(),
        }
    }

    pub fn nested(&self) -> Option<&NestedRule> {
        match self {
            SchemaNode::Dict { nested, .. } | SchemaNode::List { nested, .. } => Some(nested),
            SchemaNode::Rule(_) => None,
        }
    }

    /// The `type` rule when it names exactly one type
    pub fn declared_type(&self) -> Option<&str> {
        self.attrs()?.get("type")?.as_str()
    }

    pub fn is_required(&self) -> bool {
        self.attrs()
            .and_then(|attrs| attrs.get("required"))
            .and_then(Node::as_bool)
            .unwrap_or(false)
    }
}
