//! Type registry shared by validation and override coercion

use std::fmt;

use strata_doc::{Node, Scalar};

/// Types understood by the `type` rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Integer,
    Float,
    /// Integer or float
    Number,
    Boolean,
    Dict,
    List,
}

/// Concrete scalar kinds a text override can be converted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Integer,
    Float,
    Boolean,
    String,
}

impl ValueType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "float" => Some(Self::Float),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "dict" => Some(Self::Dict),
            "list" => Some(Self::List),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Dict => "dict",
            Self::List => "list",
        }
    }

    /// Whether a value is an instance of this type.
    ///
    /// Integers count as floats; booleans are never numbers.
    pub fn matches(&self, value: &Node) -> bool {
        match (self, value) {
            (Self::String, Node::Scalar(Scalar::String(_))) => true,
            (Self::Integer, Node::Scalar(Scalar::Int(_))) => true,
            (Self::Float | Self::Number, Node::Scalar(Scalar::Int(_) | Scalar::Float(_))) => true,
            (Self::Boolean, Node::Scalar(Scalar::Bool(_))) => true,
            (Self::Dict, Node::Mapping(_)) => true,
            (Self::List, Node::Sequence(_)) => true,
            _ => false,
        }
    }

    /// Scalar kinds tried, in order, when converting text to this type
    pub fn coercions(&self) -> &'static [ScalarKind] {
        match self {
            Self::String => &[ScalarKind::String],
            Self::Integer => &[ScalarKind::Integer],
            Self::Float => &[ScalarKind::Float],
            Self::Number => &[ScalarKind::Integer, ScalarKind::Float],
            Self::Boolean => &[ScalarKind::Boolean],
            Self::Dict | Self::List => &[],
        }
    }

    /// Convert text using the first coercion that succeeds
    pub fn coerce(&self, text: &str) -> Option<Node> {
        self.coercions().iter().find_map(|kind| kind.coerce(text))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ScalarKind {
    pub fn coerce(&self, text: &str) -> Option<Node> {
        let trimmed = text.trim();
        match self {
            Self::Integer => trimmed.parse::<i64>().ok().map(Node::from),
            Self::Float => trimmed.parse::<f64>().ok().map(Node::from),
            Self::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(Node::from(true)),
                "false" | "no" | "off" | "0" => Some(Node::from(false)),
                _ => None,
            },
            Self::String => Some(Node::from(text)),
        }
    }
}
