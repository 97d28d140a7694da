//! JSON format handler

use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::format::{Format, FormatHandler};
use crate::node::{Node, Scalar};

/// Handler for JSON documents
#[derive(Debug, Default)]
pub struct JsonHandler;

impl JsonHandler {
    pub fn new() -> Self {
        Self
    }
}

impl FormatHandler for JsonHandler {
    fn format(&self) -> Format {
        Format::Json
    }

    fn parse(&self, source: &str) -> Result<Node> {
        let value: JsonValue =
            serde_json::from_str(source).map_err(|e| Error::parse("JSON", e.to_string()))?;
        Ok(Node::from(value))
    }

    fn render(&self, node: &Node) -> Result<String> {
        let mut rendered = serde_json::to_string_pretty(&JsonValue::from(node))
            .map_err(|e| Error::render("JSON", e.to_string()))?;
        rendered.push('\n');
        Ok(rendered)
    }
}

impl From<JsonValue> for Node {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Node::null(),
            JsonValue::Bool(b) => Node::from(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Node::from(i),
                None => n.as_f64().map(Node::from).unwrap_or_default(),
            },
            JsonValue::String(s) => Node::from(s),
            JsonValue::Array(items) => Node::Sequence(items.into_iter().map(Node::from).collect()),
            JsonValue::Object(map) => Node::Mapping(
                map.into_iter().map(|(k, v)| (k, Node::from(v))).collect(),
            ),
        }
    }
}

impl From<&Node> for JsonValue {
    fn from(node: &Node) -> Self {
        match node {
            Node::Scalar(Scalar::Null) => JsonValue::Null,
            Node::Scalar(Scalar::Bool(b)) => JsonValue::Bool(*b),
            Node::Scalar(Scalar::Int(i)) => JsonValue::from(*i),
            // NaN and infinities have no JSON form
            Node::Scalar(Scalar::Float(f)) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Node::Scalar(Scalar::String(s)) => JsonValue::String(s.clone()),
            Node::Sequence(items) => JsonValue::Array(items.iter().map(JsonValue::from).collect()),
            Node::Mapping(map) => JsonValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), JsonValue::from(v)))
                    .collect(),
            ),
        }
    }
}
