//! YAML format handler using serde_yaml

use serde_yaml::Value as YamlValue;

use crate::error::{Error, Result};
use crate::format::{Format, FormatHandler};
use crate::node::{Mapping, Node, Scalar};

/// Handler for YAML files using serde_yaml
#[derive(Debug, Default)]
pub struct YamlHandler;

impl YamlHandler {
    pub fn new() -> Self {
        Self
    }
}

impl FormatHandler for YamlHandler {
    fn format(&self) -> Format {
        Format::Yaml
    }

    fn parse(&self, source: &str) -> Result<Node> {
        if is_blank_document(source) {
            return Ok(Node::null());
        }
        let value: YamlValue =
            serde_yaml::from_str(source).map_err(|e| Error::parse("YAML", e.to_string()))?;
        Ok(Node::from(value))
    }

    fn render(&self, node: &Node) -> Result<String> {
        serde_yaml::to_string(&YamlValue::from(node)).map_err(|e| Error::render("YAML", e.to_string()))
    }

    /// serde_yaml drops comments, so only the leading comment block of
    /// `original` is carried over.
    fn render_onto(&self, original: &str, node: &Node) -> Result<String> {
        let mut rendered = leading_comments(original);
        rendered.push_str(&self.render(node)?);
        Ok(rendered)
    }
}

/// Comment and blank lines before the first line of content
fn leading_comments(source: &str) -> String {
    let mut header = String::new();
    for line in source.lines() {
        let trimmed = line.trim();
        if !(trimmed.is_empty() || trimmed.starts_with('#')) {
            break;
        }
        header.push_str(line);
        header.push('\n');
    }
    header
}

/// A document holding only whitespace, comments or a bare `---` is null.
fn is_blank_document(source: &str) -> bool {
    source.lines().map(str::trim).all(|line| {
        line.is_empty() || line.starts_with('#') || line == "---"
    })
}

/// Mapping keys that are not strings are rendered to their scalar text.
fn key_text(key: &YamlValue) -> String {
    match key {
        YamlValue::String(s) => s.clone(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

impl From<YamlValue> for Node {
    fn from(value: YamlValue) -> Self {
        match value {
            YamlValue::Null => Node::null(),
            YamlValue::Bool(b) => Node::from(b),
            YamlValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Node::from(i)
                } else if let Some(f) = n.as_f64() {
                    Node::from(f)
                } else {
                    Node::null()
                }
            }
            YamlValue::String(s) => Node::from(s),
            YamlValue::Sequence(items) => Node::Sequence(items.into_iter().map(Node::from).collect()),
            YamlValue::Mapping(map) => Node::Mapping(
                map.into_iter()
                    .map(|(k, v)| (key_text(&k), Node::from(v)))
                    .collect::<Mapping>(),
            ),
            YamlValue::Tagged(tagged) => Node::from(tagged.value),
        }
    }
}

impl From<&Node> for YamlValue {
    fn from(node: &Node) -> Self {
        match node {
            Node::Scalar(Scalar::Null) => YamlValue::Null,
            Node::Scalar(Scalar::Bool(b)) => YamlValue::Bool(*b),
            Node::Scalar(Scalar::Int(i)) => YamlValue::Number((*i).into()),
            Node::Scalar(Scalar::Float(f)) => YamlValue::Number((*f).into()),
            Node::Scalar(Scalar::String(s)) => YamlValue::String(s.clone()),
            Node::Sequence(items) => YamlValue::Sequence(items.iter().map(YamlValue::from).collect()),
            Node::Mapping(map) => {
                let mut out = serde_yaml::Mapping::new();
                for (key, value) in map {
                    out.insert(YamlValue::String(key.clone()), YamlValue::from(value));
                }
                YamlValue::Mapping(out)
            }
        }
    }
}
