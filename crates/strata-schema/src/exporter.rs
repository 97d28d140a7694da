//! Structure-preserving export of resolved configuration

use strata_doc::{Mapping, Node};

use crate::token::{is_leaf, is_meta_key, leaf_default};

/// Re-serializes a resolved configuration in the shape of its annotated
/// template
///
/// Metadata keys are dropped and leaves take their resolved values. Lists
/// follow the resolved length: extra resolved elements are appended as they
/// are and surplus template elements are dropped. Paths absent from the
/// resolved tree fall back to the template's defaults, and a resolved value
/// whose shape differs from the template is emitted verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaExporter {
    template: Node,
}

impl SchemaExporter {
    pub fn new(template: Node) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &Node {
        &self.template
    }

    pub fn export(&self, resolved: &Node) -> Node {
        export_node(&self.template, Some(resolved))
    }

    /// The template with metadata stripped and defaults filled in
    pub fn example(&self) -> Node {
        export_node(&self.template, None)
    }
}

fn export_node(template: &Node, resolved: Option<&Node>) -> Node {
    if is_leaf(template) {
        return resolved.cloned().unwrap_or_else(|| leaf_default(template));
    }

    match (template, resolved) {
        (Node::Mapping(fields), None) => Node::Mapping(
            fields
                .iter()
                .filter(|(key, _)| !is_meta_key(key))
                .map(|(key, child)| (key.clone(), export_node(child, None)))
                .collect(),
        ),
        (Node::Mapping(fields), Some(Node::Mapping(values))) => {
            Node::Mapping(export_mapping(fields, values))
        }
        (Node::Sequence(items), None) => {
            Node::Sequence(items.iter().map(|item| export_node(item, None)).collect())
        }
        (Node::Sequence(items), Some(Node::Sequence(values))) => Node::Sequence(
            values
                .iter()
                .enumerate()
                .map(|(index, value)| match items.get(index) {
                    Some(item) => export_node(item, Some(value)),
                    None => value.clone(),
                })
                .collect(),
        ),
        (_, Some(other)) => other.clone(),
        (Node::Scalar(_), None) => leaf_default(template),
    }
}

fn export_mapping(fields: &Mapping, values: &Mapping) -> Mapping {
    let mut out: Mapping = fields
        .iter()
        .filter(|(key, _)| !is_meta_key(key))
        .map(|(key, child)| (key.clone(), export_node(child, values.get(key))))
        .collect();
    for (key, value) in values {
        if !out.contains_key(key) && !is_meta_key(key) {
            out.insert(key.clone(), value.clone());
        }
    }
    out
}
