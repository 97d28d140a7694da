//! Metadata tokens and leaf classification
//!
//! The token strings are part of the document format and must not change.

use strata_doc::{Mapping, Node};

/// Reserved mapping keys that annotate a document without being part of it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaToken {
    /// Validation rules for a leaf, or extra attributes for a mapping
    Schema,
    /// Registers a mapping's rule under an id for later reference
    SchemaId,
    Description,
    /// Default value of a leaf
    Default,
}

impl MetaToken {
    pub const ALL: [MetaToken; 4] = [
        MetaToken::Schema,
        MetaToken::SchemaId,
        MetaToken::Description,
        MetaToken::Default,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            MetaToken::Schema => "oc_schema",
            MetaToken::SchemaId => "oc_schema_id",
            MetaToken::Description => "oc_desc",
            MetaToken::Default => "oc_default",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|token| token.key() == key)
    }
}

pub fn is_meta_key(key: &str) -> bool {
    MetaToken::from_key(key).is_some()
}

/// Whether a node is a leaf of the configuration.
///
/// Scalars are leaves, and so is every mapping whose keys are all metadata
/// tokens, including the empty mapping. Sequences never are.
pub fn is_leaf(node: &Node) -> bool {
    match node {
        Node::Scalar(_) => true,
        Node::Mapping(map) => map.keys().all(|key| is_meta_key(key)),
        Node::Sequence(_) => false,
    }
}

/// Value of a metadata token on a mapping node
pub fn meta(node: &Node, token: MetaToken) -> Option<&Node> {
    node.as_mapping().and_then(|map| map.get(token.key()))
}

/// Default value carried by a leaf.
///
/// `oc_default` wins; otherwise a scalar is its own default, an empty
/// mapping defaults to itself and a metadata-only mapping defaults to null.
pub fn leaf_default(node: &Node) -> Node {
    if let Some(default) = meta(node, MetaToken::Default) {
        return default.clone();
    }
    match node {
        Node::Mapping(map) if map.is_empty() => Node::empty_mapping(),
        Node::Mapping(_) => Node::null(),
        other => other.clone(),
    }
}

/// Copy of a mapping without its metadata keys
pub fn strip_meta(map: &Mapping) -> Mapping {
    map.iter()
        .filter(|(key, _)| !is_meta_key(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_doc::{DocumentCodec, Format};

    fn yaml(source: &str) -> Node {
        DocumentCodec::new().parse(source, Format::Yaml).unwrap()
    }

    #[test]
    fn test_leaf_classification() {
        assert!(is_leaf(&Node::from(5)));
        assert!(is_leaf(&Node::empty_mapping()));
        assert!(is_leaf(&yaml("oc_default: 5\noc_desc: timeout\n")));
        assert!(!is_leaf(&yaml("oc_default: 5\nport: 1\n")));
        assert!(!is_leaf(&yaml("- 1\n")));
    }

    #[test]
    fn test_leaf_default() {
        assert_eq!(leaf_default(&yaml("oc_default: 5\n")), Node::from(5));
        assert_eq!(leaf_default(&yaml("oc_desc: no default\n")), Node::null());
        assert_eq!(leaf_default(&Node::empty_mapping()), Node::empty_mapping());
        assert_eq!(leaf_default(&Node::from("can0")), Node::from("can0"));
    }

    #[test]
    fn test_token_keys_roundtrip() {
        for token in MetaToken::ALL {
            assert_eq!(MetaToken::from_key(token.key()), Some(token));
        }
        assert_eq!(MetaToken::from_key("schema"), None);
    }
}
