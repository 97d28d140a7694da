//! Compiles an annotated document into schema, defaults and flat index

use strata_doc::{Mapping, Node, Scalar};
use tracing::debug;

use crate::error::{Error, Result};
use crate::flat::{FlatPath, FlatSchema};
use crate::registry::RuleRegistry;
use crate::rule::{Fields, NestedRule, SchemaNode};
use crate::token::{is_leaf, is_meta_key, leaf_default, meta, MetaToken};
use crate::validator::Validator;

/// Result of compiling an annotated document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledSchema {
    /// Rules for the top-level keys
    pub schema: Fields,
    /// Default configuration, with metadata stripped
    pub defaults: Node,
    /// Tree of `oc_desc` values mirroring the defaults
    pub descriptions: Node,
    pub flat: FlatSchema,
    pub registry: RuleRegistry,
}

impl CompiledSchema {
    /// Schema of a document with no content
    pub fn empty() -> Self {
        Self {
            defaults: Node::empty_mapping(),
            descriptions: Node::empty_mapping(),
            ..Self::default()
        }
    }

    pub fn validator(&self) -> Validator<'_> {
        Validator::new(&self.schema, &self.registry)
    }
}

/// Output of compiling one node
struct Compiled {
    rule: Option<SchemaNode>,
    default: Node,
    description: Node,
}

/// Walks an annotated document once, producing a [`CompiledSchema`]
#[derive(Debug, Default)]
pub struct SchemaCompiler {
    flat: FlatSchema,
    registry: RuleRegistry,
}

impl SchemaCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compile(mut self, root: &Node) -> Result<CompiledSchema> {
        let map = match root {
            Node::Mapping(map) => map,
            node if node.is_null() => return Ok(CompiledSchema::empty()),
            other => {
                return Err(Error::InvalidRoot {
                    found: other.kind_name().to_string(),
                });
            }
        };

        let compiled = self.compile_mapping(root, map, Some(&[]))?;
        let schema = match compiled.rule {
            Some(SchemaNode::Dict {
                nested: NestedRule::Fields(fields),
                ..
            }) => fields,
            Some(SchemaNode::Dict {
                nested: NestedRule::Empty,
                ..
            }) => Fields::new(),
            _ => {
                return Err(Error::InvalidRoot {
                    found: "mapping whose schema is not a set of fields".to_string(),
                });
            }
        };

        debug!(
            fields = schema.len(),
            paths = self.flat.len(),
            ids = self.registry.len(),
            "compiled schema"
        );

        Ok(CompiledSchema {
            schema,
            defaults: compiled.default,
            descriptions: compiled.description,
            flat: self.flat,
            registry: self.registry,
        })
    }

    fn compile_node(&mut self, node: &Node, path: Option<&[String]>) -> Result<Compiled> {
        if is_leaf(node) {
            return Ok(self.compile_leaf(node, path));
        }
        match node {
            Node::Mapping(map) => self.compile_mapping(node, map, path),
            Node::Sequence(items) => self.compile_sequence(items, path),
            Node::Scalar(_) => Ok(self.compile_leaf(node, path)),
        }
    }

    fn compile_leaf(&mut self, node: &Node, path: Option<&[String]>) -> Compiled {
        let rule = meta(node, MetaToken::Schema).map(|payload| SchemaNode::Rule(payload.clone()));

        if let Some(path) = path {
            let declared_type = rule
                .as_ref()
                .and_then(SchemaNode::declared_type)
                .map(str::to_string);
            self.flat.register_value(path.to_vec(), declared_type);
        }

        Compiled {
            rule,
            default: leaf_default(node),
            description: meta(node, MetaToken::Description)
                .cloned()
                .unwrap_or_default(),
        }
    }

    fn compile_mapping(
        &mut self,
        node: &Node,
        map: &Mapping,
        path: Option<&[String]>,
    ) -> Result<Compiled> {
        let mut fields = Fields::new();
        let mut defaults = Mapping::new();
        let mut descriptions = Mapping::new();

        for (key, child) in map.iter().filter(|(key, _)| !is_meta_key(key)) {
            let key_path = path.map(|p| child_path(p, key));
            let compiled = self.compile_node(child, key_path.as_deref())?;
            if let Some(rule) = compiled.rule {
                fields.insert(key.clone(), rule);
            }
            defaults.insert(key.clone(), compiled.default);
            descriptions.insert(key.clone(), compiled.description);
        }

        let mut nested = NestedRule::Fields(fields);
        let mut attrs = Mapping::new();
        if let Some(payload) = meta(node, MetaToken::Schema) {
            augment(&mut nested, &mut attrs, payload);
        }

        if let Some(id) = meta(node, MetaToken::SchemaId) {
            let id = match id {
                Node::Scalar(scalar) if *scalar != Scalar::Null => scalar.to_string(),
                other => {
                    return Err(Error::InvalidSchemaId {
                        path: path.map(|p| p.join(".")).unwrap_or_default(),
                        found: other.kind_name().to_string(),
                    });
                }
            };
            if matches!(&nested, NestedRule::Reference(target) if *target == id) {
                return Err(Error::SelfReference { id });
            }
            if !nested.is_empty() {
                debug!(%id, "registering schema id");
                self.registry.register(id, nested.clone())?;
            }
        }

        Ok(Compiled {
            rule: Some(SchemaNode::Dict { nested, attrs }),
            default: Node::Mapping(defaults),
            description: Node::Mapping(descriptions),
        })
    }

    fn compile_sequence(&mut self, items: &[Node], path: Option<&[String]>) -> Result<Compiled> {
        if let Some(path) = path {
            self.flat.register_list(path.to_vec());
        }

        let mut item_rule = None;
        let mut defaults = Vec::with_capacity(items.len());
        let mut descriptions = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let compiled = self.compile_node(item, None)?;
            if index == 0 {
                item_rule = compiled.rule;
            }
            defaults.push(compiled.default);
            descriptions.push(compiled.description);
        }

        Ok(Compiled {
            rule: Some(SchemaNode::list(item_rule)),
            default: Node::Sequence(defaults),
            description: Node::Sequence(descriptions),
        })
    }
}

fn child_path(parent: &[String], key: &str) -> FlatPath {
    let mut path = parent.to_vec();
    path.push(key.to_string());
    path
}

/// Apply `oc_schema` found on a mapping that has children of its own.
///
/// A mapping payload adds attributes, with its `schema` key replacing the
/// nested rule; any other payload replaces the nested rule outright.
fn augment(nested: &mut NestedRule, attrs: &mut Mapping, payload: &Node) {
    match payload {
        Node::Mapping(extra) => {
            for (key, value) in extra {
                if key == "schema" {
                    *nested = nested_from_payload(value);
                } else {
                    attrs.insert(key.clone(), value.clone());
                }
            }
        }
        other => *nested = nested_from_payload(other),
    }
}

fn nested_from_payload(payload: &Node) -> NestedRule {
    match payload.as_str() {
        Some(id) => NestedRule::Reference(id.to_string()),
        None => NestedRule::Raw(payload.clone()),
    }
}
