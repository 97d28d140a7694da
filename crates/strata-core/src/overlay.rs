//! Append-only stack of configuration layers
//!
//! The base layer holds the compiled defaults; every later layer overrides
//! the ones below it. Layers are never modified once pushed.

use strata_doc::path::{insert_at_path, key_path, set_at_path};
use strata_doc::Node;
use tracing::debug;

use crate::error::Result;
use crate::merge::deep_merge;

/// Destination of a single path write
pub trait WriteTarget {
    /// Write `value` at `path`; every intermediate mapping must exist.
    fn write_at(&mut self, path: &[String], value: Node) -> Result<()>;
}

impl WriteTarget for Node {
    fn write_at(&mut self, path: &[String], value: Node) -> Result<()> {
        set_at_path(self, &key_path(path), value)?;
        Ok(())
    }
}

/// Stages one new layer over a live view of the merged configuration
///
/// Writes are checked against the view, so a write into a container the
/// configuration does not have fails instead of creating it.
#[derive(Debug, Clone)]
pub struct LayerWriter {
    view: Node,
    layer: Node,
}

impl LayerWriter {
    pub fn new(view: Node) -> Self {
        Self {
            view,
            layer: Node::empty_mapping(),
        }
    }

    /// The merged configuration including writes made so far
    pub fn view(&self) -> &Node {
        &self.view
    }

    /// The staged layer
    pub fn layer(&self) -> &Node {
        &self.layer
    }

    pub fn into_layer(self) -> Node {
        self.layer
    }
}

impl WriteTarget for LayerWriter {
    fn write_at(&mut self, path: &[String], value: Node) -> Result<()> {
        self.view.write_at(path, value.clone())?;
        insert_at_path(&mut self.layer, path, value);
        Ok(())
    }
}

enum Lookup<'a> {
    Found(&'a Node),
    Absent,
    /// A non-mapping sits on the path, hiding every layer below
    Blocked,
}

fn lookup<'a>(layer: &'a Node, path: &[String]) -> Lookup<'a> {
    let mut current = layer;
    for key in path {
        let Node::Mapping(map) = current else {
            return Lookup::Blocked;
        };
        match map.get(key) {
            Some(child) => current = child,
            None => return Lookup::Absent,
        }
    }
    Lookup::Found(current)
}

/// Ordered stack of configuration layers
#[derive(Debug, Clone)]
pub struct ConfigOverlay {
    layers: Vec<Node>,
}

impl ConfigOverlay {
    /// Create a stack whose base layer is `base`
    pub fn new(base: Node) -> Self {
        Self { layers: vec![base] }
    }

    pub fn push(&mut self, layer: Node) {
        self.layers.push(layer);
        debug!(layers = self.layers.len(), "pushed configuration layer");
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layers(&self) -> &[Node] {
        &self.layers
    }

    /// Merge every layer into one tree
    pub fn resolve(&self) -> Node {
        let mut layers = self.layers.iter();
        let mut resolved = layers.next().cloned().unwrap_or_else(Node::empty_mapping);
        for layer in layers {
            deep_merge(&mut resolved, layer);
        }
        resolved
    }

    /// Resolved value at a key path, without merging the whole stack.
    ///
    /// Mappings are united across the layers that define them; any other
    /// value comes whole from the topmost layer defining it.
    pub fn get(&self, path: &[String]) -> Option<Node> {
        let mut found: Vec<&Node> = Vec::new();
        for layer in self.layers.iter().rev() {
            match lookup(layer, path) {
                Lookup::Found(node) if node.is_mapping() => found.push(node),
                Lookup::Found(node) => {
                    if found.is_empty() {
                        return Some(node.clone());
                    }
                    break;
                }
                Lookup::Absent => {}
                Lookup::Blocked => break,
            }
        }

        let mut lower_first = found.into_iter().rev();
        let mut merged = lower_first.next()?.clone();
        for node in lower_first {
            deep_merge(&mut merged, node);
        }
        Some(merged)
    }

    /// Stage a new layer, apply every item to it, and push it.
    ///
    /// The layer is pushed only when every call to `apply` succeeds; on the
    /// first failure the stack is left unchanged.
    pub fn merge<I, F>(&mut self, items: I, mut apply: F) -> Result<()>
    where
        I: IntoIterator,
        F: FnMut(&mut LayerWriter, I::Item) -> Result<()>,
    {
        let mut writer = LayerWriter::new(self.resolve());
        for item in items {
            apply(&mut writer, item)?;
        }
        self.push(writer.into_layer());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;
    use strata_doc::{DocumentCodec, Format};

    fn yaml(source: &str) -> Node {
        DocumentCodec::new().parse(source, Format::Yaml).unwrap()
    }

    fn path(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    fn stack() -> ConfigOverlay {
        let mut overlay = ConfigOverlay::new(yaml(
            "ui:\n  addr: 0.0.0.0\n  port: 8080\nsensors: [1, 2]\n",
        ));
        overlay.push(yaml("ui:\n  port: 9090\n"));
        overlay.push(yaml("sensors: [3]\n"));
        overlay
    }

    #[test]
    fn test_get_unions_mappings() {
        let overlay = stack();
        assert_eq!(
            overlay.get(&path(&["ui"])),
            Some(yaml("addr: 0.0.0.0\nport: 9090\n"))
        );
        assert_eq!(overlay.get(&path(&["sensors"])), Some(yaml("[3]")));
        assert_eq!(overlay.get(&path(&["missing"])), None);
    }

    #[test]
    fn test_get_agrees_with_resolve() {
        let overlay = stack();
        let resolved = overlay.resolve();
        assert_eq!(overlay.get(&[]), Some(resolved.clone()));
        assert_eq!(
            overlay.get(&path(&["ui", "addr"])).as_ref(),
            resolved.get("ui").and_then(|ui| ui.get("addr"))
        );
    }

    #[test]
    fn test_scalar_shadows_lower_layers() {
        let mut overlay = stack();
        overlay.push(yaml("ui: disabled\n"));
        assert_eq!(overlay.get(&path(&["ui", "port"])), None);
        assert_eq!(overlay.get(&path(&["ui"])), Some(Node::from("disabled")));
    }

    #[test]
    fn test_merge_pushes_one_layer() {
        let mut overlay = stack();
        overlay
            .merge([("port", 1), ("addr", 2)], |writer, (key, value)| {
                writer.write_at(&path(&["ui", key]), Node::from(value))
            })
            .unwrap();

        assert_eq!(overlay.layer_count(), 4);
        assert_eq!(overlay.layers()[3], yaml("ui:\n  port: 1\n  addr: 2\n"));
    }

    #[test]
    fn test_failed_merge_leaves_stack_unchanged() {
        let mut overlay = stack();
        let err = overlay
            .merge(["ui", "general"], |writer, key| {
                writer.write_at(&path(&[key, "log_level"]), Node::from("debug"))
            })
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Document(strata_doc::Error::MissingContainer { .. })
        ));
        assert_eq!(overlay.layer_count(), 3);
    }

    #[test]
    fn test_writer_sees_earlier_writes() {
        let mut writer = LayerWriter::new(yaml("ui:\n  port: 1\n"));
        writer.write_at(&path(&["ui", "port"]), Node::from(2)).unwrap();
        assert_eq!(writer.view(), &yaml("ui:\n  port: 2\n"));
        assert_eq!(writer.layer(), &yaml("ui:\n  port: 2\n"));
    }
}
