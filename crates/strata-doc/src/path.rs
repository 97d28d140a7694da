//! Path parsing and traversal over document trees
//!
//! Paths are dot-separated keys with optional bracketed sequence indices,
//! e.g. `sensor_config.sensors[0].id`.
//!
//! ```
//! use strata_doc::path::{parse_path, PathSegment};
//!
//! let path = parse_path("sensor_config.sensors[0].id");
//! assert_eq!(path, vec![
//!     PathSegment::Key("sensor_config".to_string()),
//!     PathSegment::Key("sensors".to_string()),
//!     PathSegment::Index(0),
//!     PathSegment::Key("id".to_string()),
//! ]);
//! ```

use std::fmt;

use crate::error::{Error, Result};
use crate::node::Node;

/// A segment of a path - either a mapping key or a sequence index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(idx) => write!(f, "[{idx}]"),
        }
    }
}

/// Parse a path string into segments.
///
/// Empty keys are skipped and malformed indices are dropped.
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    let mut current_key = String::new();
    let mut chars = path.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                if !current_key.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut current_key)));
                }
            }
            '[' => {
                if !current_key.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut current_key)));
                }
                let index: String = chars.by_ref().take_while(|&c| c != ']').collect();
                if let Ok(index) = index.trim().parse::<usize>() {
                    segments.push(PathSegment::Index(index));
                }
            }
            _ => current_key.push(ch),
        }
    }

    if !current_key.is_empty() {
        segments.push(PathSegment::Key(current_key));
    }

    segments
}

/// Build a key-only path from mapping keys.
pub fn key_path<S: AsRef<str>>(keys: &[S]) -> Vec<PathSegment> {
    keys.iter()
        .map(|k| PathSegment::Key(k.as_ref().to_string()))
        .collect()
}

/// Render segments back to the dotted form accepted by [`parse_path`].
pub fn format_path(segments: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            PathSegment::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            PathSegment::Index(_) => out.push_str(&segment.to_string()),
        }
    }
    out
}

/// Get a reference to the node at the given path.
///
/// Returns `None` when any segment is missing or addresses the wrong kind
/// of container.
pub fn get_at_path<'a>(node: &'a Node, segments: &[PathSegment]) -> Option<&'a Node> {
    let Some((first, rest)) = segments.split_first() else {
        return Some(node);
    };

    let next = match (first, node) {
        (PathSegment::Key(key), Node::Mapping(map)) => map.get(key)?,
        (PathSegment::Index(idx), Node::Sequence(items)) => items.get(*idx)?,
        _ => return None,
    };

    get_at_path(next, rest)
}

fn child_mut<'a>(node: &'a mut Node, segment: &PathSegment) -> Option<&'a mut Node> {
    match (segment, node) {
        (PathSegment::Key(key), Node::Mapping(map)) => map.get_mut(key),
        (PathSegment::Index(idx), Node::Sequence(items)) => items.get_mut(*idx),
        _ => None,
    }
}

/// Set a value at the given path.
///
/// Every intermediate container must already exist; the final key is
/// inserted into its mapping, and a final index must be in range.
pub fn set_at_path(node: &mut Node, segments: &[PathSegment], value: Node) -> Result<()> {
    let Some((last, parents)) = segments.split_last() else {
        *node = value;
        return Ok(());
    };

    let mut current = node;
    for (depth, segment) in parents.iter().enumerate() {
        current = child_mut(current, segment).ok_or_else(|| Error::MissingContainer {
            path: format_path(segments),
            missing: format_path(&segments[..=depth]),
        })?;
    }

    match (last, current) {
        (PathSegment::Key(key), Node::Mapping(map)) => {
            map.insert(key.clone(), value);
            Ok(())
        }
        (PathSegment::Index(idx), Node::Sequence(items)) if *idx < items.len() => {
            items[*idx] = value;
            Ok(())
        }
        _ => Err(Error::PathNotFound {
            path: format_path(segments),
        }),
    }
}

/// Set a value at a key-only path, creating intermediate mappings.
///
/// Intermediate nodes that exist but are not mappings are replaced.
pub fn insert_at_path<S: AsRef<str>>(node: &mut Node, keys: &[S], value: Node) {
    let Some((first, rest)) = keys.split_first() else {
        *node = value;
        return;
    };

    if !node.is_mapping() {
        *node = Node::empty_mapping();
    }
    if let Node::Mapping(map) = node {
        match map.get_mut(first.as_ref()) {
            Some(child) => insert_at_path(child, rest, value),
            None => {
                let mut child = Node::empty_mapping();
                insert_at_path(&mut child, rest, value);
                map.insert(first.as_ref(), child);
            }
        }
    }
}
