//! Deep merge of configuration trees

use strata_doc::Node;

/// Merge `overlay` into `base`.
///
/// Mappings are merged key by key; anything else in the overlay, lists and
/// nulls included, replaces the base value whole.
pub fn deep_merge(base: &mut Node, overlay: &Node) {
    match (base, overlay) {
        (Node::Mapping(base_map), Node::Mapping(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                if let Some(base_val) = base_map.get_mut(key) {
                    deep_merge(base_val, overlay_val);
                } else {
                    base_map.insert(key.clone(), overlay_val.clone());
                }
            }
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}
