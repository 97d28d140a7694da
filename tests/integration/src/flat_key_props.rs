//! Property tests for flat key naming and layered lookup

use proptest::prelude::*;
use strata_core::{ConfigOverlay, FlatKeyMap, KeyStyle};
use strata_doc::path::{get_at_path, key_path};
use strata_doc::{Mapping, Node};
use strata_schema::FlatSchema;

fn segment() -> impl Strategy<Value = String> {
    "[a-z]{1,5}(_[a-z]{1,5}){0,2}"
}

fn config_path() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(segment(), 1..4)
}

fn leaf() -> impl Strategy<Value = Node> {
    prop_oneof![
        any::<i64>().prop_map(Node::from),
        "[a-z]{0,4}".prop_map(Node::from),
        Just(Node::null()),
        prop::collection::vec(any::<bool>().prop_map(Node::from), 0..3).prop_map(Node::from),
    ]
}

/// Small trees over a three-letter key alphabet so layers collide often
fn tree() -> impl Strategy<Value = Node> {
    leaf().prop_recursive(3, 24, 3, |inner| {
        prop::collection::btree_map("[abc]", inner, 0..3)
            .prop_map(|entries| Node::Mapping(entries.into_iter().collect::<Mapping>()))
    })
}

fn lookup_path() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[abc]", 0..4)
}

proptest! {
    #[test]
    fn distinct_paths_get_distinct_keys(a in config_path(), b in config_path()) {
        prop_assume!(a != b);

        let mut flat = FlatSchema::new();
        flat.register_value(a.clone(), None);
        flat.register_value(b.clone(), None);
        let keys = FlatKeyMap::new(flat, "APP");

        prop_assert_ne!(keys.env_key(&a), keys.env_key(&b));
        prop_assert_ne!(keys.cli_key(&a), keys.cli_key(&b));
    }

    #[test]
    fn keys_resolve_back_to_their_path(path in config_path(), prefix in "_{0,2}[a-z]{1,6}") {
        let mut flat = FlatSchema::new();
        flat.register_value(path.clone(), None);
        let keys = FlatKeyMap::new(flat, prefix);

        let env = keys.env_key(&path);
        prop_assert!(keys.is_prefixed(&env));
        prop_assert_eq!(&keys.resolve(KeyStyle::Env, &env).unwrap().path, &path);
        prop_assert_eq!(&keys.resolve(KeyStyle::Cli, &keys.cli_key(&path)).unwrap().path, &path);
    }

    #[test]
    fn overlay_get_matches_resolved_tree(
        base in tree(),
        layers in prop::collection::vec(tree(), 0..4),
        path in lookup_path(),
    ) {
        let mut overlay = ConfigOverlay::new(base);
        for layer in layers {
            overlay.push(layer);
        }

        let resolved = overlay.resolve();
        let expected = get_at_path(&resolved, &key_path(&path)).cloned();
        prop_assert_eq!(overlay.get(&path), expected);
    }
}
