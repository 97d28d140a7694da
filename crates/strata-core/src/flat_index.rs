//! Environment-variable and CLI-option names for configuration paths
//!
//! Every value or list path of the compiled schema gets two names:
//!
//! - an environment key, `PREFIX_` followed by the path segments joined
//!   with `__`, all uppercase (`ONAC_BOTTOM_SENSOR__PREACTIVATION_TIMEOUT`);
//! - a CLI key, the segments joined with `--` and every `_` replaced by `-`
//!   (`bottom-sensor--preactivation-timeout`).
//!
//! Separator characters inside a segment are not escaped, so segments that
//! contain `__` may produce ambiguous names.

use std::collections::BTreeMap;
use std::fmt;

use strata_doc::path::{get_at_path, key_path};
use strata_doc::{Node, Scalar};
use strata_schema::{FlatPath, FlatPathEntry, FlatSchema, FlatValueKind, ValueType};

use crate::error::{Error, Result};
use crate::overlay::WriteTarget;

/// Naming scheme of a flat key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyStyle {
    Env,
    Cli,
}

impl fmt::Display for KeyStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyStyle::Env => f.write_str("environment variable"),
            KeyStyle::Cli => f.write_str("command-line option"),
        }
    }
}

/// Bidirectional mapping between flat keys and configuration paths
#[derive(Debug, Clone, Default)]
pub struct FlatKeyMap {
    flat: FlatSchema,
    prefix: String,
    env: BTreeMap<String, FlatPath>,
    cli: BTreeMap<String, FlatPath>,
}

impl FlatKeyMap {
    pub fn new(flat: FlatSchema, prefix: impl Into<String>) -> Self {
        let prefix = normalize_prefix(&prefix.into());
        let mut env = BTreeMap::new();
        let mut cli = BTreeMap::new();
        for entry in flat.iter() {
            env.insert(env_key(&prefix, &entry.path), entry.path.clone());
            cli.insert(cli_key(&entry.path), entry.path.clone());
        }
        Self {
            flat,
            prefix,
            env,
            cli,
        }
    }

    /// Uppercase prefix without leading underscores
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn flat(&self) -> &FlatSchema {
        &self.flat
    }

    pub fn env_key(&self, path: &[String]) -> String {
        env_key(&self.prefix, path)
    }

    pub fn cli_key(&self, path: &[String]) -> String {
        cli_key(path)
    }

    /// All keys of a style, sorted
    pub fn keys(&self, style: KeyStyle) -> impl Iterator<Item = &str> {
        self.table(style).keys().map(String::as_str)
    }

    fn table(&self, style: KeyStyle) -> &BTreeMap<String, FlatPath> {
        match style {
            KeyStyle::Env => &self.env,
            KeyStyle::Cli => &self.cli,
        }
    }

    pub fn is_known(&self, style: KeyStyle, key: &str) -> bool {
        self.table(style).contains_key(key)
    }

    /// Whether an environment variable carries this map's prefix
    pub fn is_prefixed(&self, env_key: &str) -> bool {
        env_key.starts_with(&format!("{}_", self.prefix))
    }

    pub fn is_known_cli_opt(&self, cli_key: &str) -> bool {
        self.is_known(KeyStyle::Cli, cli_key)
    }

    pub fn resolve(&self, style: KeyStyle, key: &str) -> Result<&FlatPathEntry> {
        self.table(style)
            .get(key)
            .and_then(|path| self.flat.get(path))
            .ok_or_else(|| Error::UnknownPath {
                key: key.to_string(),
            })
    }

    /// Value of a key in a configuration tree
    pub fn get<'t>(&self, tree: &'t Node, style: KeyStyle, key: &str) -> Result<&'t Node> {
        let entry = self.resolve(style, key)?;
        get_at_path(tree, &key_path(&entry.path)).ok_or_else(|| {
            strata_doc::Error::PathNotFound {
                path: entry.path.join("."),
            }
            .into()
        })
    }

    /// Coerce `raw` for a key and write it into `target`.
    ///
    /// Intermediate mappings are never created; a missing one fails the
    /// write.
    pub fn set<T: WriteTarget + ?Sized>(
        &self,
        target: &mut T,
        style: KeyStyle,
        key: &str,
        raw: Node,
    ) -> Result<()> {
        let entry = self.resolve(style, key)?;
        let value = coerce(entry, key, raw)?;
        target.write_at(&entry.path, value)
    }
}

/// Convert an override to the kind its path expects.
///
/// List paths take a sequence, or text holding a JSON array. Text for a
/// value path with a declared type is converted by the first coercion of
/// that type that succeeds, and kept as text when none does.
pub fn coerce(entry: &FlatPathEntry, key: &str, raw: Node) -> Result<Node> {
    let invalid = |message: String| Error::InvalidValue {
        key: key.to_string(),
        message,
    };

    match entry.kind {
        FlatValueKind::List => match raw {
            Node::Sequence(_) => Ok(raw),
            Node::Scalar(Scalar::String(text)) => {
                match serde_json::from_str::<serde_json::Value>(&text) {
                    Ok(serde_json::Value::Array(items)) => {
                        Ok(Node::from(serde_json::Value::Array(items)))
                    }
                    Ok(other) => Err(invalid(format!(
                        "expected a JSON array, found {}",
                        Node::from(other).kind_name()
                    ))),
                    Err(e) => Err(invalid(format!("malformed JSON list: {e}"))),
                }
            }
            other => Err(invalid(format!("expected a list, found {}", other.kind_name()))),
        },
        FlatValueKind::Value => {
            let declared = entry.declared_type.as_deref().and_then(ValueType::from_name);
            if let (Some(ty), Some(text)) = (declared, raw.as_str()) {
                if let Some(value) = ty.coerce(text) {
                    return Ok(value);
                }
            }
            Ok(raw)
        }
    }
}

fn normalize_prefix(prefix: &str) -> String {
    prefix.trim_start_matches('_').to_uppercase()
}

fn env_key(prefix: &str, path: &[String]) -> String {
    format!("{}_{}", prefix, path.join("__").to_uppercase())
}

fn cli_key(path: &[String]) -> String {
    path.join("--").replace('_', "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn path(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    fn key_map(prefix: &str) -> FlatKeyMap {
        let mut flat = FlatSchema::new();
        flat.register_value(
            path(&["bottom_sensor", "preactivation_timeout"]),
            Some("integer".to_string()),
        );
        flat.register_value(path(&["ui", "addr"]), None);
        flat.register_list(path(&["sensor_config", "sensors"]));
        FlatKeyMap::new(flat, prefix)
    }

    #[rstest]
    #[case("ONAC", "ONAC_BOTTOM_SENSOR__PREACTIVATION_TIMEOUT")]
    #[case("__onac", "ONAC_BOTTOM_SENSOR__PREACTIVATION_TIMEOUT")]
    #[case("", "_BOTTOM_SENSOR__PREACTIVATION_TIMEOUT")]
    fn test_env_key(#[case] prefix: &str, #[case] expected: &str) {
        let keys = key_map(prefix);
        assert_eq!(keys.env_key(&path(&["bottom_sensor", "preactivation_timeout"])), expected);
        assert!(keys.is_known(KeyStyle::Env, expected));
        assert!(keys.is_prefixed(expected));
    }

    #[test]
    fn test_cli_key() {
        let keys = key_map("ONAC");
        assert_eq!(
            keys.cli_key(&path(&["bottom_sensor", "preactivation_timeout"])),
            "bottom-sensor--preactivation-timeout"
        );
        assert!(keys.is_known_cli_opt("ui--addr"));
        assert!(!keys.is_known_cli_opt("ui--port"));
    }

    #[test]
    fn test_is_prefixed() {
        let keys = key_map("ONAC");
        assert!(keys.is_prefixed("ONAC_ANYTHING"));
        assert!(!keys.is_prefixed("ONACX_ANYTHING"));
        assert!(!keys.is_prefixed("PATH"));
    }

    #[test]
    fn test_resolve_unknown() {
        let keys = key_map("ONAC");
        let err = keys
            .resolve(KeyStyle::Env, "ONAC_BOTTOM_SENSOR__SOMETHING_STUPID")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "No configuration exists for ONAC_BOTTOM_SENSOR__SOMETHING_STUPID"
        );
    }

    #[test]
    fn test_set_coerces_declared_type() {
        let keys = key_map("ONAC");
        let mut tree = Node::Mapping(
            [(
                "bottom_sensor".to_string(),
                Node::Mapping([("preactivation_timeout".to_string(), Node::from(5))].into_iter().collect()),
            )]
            .into_iter()
            .collect(),
        );

        keys.set(
            &mut tree,
            KeyStyle::Env,
            "ONAC_BOTTOM_SENSOR__PREACTIVATION_TIMEOUT",
            Node::from("6"),
        )
        .unwrap();

        assert_eq!(
            keys.get(&tree, KeyStyle::Cli, "bottom-sensor--preactivation-timeout").unwrap(),
            &Node::from(6)
        );
    }

    #[test]
    fn test_set_keeps_text_when_coercion_fails() {
        let keys = key_map("ONAC");
        let entry = keys.resolve(KeyStyle::Cli, "bottom-sensor--preactivation-timeout").unwrap();
        assert_eq!(coerce(entry, "k", Node::from("30.1")).unwrap(), Node::from("30.1"));
    }

    #[test]
    fn test_untyped_value_stays_text() {
        let keys = key_map("ONAC");
        let entry = keys.resolve(KeyStyle::Cli, "ui--addr").unwrap();
        assert_eq!(coerce(entry, "k", Node::from("8")).unwrap(), Node::from("8"));
    }

    #[rstest]
    #[case(r#"[{"id": 2, "name": "json_sensor"}]"#, true)]
    #[case(r#"[{"id": 2, "name": "json_sensor"]"#, false)]
    #[case(r#"{"id": 2}"#, false)]
    #[case("not json", false)]
    fn test_list_coercion(#[case] text: &str, #[case] ok: bool) {
        let keys = key_map("ONAC");
        let entry = keys.resolve(KeyStyle::Env, "ONAC_SENSOR_CONFIG__SENSORS").unwrap();
        let result = coerce(entry, "ONAC_SENSOR_CONFIG__SENSORS", Node::from(text));
        match result {
            Ok(node) => {
                assert!(ok);
                assert!(node.is_sequence());
            }
            Err(err) => {
                assert!(!ok);
                assert!(matches!(err, Error::InvalidValue { .. }));
            }
        }
    }

    #[test]
    fn test_list_accepts_sequence_rejects_scalar() {
        let keys = key_map("ONAC");
        let entry = keys.resolve(KeyStyle::Cli, "sensor-config--sensors").unwrap();
        assert!(coerce(entry, "k", Node::from(vec![Node::from(1)])).is_ok());
        assert!(matches!(
            coerce(entry, "k", Node::from(3)),
            Err(Error::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_set_missing_container() {
        let keys = key_map("ONAC");
        let mut tree = Node::empty_mapping();
        let err = keys
            .set(&mut tree, KeyStyle::Cli, "ui--addr", Node::from("127.0.0.1"))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Document(strata_doc::Error::MissingContainer { .. })
        ));
    }
}
