//! The `get` and `keys` commands

use strata_core::{ConfigManager, KeyStyle};
use strata_doc::path::{get_at_path, key_path};
use strata_schema::FlatValueKind;

use crate::error::Result;

/// Print the resolved value of an option-style key as JSON
pub fn run_get(manager: &ConfigManager, key: &str) -> Result<()> {
    let value = manager.get_cli_opt_value(key)?;
    let json = serde_json::Value::from(&value);
    println!("{}", serde_json::to_string(&json)?);
    Ok(())
}

/// Print every key of a style with the kind of value it takes and its
/// description, when the defaults file gives one
pub fn run_keys(manager: &ConfigManager, env: bool) -> Result<()> {
    let keys = manager.keys();
    let style = if env { KeyStyle::Env } else { KeyStyle::Cli };

    for key in keys.keys(style) {
        let entry = keys.resolve(style, key)?;
        let kind = match entry.kind {
            FlatValueKind::List => "list (JSON)",
            FlatValueKind::Value => entry.declared_type.as_deref().unwrap_or("any"),
        };
        let name = match style {
            KeyStyle::Env => key.to_string(),
            KeyStyle::Cli => format!("--{key}"),
        };
        let description = get_at_path(manager.descriptions(), &key_path(&entry.path))
            .and_then(|node| node.as_str());

        match description {
            Some(text) => println!("{name}\t{kind}\t{text}"),
            None => println!("{name}\t{kind}"),
        }
    }
    Ok(())
}
