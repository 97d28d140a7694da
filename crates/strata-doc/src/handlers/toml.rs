//! TOML format handler

use toml::Value as TomlValue;
use toml_edit::{Array, ArrayOfTables, DocumentMut, InlineTable, Item, Table, TableLike, Value};

use crate::error::{Error, Result};
use crate::format::{Format, FormatHandler};
use crate::node::{Mapping, Node, Scalar};

/// Handler for TOML documents
///
/// TOML has no null, so rendering a document that holds a null anywhere
/// fails instead of silently dropping the key. Rendering onto an original
/// document goes through toml_edit and keeps its comments and layout.
#[derive(Debug, Default)]
pub struct TomlHandler;

impl TomlHandler {
    pub fn new() -> Self {
        Self
    }
}

impl FormatHandler for TomlHandler {
    fn format(&self) -> Format {
        Format::Toml
    }

    fn parse(&self, source: &str) -> Result<Node> {
        let table: toml::Table =
            toml::from_str(source).map_err(|e| Error::parse("TOML", e.to_string()))?;
        Ok(Node::from(TomlValue::Table(table)))
    }

    fn render(&self, node: &Node) -> Result<String> {
        let value = to_toml(node, "")?;
        match value {
            TomlValue::Table(table) => {
                toml::to_string_pretty(&table).map_err(|e| Error::render("TOML", e.to_string()))
            }
            other => Err(Error::render(
                "TOML",
                format!("document root must be a table, found {}", other.type_str()),
            )),
        }
    }

    fn render_onto(&self, original: &str, node: &Node) -> Result<String> {
        let mut doc: DocumentMut = original
            .parse()
            .map_err(|e: toml_edit::TomlError| Error::parse("TOML", e.to_string()))?;
        let Node::Mapping(map) = node else {
            return Err(Error::render(
                "TOML",
                format!("document root must be a table, found {}", node.kind_name()),
            ));
        };
        edit_table(doc.as_table_mut(), map, "", false)?;
        Ok(doc.to_string())
    }
}

fn child_location(at: &str, key: &str) -> String {
    if at.is_empty() {
        key.to_string()
    } else {
        format!("{at}.{key}")
    }
}

fn null_error(at: &str) -> Error {
    let location = if at.is_empty() { "<root>" } else { at };
    Error::render("TOML", format!("null value at {location} cannot be represented"))
}

fn to_toml(node: &Node, at: &str) -> Result<TomlValue> {
    let value = match node {
        Node::Scalar(Scalar::Null) => return Err(null_error(at)),
        Node::Scalar(Scalar::Bool(b)) => TomlValue::Boolean(*b),
        Node::Scalar(Scalar::Int(i)) => TomlValue::Integer(*i),
        Node::Scalar(Scalar::Float(f)) => TomlValue::Float(*f),
        Node::Scalar(Scalar::String(s)) => TomlValue::String(s.clone()),
        Node::Sequence(items) => TomlValue::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| to_toml(item, &format!("{at}[{i}]")))
                .collect::<Result<Vec<_>>>()?,
        ),
        Node::Mapping(map) => {
            let mut table = toml::Table::new();
            for (key, value) in map {
                table.insert(key.clone(), to_toml(value, &child_location(at, key))?);
            }
            TomlValue::Table(table)
        }
    };
    Ok(value)
}

// Layout-preserving edits. Existing keys keep their decor (comments and
// whitespace); keys missing from the node are removed and new keys are
// appended without decoration.

fn edit_table(table: &mut dyn TableLike, map: &Mapping, at: &str, inline: bool) -> Result<()> {
    let stale: Vec<String> = table
        .iter()
        .map(|(key, _)| key.to_string())
        .filter(|key| !map.contains_key(key))
        .collect();
    for key in stale {
        table.remove(&key);
    }

    for (key, value) in map {
        let location = child_location(at, key);
        match table.get_mut(key) {
            Some(item) => edit_item(item, value, &location, inline)?,
            None => {
                table.insert(key, new_item(value, &location, inline)?);
            }
        }
    }
    Ok(())
}

fn edit_item(item: &mut Item, node: &Node, at: &str, inline: bool) -> Result<()> {
    match (item, node) {
        (Item::Table(table), Node::Mapping(map)) => edit_table(table, map, at, false),
        (Item::ArrayOfTables(tables), Node::Sequence(items))
            if !items.is_empty() && items.iter().all(Node::is_mapping) =>
        {
            edit_array_of_tables(tables, items, at)
        }
        (Item::Value(value), _) => edit_value(value, node, at),
        (item, _) => {
            *item = new_item(node, at, inline)?;
            Ok(())
        }
    }
}

fn edit_value(value: &mut Value, node: &Node, at: &str) -> Result<()> {
    match (value, node) {
        (Value::InlineTable(table), Node::Mapping(map)) => edit_table(table, map, at, true),
        (Value::Array(array), Node::Sequence(items)) => edit_array(array, items, at),
        (value, node) => {
            let decor = value.decor().clone();
            *value = new_value(node, at)?;
            *value.decor_mut() = decor;
            Ok(())
        }
    }
}

fn edit_array(array: &mut Array, items: &[Node], at: &str) -> Result<()> {
    while array.len() > items.len() {
        array.remove(array.len() - 1);
    }
    for (index, node) in items.iter().enumerate() {
        let location = format!("{at}[{index}]");
        match array.get_mut(index) {
            Some(value) => edit_value(value, node, &location)?,
            None => array.push(new_value(node, &location)?),
        }
    }
    Ok(())
}

fn edit_array_of_tables(tables: &mut ArrayOfTables, items: &[Node], at: &str) -> Result<()> {
    while tables.len() > items.len() {
        tables.remove(tables.len() - 1);
    }
    for (index, node) in items.iter().enumerate() {
        let Node::Mapping(map) = node else {
            continue;
        };
        let location = format!("{at}[{index}]");
        match tables.get_mut(index) {
            Some(table) => edit_table(table, map, &location, false)?,
            None => tables.push(new_table(map, &location)?),
        }
    }
    Ok(())
}

/// Mappings become standard tables unless they sit inside an inline table.
fn new_item(node: &Node, at: &str, inline: bool) -> Result<Item> {
    match node {
        Node::Mapping(map) if !inline => Ok(Item::Table(new_table(map, at)?)),
        other => Ok(Item::Value(new_value(other, at)?)),
    }
}

fn new_table(map: &Mapping, at: &str) -> Result<Table> {
    let mut table = Table::new();
    for (key, value) in map {
        table.insert(key, new_item(value, &child_location(at, key), false)?);
    }
    Ok(table)
}

fn new_value(node: &Node, at: &str) -> Result<Value> {
    let value = match node {
        Node::Scalar(Scalar::Null) => return Err(null_error(at)),
        Node::Scalar(Scalar::Bool(b)) => Value::from(*b),
        Node::Scalar(Scalar::Int(i)) => Value::from(*i),
        Node::Scalar(Scalar::Float(f)) => Value::from(*f),
        Node::Scalar(Scalar::String(s)) => Value::from(s.as_str()),
        Node::Sequence(items) => {
            let mut array = Array::new();
            for (index, item) in items.iter().enumerate() {
                array.push(new_value(item, &format!("{at}[{index}]"))?);
            }
            Value::Array(array)
        }
        Node::Mapping(map) => {
            let mut table = InlineTable::new();
            for (key, value) in map {
                table.insert(key.as_str(), new_value(value, &child_location(at, key))?);
            }
            Value::InlineTable(table)
        }
    };
    Ok(value)
}

impl From<TomlValue> for Node {
    fn from(value: TomlValue) -> Self {
        match value {
            TomlValue::String(s) => Node::from(s),
            TomlValue::Integer(i) => Node::from(i),
            TomlValue::Float(f) => Node::from(f),
            TomlValue::Boolean(b) => Node::from(b),
            TomlValue::Datetime(dt) => Node::from(dt.to_string()),
            TomlValue::Array(items) => Node::Sequence(items.into_iter().map(Node::from).collect()),
            TomlValue::Table(table) => Node::Mapping(
                table.into_iter().map(|(k, v)| (k, Node::from(v))).collect(),
            ),
        }
    }
}
