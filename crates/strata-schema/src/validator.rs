//! Validation of configuration trees against a compiled schema
//!
//! Supported rules: `type`, `nullable`, `required`, `empty`, `allowed`,
//! `min`, `max`, `minlength`, `maxlength`, `regex` and `schema`. Unknown
//! rule names are ignored.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use strata_doc::{Mapping, Node};

use crate::registry::RuleRegistry;
use crate::rule::{Fields, NestedRule, SchemaNode};
use crate::types::ValueType;

/// Validation failures keyed by dotted path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    /// Messages recorded for a path such as `sensor_config.sensors.0.id`
    pub fn messages(&self, path: &str) -> Option<&[String]> {
        self.errors.get(path).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(path.into()).or_default().push(message.into());
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (path, messages) in &self.errors {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                first = false;
                let path = if path.is_empty() { "<root>" } else { path };
                write!(f, "{path}: {message}")?;
            }
        }
        Ok(())
    }
}

/// Checks configuration trees against compiled [`Fields`]
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    schema: &'a Fields,
    registry: &'a RuleRegistry,
    allow_unknown: bool,
}

impl<'a> Validator<'a> {
    /// A validator that accepts keys the schema does not mention
    pub fn new(schema: &'a Fields, registry: &'a RuleRegistry) -> Self {
        Self {
            schema,
            registry,
            allow_unknown: true,
        }
    }

    pub fn allow_unknown(mut self, allow: bool) -> Self {
        self.allow_unknown = allow;
        self
    }

    pub fn validate(&self, document: &Node) -> ValidationReport {
        let mut run = Run {
            validator: self,
            path: Vec::new(),
            chain: Vec::new(),
            report: ValidationReport::new(),
        };
        match document {
            Node::Mapping(map) => run.check_fields(self.schema, map),
            other => run.error(format!("must be of dict type, found {}", other.kind_name())),
        }
        run.report
    }
}

/// Where nested rules for a value come from
#[derive(Clone, Copy)]
enum Nested<'s> {
    Rule(&'s NestedRule),
    /// A `schema` rule written directly in a rule payload
    Payload(&'s Node),
}

struct Run<'v, 'a> {
    validator: &'v Validator<'a>,
    path: Vec<String>,
    /// Registry ids being followed for the current value
    chain: Vec<String>,
    report: ValidationReport,
}

impl<'a> Run<'_, 'a> {
    fn error(&mut self, message: impl Into<String>) {
        self.report.push(self.path.join("."), message);
    }

    fn child_error(&mut self, key: &str, message: impl Into<String>) {
        self.path.push(key.to_string());
        self.error(message);
        self.path.pop();
    }

    /// Visit a child value; reference chains restart below it.
    fn descend(&mut self, key: String, visit: impl FnOnce(&mut Self)) {
        let chain = std::mem::take(&mut self.chain);
        self.path.push(key);
        visit(self);
        self.path.pop();
        self.chain = chain;
    }

    fn check_fields(&mut self, fields: &'a Fields, map: &Mapping) {
        for (key, rule) in fields {
            match map.get(key) {
                Some(value) => self.descend(key.clone(), |run| run.check_node(value, rule)),
                None if rule.is_required() => self.child_error(key, "required field"),
                None => {}
            }
        }
        if !self.validator.allow_unknown {
            for key in map.keys().filter(|key| !fields.contains_key(*key)) {
                self.child_error(key, "unknown field");
            }
        }
    }

    fn check_node(&mut self, value: &Node, schema: &'a SchemaNode) {
        match schema {
            SchemaNode::Dict { nested, attrs } => {
                self.check_rules(value, attrs, Some(ValueType::Dict), Some(Nested::Rule(nested)))
            }
            SchemaNode::List { nested, attrs } => {
                self.check_rules(value, attrs, Some(ValueType::List), Some(Nested::Rule(nested)))
            }
            SchemaNode::Rule(Node::Mapping(rules)) => self.check_rules(value, rules, None, None),
            SchemaNode::Rule(Node::Scalar(strata_doc::Scalar::String(id))) => {
                self.follow(value, id)
            }
            SchemaNode::Rule(_) => {}
        }
    }

    fn check_rules(
        &mut self,
        value: &Node,
        rules: &'a Mapping,
        implied: Option<ValueType>,
        nested: Option<Nested<'a>>,
    ) {
        if value.is_null() {
            if rules.get("nullable").and_then(Node::as_bool) != Some(true) {
                self.error("null value not allowed");
            }
            return;
        }

        let types = match rules.get("type") {
            Some(names) => type_names(names),
            None => implied.into_iter().collect(),
        };
        if !types.is_empty() && !types.iter().any(|ty| ty.matches(value)) {
            let names: Vec<_> = types.iter().map(ValueType::name).collect();
            self.error(format!("must be of {} type", names.join(" or ")));
            return;
        }

        if rules.get("empty").and_then(Node::as_bool) == Some(false) && value.len() == Some(0) {
            self.error("empty values not allowed");
        }

        if let Some(allowed) = rules.get("allowed").and_then(Node::as_sequence) {
            self.check_allowed(value, allowed);
        }

        self.check_bounds(value, rules);

        if let (Some(pattern), Some(text)) = (rules.get("regex").and_then(Node::as_str), value.as_str()) {
            match Regex::new(&format!("^(?:{pattern})$")) {
                Ok(re) if re.is_match(text) => {}
                Ok(_) => self.error(format!("value does not match regex '{pattern}'")),
                Err(_) => self.error(format!("invalid regex pattern '{pattern}'")),
            }
        }

        let nested = nested.or_else(|| rules.get("schema").map(Nested::Payload));
        if let Some(nested) = nested {
            self.check_nested(value, nested);
        }
    }

    fn check_allowed(&mut self, value: &Node, allowed: &[Node]) {
        match value {
            Node::Sequence(items) => {
                let unallowed: Vec<String> = items
                    .iter()
                    .filter(|item| !allowed.contains(item))
                    .map(Node::to_string)
                    .collect();
                if !unallowed.is_empty() {
                    self.error(format!("unallowed values [{}]", unallowed.join(", ")));
                }
            }
            other if !allowed.contains(other) => {
                self.error(format!("unallowed value {other}"));
            }
            _ => {}
        }
    }

    fn check_bounds(&mut self, value: &Node, rules: &Mapping) {
        if let Some(number) = value.as_f64() {
            if let Some(min) = rules.get("min").filter(|m| m.as_f64().is_some_and(|m| number < m)) {
                self.error(format!("min value is {min}"));
            }
            if let Some(max) = rules.get("max").filter(|m| m.as_f64().is_some_and(|m| number > m)) {
                self.error(format!("max value is {max}"));
            }
        }
        if let Some(len) = value.len() {
            let len = len as i64;
            if let Some(min) = rules.get("minlength").and_then(Node::as_i64).filter(|min| len < *min) {
                self.error(format!("min length is {min}"));
            }
            if let Some(max) = rules.get("maxlength").and_then(Node::as_i64).filter(|max| len > *max) {
                self.error(format!("max length is {max}"));
            }
        }
    }

    fn check_nested(&mut self, value: &Node, nested: Nested<'a>) {
        match nested {
            Nested::Rule(NestedRule::Empty) => {}
            Nested::Rule(NestedRule::Fields(fields)) => {
                if let Node::Mapping(map) = value {
                    self.check_fields(fields, map);
                }
            }
            Nested::Rule(NestedRule::Item(item)) => {
                if let Node::Sequence(items) = value {
                    for (index, element) in items.iter().enumerate() {
                        self.descend(index.to_string(), |run| run.check_node(element, item));
                    }
                }
            }
            Nested::Rule(NestedRule::Reference(id)) => self.follow(value, id),
            Nested::Rule(NestedRule::Raw(payload)) | Nested::Payload(payload) => {
                self.check_payload(value, payload)
            }
        }
    }

    /// Apply a verbatim `schema` payload: field rules for a mapping value,
    /// item rules for a sequence value, or a registry id.
    fn check_payload(&mut self, value: &Node, payload: &'a Node) {
        match (payload, value) {
            (Node::Scalar(strata_doc::Scalar::String(id)), _) => self.follow(value, id),
            (Node::Mapping(field_rules), Node::Mapping(map)) => {
                for (key, rules) in field_rules {
                    let Node::Mapping(rules) = rules else { continue };
                    match map.get(key) {
                        Some(child) => self.descend(key.clone(), |run| {
                            run.check_rules(child, rules, None, None)
                        }),
                        None if rules.get("required").and_then(Node::as_bool) == Some(true) => {
                            self.child_error(key, "required field")
                        }
                        None => {}
                    }
                }
                if !self.validator.allow_unknown {
                    for key in map.keys().filter(|key| !field_rules.contains_key(key)) {
                        self.child_error(key, "unknown field");
                    }
                }
            }
            (Node::Mapping(item_rules), Node::Sequence(items)) => {
                for (index, element) in items.iter().enumerate() {
                    self.descend(index.to_string(), |run| {
                        run.check_rules(element, item_rules, None, None)
                    });
                }
            }
            _ => {}
        }
    }

    fn follow(&mut self, value: &Node, id: &str) {
        if self.chain.iter().any(|active| active == id) {
            self.error(format!("circular schema reference '{id}'"));
            return;
        }
        let registry = self.validator.registry;
        match registry.get(id) {
            Some(rule) => {
                self.chain.push(id.to_string());
                self.check_nested(value, Nested::Rule(rule));
                self.chain.pop();
            }
            None => self.error(format!("unknown schema reference '{id}'")),
        }
    }
}

fn type_names(names: &Node) -> Vec<ValueType> {
    match names {
        Node::Sequence(items) => items
            .iter()
            .filter_map(Node::as_str)
            .filter_map(ValueType::from_name)
            .collect(),
        other => other.as_str().and_then(ValueType::from_name).into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::SchemaCompiler;
    use crate::rule::Fields;
    use strata_doc::{DocumentCodec, Format};

    fn yaml(source: &str) -> Node {
        DocumentCodec::new().parse(source, Format::Yaml).unwrap()
    }

    fn report(schema: &str, config: &str) -> ValidationReport {
        let compiled = SchemaCompiler::new().compile(&yaml(schema)).unwrap();
        compiled.validator().validate(&yaml(config))
    }

    const PORT: &str = "ui:\n  port:\n    oc_default: 8080\n    oc_schema: {type: integer, min: 1, max: 65535}\n";

    #[test]
    fn test_type_failure_stops_checks() {
        let report = report(PORT, "ui:\n  port: '80'\n");
        assert_eq!(
            report.messages("ui.port"),
            Some(&["must be of integer type".to_string()][..])
        );
    }

    #[test]
    fn test_bounds() {
        assert!(report(PORT, "ui:\n  port: 8080\n").is_valid());
        let report = report(PORT, "ui:\n  port: 70000\n");
        assert_eq!(report.messages("ui.port"), Some(&["max value is 65535".to_string()][..]));
    }

    #[test]
    fn test_null_requires_nullable() {
        let schema = "a:\n  oc_schema: {type: string}\nb:\n  oc_schema: {type: string, nullable: true}\n";
        let report = report(schema, "a: null\nb: null\n");
        assert_eq!(report.len(), 1);
        assert!(report.messages("a").is_some());
    }

    #[test]
    fn test_any_of_types() {
        let schema = "limit:\n  oc_default: 1\n  oc_schema: {type: [integer, string]}\n";
        assert!(report(schema, "limit: unlimited\n").is_valid());
        let report = report(schema, "limit: 1.5\n");
        assert_eq!(
            report.messages("limit"),
            Some(&["must be of integer or string type".to_string()][..])
        );
    }

    #[test]
    fn test_allowed_and_regex() {
        let schema = "level:\n  oc_default: info\n  oc_schema: {allowed: [debug, info]}\nchannel:\n  oc_default: can0\n  oc_schema: {type: string, regex: 'can[0-9]+'}\n";
        assert!(report(schema, "level: debug\nchannel: can314\n").is_valid());
        let report = report(schema, "level: trace\nchannel: xcan0\n");
        assert!(report.messages("level").is_some());
        assert!(report.messages("channel").is_some());
    }

    #[test]
    fn test_lengths_and_empty() {
        let schema = "name:\n  oc_default: abc\n  oc_schema: {type: string, minlength: 2, maxlength: 4, empty: false}\n";
        assert!(report(schema, "name: abc\n").is_valid());
        assert!(!report(schema, "name: abcdef\n").is_valid());
        let empty = report(schema, "name: ''\n");
        assert_eq!(empty.len(), 2);
    }

    #[test]
    fn test_required_field() {
        let schema = "db:\n  host:\n    oc_default: localhost\n    oc_schema: {type: string, required: true}\n";
        let report = report(schema, "db: {}\n");
        assert_eq!(report.messages("db.host"), Some(&["required field".to_string()][..]));
    }

    #[test]
    fn test_list_item_paths() {
        let schema = "sensors:\n  - id:\n      oc_default: 1\n      oc_schema: {type: integer}\n";
        let report = report(schema, "sensors:\n  - id: 1\n  - id: two\n");
        assert!(report.messages("sensors.1.id").is_some());
        assert!(report.messages("sensors.0.id").is_none());
    }

    #[test]
    fn test_unknown_keys() {
        let compiled = SchemaCompiler::new().compile(&yaml(PORT)).unwrap();
        let config = yaml("ui:\n  port: 80\n  extra: 1\n");
        assert!(compiled.validator().validate(&config).is_valid());
        let strict = compiled.validator().allow_unknown(false).validate(&config);
        assert_eq!(strict.messages("ui.extra"), Some(&["unknown field".to_string()][..]));
    }

    #[test]
    fn test_reference_cycle_reported() {
        let mut registry = RuleRegistry::new();
        registry.register("a", NestedRule::Reference("b".into())).unwrap();
        registry.register("b", NestedRule::Reference("a".into())).unwrap();
        let mut schema = Fields::new();
        schema.insert(
            "node".to_string(),
            SchemaNode::Dict {
                nested: NestedRule::Reference("a".into()),
                attrs: Mapping::new(),
            },
        );

        let report = Validator::new(&schema, &registry).validate(&yaml("node: {x: 1}\n"));

        assert_eq!(
            report.messages("node"),
            Some(&["circular schema reference 'a'".to_string()][..])
        );
    }

    #[test]
    fn test_recursive_reference_on_deeper_values() {
        let schema = "tree:\n  oc_schema_id: tree\n  value:\n    oc_default: 1\n    oc_schema: {type: integer}\n  child:\n    oc_schema: tree\n    value: 2\n";
        let config = "tree:\n  value: 1\n  child:\n    value: 2\n    child:\n      value: bad\n";
        let report = report(schema, config);
        assert_eq!(
            report.messages("tree.child.child.value"),
            Some(&["must be of integer type".to_string()][..])
        );
    }

    #[test]
    fn test_non_mapping_document() {
        let report = Validator::new(&Fields::new(), &RuleRegistry::new()).validate(&Node::from(1));
        assert!(!report.is_valid());
    }
}
