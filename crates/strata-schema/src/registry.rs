//! Registry of named schema rules

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::rule::NestedRule;

/// Rules registered through `oc_schema_id`, looked up by `Reference` rules
///
/// Only direct self-references are rejected here; longer cycles are caught
/// by the validator when it follows references.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleRegistry {
    rules: BTreeMap<String, NestedRule>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule, replacing any earlier rule with the same id.
    pub fn register(&mut self, id: impl Into<String>, rule: NestedRule) -> Result<()> {
        let id = id.into();
        if matches!(&rule, NestedRule::Reference(target) if *target == id) {
            return Err(Error::SelfReference { id });
        }
        if self.rules.insert(id.clone(), rule).is_some() {
            debug!(%id, "schema id registered again, replacing earlier rule");
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&NestedRule> {
        self.rules.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rules.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
