//! Flat index of value and list paths

use std::collections::BTreeMap;

/// Key chain from the document root
pub type FlatPath = Vec<String>;

/// Whether a path holds a single value or a whole list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlatValueKind {
    Value,
    List,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatPathEntry {
    pub path: FlatPath,
    pub kind: FlatValueKind,
    /// Single type name from the leaf's rule; lists never carry one
    pub declared_type: Option<String>,
}

/// Every addressable path of a compiled schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatSchema {
    entries: BTreeMap<FlatPath, FlatPathEntry>,
}

impl FlatSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_value(&mut self, path: FlatPath, declared_type: Option<String>) {
        self.insert(FlatPathEntry {
            path,
            kind: FlatValueKind::Value,
            declared_type,
        });
    }

    pub fn register_list(&mut self, path: FlatPath) {
        self.insert(FlatPathEntry {
            path,
            kind: FlatValueKind::List,
            declared_type: None,
        });
    }

    fn insert(&mut self, entry: FlatPathEntry) {
        self.entries.insert(entry.path.clone(), entry);
    }

    pub fn get(&self, path: &[String]) -> Option<&FlatPathEntry> {
        self.entries.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlatPathEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
