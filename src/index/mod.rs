//! Dedup index: the single record of which items have been found.

use crate::domain::{ItemKey, KeyedItem, RawItem};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Append-only mapping from item key to the first record seen under it.
///
/// Entries are never replaced or removed, so membership and the kept record are both
/// decided by the first partition that produced the key.
#[derive(Debug, Default)]
pub struct DedupIndex {
    positions: HashMap<ItemKey, usize>,
    entries: Vec<KeyedItem>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record` under `key` unless the key is already present.
    ///
    /// Returns `true` when the key was new.
    pub fn insert_if_absent(&mut self, key: ItemKey, record: RawItem) -> bool {
        if self.positions.contains_key(&key) {
            return false;
        }
        self.positions.insert(key.clone(), self.entries.len());
        self.entries.push(KeyedItem { key, record });
        true
    }

    pub fn contains(&self, key: &ItemKey) -> bool {
        self.positions.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// An owned copy of the current contents, in discovery order.
    pub fn snapshot(&self) -> DedupSnapshot {
        DedupSnapshot { positions: self.positions.clone(), entries: self.entries.clone() }
    }
}

/// Immutable view of the index at one point in a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupSnapshot {
    positions: HashMap<ItemKey, usize>,
    entries: Vec<KeyedItem>,
}

impl DedupSnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyedItem> {
        self.entries.iter()
    }

    pub fn get(&self, key: &ItemKey) -> Option<&RawItem> {
        self.positions.get(key).map(|&at| &self.entries[at].record)
    }

    pub fn keys(&self) -> impl Iterator<Item = &ItemKey> {
        self.entries.iter().map(|entry| &entry.key)
    }

    /// The persisted form: records keyed by `"<type>:<id>"`.
    pub fn items_by_id(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|entry| (entry.key.to_string(), entry.record.0.clone()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a DedupSnapshot {
    type Item = &'a KeyedItem;
    type IntoIter = std::slice::Iter<'a, KeyedItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
