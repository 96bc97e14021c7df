//! Folders and the independent views (partitions) walked over them.

use super::item::{SortOrder, TargetType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A collection folder as listed by the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub title: String,
}

impl Folder {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into() }
    }
}

/// One `(folder, sortType, targetTypes)` view. The server clamps paging per view, so
/// each partition is walked on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub folder: Folder,
    pub sort_order: SortOrder,
    pub target_types: BTreeSet<TargetType>,
}

impl Partition {
    pub fn accepts(&self, target_type: TargetType) -> bool {
        self.target_types.contains(&target_type)
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "folder {} sortType {}", self.folder.id, self.sort_order)
    }
}
