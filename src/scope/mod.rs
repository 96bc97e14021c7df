//! Partition enumeration: expand a requested scope into the views to walk.
//!
//! The server clamps paging per `(folder, sortType, targetTypes)` view, so the only way
//! past the ceiling is to walk more views. Each folder is crossed with each sort order;
//! the whole type filter travels with every partition instead of being split.

use crate::domain::{Folder, Partition, SortOrder, TargetType};
use crate::error::ExportError;
use std::collections::BTreeSet;

pub mod folders;
pub mod values;

pub use folders::{select_folders, FolderSelection};
pub use values::{parse_sort_orders, parse_target_types};

/// The user's requested scope: which folders, sort orders and item types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportScope {
    pub folders: Vec<Folder>,
    pub sort_orders: Vec<SortOrder>,
    pub target_types: BTreeSet<TargetType>,
}

impl ExportScope {
    pub fn new(
        folders: Vec<Folder>,
        sort_orders: Vec<SortOrder>,
        target_types: BTreeSet<TargetType>,
    ) -> Self {
        Self { folders, sort_orders, target_types }
    }
}

/// Expand the scope folder-major, then by sort order, into partitions.
///
/// The order is deterministic so a rerun replays the same prefix of views.
pub fn enumerate_partitions(scope: &ExportScope) -> Result<Vec<Partition>, ExportError> {
    if scope.folders.is_empty() {
        return Err(ExportError::config("Scope has no folders"));
    }
    if scope.sort_orders.is_empty() {
        return Err(ExportError::config("Scope has no sort types"));
    }
    if scope.target_types.is_empty() {
        return Err(ExportError::config("Scope has no target types"));
    }

    Ok(scope
        .folders
        .iter()
        .flat_map(|folder| {
            scope.sort_orders.iter().map(move |sort_order| Partition {
                folder: folder.clone(),
                sort_order: *sort_order,
                target_types: scope.target_types.clone(),
            })
        })
        .collect())
}
