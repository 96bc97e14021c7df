//! Run metadata: where the export is and what went wrong along the way.
//!
//! Metadata is an observability and resumption aid only. Correctness of the exported set
//! rests on the dedup index alone.

use super::item::{SortOrder, TargetType};
use super::partition::Partition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a partition's page walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WalkEnd {
    /// A page came back with no items.
    EmptyPage,
    /// A page repeated the previous page's keys: the server-side clamp.
    RepeatedPage,
    /// Several consecutive pages added nothing new to the partition.
    NoNewItems,
    /// The server's own page count was reached.
    LastReportedPage,
    /// The configured page bound was reached.
    PageLimit,
    /// A page fetch failed.
    Failed,
    /// The expected unique count was reached before the walk finished.
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastPosition {
    pub folder_id: String,
    pub folder_title: String,
    pub sort_type: SortOrder,
    pub page_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionProgress {
    pub folder_id: String,
    pub sort_type: SortOrder,
    pub last_page: Option<u32>,
    pub pages_walked: u32,
    pub new_items: usize,
    pub ended: Option<WalkEnd>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedPartition {
    pub folder_id: String,
    pub folder_title: String,
    pub sort_type: SortOrder,
    pub page_index: u32,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    pub target_types: Vec<TargetType>,
    pub expected: Option<usize>,
    pub unique_items: usize,
    pub last: Option<LastPosition>,
    pub partitions: Vec<PartitionProgress>,
    pub failed_partitions: Vec<FailedPartition>,
    pub stopped: bool,
    pub updated_at: DateTime<Utc>,
}

impl RunMetadata {
    pub fn new(target_types: Vec<TargetType>, expected: Option<usize>) -> Self {
        Self {
            target_types,
            expected,
            unique_items: 0,
            last: None,
            partitions: Vec::new(),
            failed_partitions: Vec::new(),
            stopped: false,
            updated_at: Utc::now(),
        }
    }

    pub(crate) fn begin_partition(&mut self, partition: &Partition) {
        self.partitions.push(PartitionProgress {
            folder_id: partition.folder.id.clone(),
            sort_type: partition.sort_order,
            last_page: None,
            pages_walked: 0,
            new_items: 0,
            ended: None,
        });
        self.updated_at = Utc::now();
    }

    pub(crate) fn record_page(
        &mut self,
        partition: &Partition,
        page_index: u32,
        new_items: usize,
        unique_items: usize,
    ) {
        if let Some(progress) = self.partitions.last_mut() {
            progress.last_page = Some(page_index);
            progress.pages_walked += 1;
            progress.new_items += new_items;
        }
        self.last = Some(LastPosition {
            folder_id: partition.folder.id.clone(),
            folder_title: partition.folder.title.clone(),
            sort_type: partition.sort_order,
            page_index,
        });
        self.unique_items = unique_items;
        self.updated_at = Utc::now();
    }

    pub(crate) fn record_failure(&mut self, partition: &Partition, page_index: u32, error: String) {
        self.failed_partitions.push(FailedPartition {
            folder_id: partition.folder.id.clone(),
            folder_title: partition.folder.title.clone(),
            sort_type: partition.sort_order,
            page_index,
            error,
        });
        self.updated_at = Utc::now();
    }

    pub(crate) fn end_partition(&mut self, ended: WalkEnd) {
        if let Some(progress) = self.partitions.last_mut() {
            progress.ended = Some(ended);
        }
        self.updated_at = Utc::now();
    }
}
