//! Core data model shared by the enumerator, walker, index and engine.

pub mod config;
pub mod item;
pub mod partition;
pub mod progress;

pub use config::{ClientConfig, Config, ExportMode};
pub use item::{ItemKey, KeyedItem, RawItem, SortOrder, TargetType};
pub use partition::{Folder, Partition};
pub use progress::{FailedPartition, LastPosition, PartitionProgress, RunMetadata, WalkEnd};
