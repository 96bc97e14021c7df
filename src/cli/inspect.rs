//! Inspect command implementation

use anyhow::Result;
use clap::Args;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::domain::TargetType;
use crate::sink::ProgressArtifact;

#[derive(Args)]
pub struct InspectArgs {
    /// JSON progress file written by `export --json`
    #[arg(value_name = "FILE")]
    pub path: PathBuf,
}

pub fn run(args: InspectArgs) -> Result<()> {
    let artifact = ProgressArtifact::read(&args.path)?;
    let meta = &artifact.meta;

    println!("Progress file: {}", args.path.display());
    println!("Updated: {}", meta.updated_at.to_rfc3339());
    println!("Unique items: {}", artifact.items_by_id.len());
    if meta.unique_items != artifact.items_by_id.len() {
        println!("  (metadata reports {})", meta.unique_items);
    }

    // Counts per targetType, taken from the "<type>:<id>" keys
    let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
    for key in artifact.items_by_id.keys() {
        let tag = key.split_once(':').map(|(t, _)| t).unwrap_or(key.as_str());
        *by_type.entry(tag.to_string()).or_default() += 1;
    }
    for (tag, count) in &by_type {
        println!("  targetType {tag}: {count}");
    }

    let types: Vec<String> = meta.target_types.iter().map(TargetType::to_string).collect();
    println!("Target types: {}", types.join(","));
    match meta.expected {
        Some(expected) => println!("Expected: {expected} (stopped: {})", meta.stopped),
        None => println!("Stopped: {}", meta.stopped),
    }
    if let Some(last) = &meta.last {
        println!(
            "Last position: folder {} ({}) sortType {} page {}",
            last.folder_id, last.folder_title, last.sort_type, last.page_index
        );
    }
    println!("Folder views walked: {}", meta.partitions.len());

    if meta.failed_partitions.is_empty() {
        println!("Failed folder views: none");
    } else {
        println!("Failed folder views ({}):", meta.failed_partitions.len());
        for failed in &meta.failed_partitions {
            println!(
                "  folder {} sortType {} page {}: {}",
                failed.folder_id, failed.sort_type, failed.page_index, failed.error
            );
        }
    }
    Ok(())
}
