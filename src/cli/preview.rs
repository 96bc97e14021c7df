//! Preview command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::collections::BTreeMap;

use super::utils::{parse_mode, root_folder_id, ConnectionArgs};
use crate::client::{CollectionClient, FolderDirectory, Page};
use crate::config::CliOverrides;
use crate::domain::{KeyedItem, Partition, SortOrder};
use crate::render::{render_block, WordCache};
use crate::scope::{parse_sort_orders, parse_target_types, select_folders, FolderSelection};

#[derive(Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Folder id to preview (defaults to the sentence folder)
    #[arg(short = 'f', long = "folder-id", value_name = "ID")]
    pub folder_id: Option<String>,

    /// Root folder id used when listing folders
    #[arg(long, env = "MOJI_ROOT_FOLDER_ID", value_name = "ID")]
    pub root_folder_id: Option<String>,

    /// What to show: sentences, words or both
    #[arg(short = 'm', long, value_name = "MODE")]
    pub mode: Option<String>,

    /// Explicit targetType list (comma-separated), overrides --mode
    #[arg(long, value_name = "TYPES")]
    pub target_types: Option<String>,

    /// Sort type of the page (defaults to the first configured sort type)
    #[arg(short = 's', long, value_name = "N")]
    pub sort_type: Option<i64>,

    /// Page to request (1-based)
    #[arg(long, value_name = "N")]
    pub page: Option<u32>,

    /// Items per page
    #[arg(long, value_name = "N")]
    pub count: Option<u32>,

    /// Print at most this many items
    #[arg(long, value_name = "N", default_value_t = 10)]
    pub limit: usize,
}

pub fn run(args: PreviewArgs) -> Result<()> {
    let overrides = CliOverrides {
        root_folder_id: root_folder_id(args.root_folder_id.as_deref()),
        mode: args.mode.as_deref().map(parse_mode).transpose()?,
        target_types: args
            .target_types
            .as_deref()
            .map(|input| parse_target_types(input).map(|types| types.into_iter().collect()))
            .transpose()?,
        start_page: args.page,
        page_size: args.count,
        ..CliOverrides::default()
    };
    let config = args.connection.load_config(overrides)?;
    if config.page_size == 0 || config.start_page == 0 {
        anyhow::bail!("Page and page size must be at least 1");
    }
    let sort_order = match args.sort_type {
        Some(value) => SortOrder(value),
        None => parse_sort_orders(&config.sort_types)?
            .first()
            .copied()
            .unwrap_or(SortOrder(0)),
    };

    let client = args.connection.connect(&config)?;
    let root = config.root_folder_id.as_deref();
    let selection = match &args.folder_id {
        Some(id) => FolderSelection::Explicit(vec![id.trim().to_string()]),
        None => FolderSelection::Auto,
    };
    let listed = client.list_folders(root).context("Failed listing folders")?;
    let folder = select_folders(&listed, &selection, root)?
        .into_iter()
        .next()
        .context("No folder to preview")?;

    let partition = Partition { folder, sort_order, target_types: config.effective_target_types() };
    eprintln!("Previewing {partition} ({}) page {}", partition.folder.title, config.start_page);
    let page = client.fetch_page(&partition, config.start_page, config.page_size)?;

    let mut words = WordCache::new(&client);
    let (blocks, printed) = preview_blocks(&page, &partition, args.limit, &mut words);
    print!("{blocks}");

    eprintln!("\nTargetType counts (this page):");
    for (tag, count) in type_counts(&page) {
        eprintln!("- {tag}: {count}");
    }
    if printed == 0 {
        eprintln!("\nNo matching items found in this folder page.");
        eprintln!("Try a different folder via --folder-id or change --page/--count.");
    }
    Ok(())
}

/// Render up to `limit` accepted items of one page, in page order.
fn preview_blocks(
    page: &Page,
    partition: &Partition,
    limit: usize,
    words: &mut WordCache<'_>,
) -> (String, usize) {
    let mut out = String::new();
    let mut printed = 0usize;
    for record in &page.items {
        if printed >= limit {
            break;
        }
        let Some(key) = record.key().filter(|key| partition.accepts(key.target_type)) else {
            continue;
        };
        let item = KeyedItem { key, record: record.clone() };
        if let Some(block) = render_block(&item, words) {
            out.push_str(&block);
            printed += 1;
        }
    }
    (out, printed)
}

/// Every raw item on the page counted by its `targetType`, unfiltered.
fn type_counts(page: &Page) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for item in &page.items {
        let tag = item.target_type().map(|t| t.to_string()).unwrap_or_else(|| "none".to_string());
        *counts.entry(tag).or_default() += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Folder, RawItem, TargetType};
    use serde_json::json;
    use std::collections::BTreeSet;

    fn page() -> Page {
        let items = vec![
            json!({"targetType": 120, "target": {"objectId": "s1", "title": "一"}}),
            json!({"targetType": 102, "target": {"objectId": "w1", "spell": "犬"}}),
            json!({"targetType": 120, "target": {"objectId": "s2", "title": "二"}}),
            json!({"targetType": 120, "target": {"objectId": "s3", "title": "三"}}),
            json!({"target": {"objectId": "x"}}),
        ];
        Page { items: items.into_iter().map(RawItem).collect(), reported_page_count: None }
    }

    fn sentences() -> Partition {
        Partition {
            folder: Folder::new("F", "例文"),
            sort_order: SortOrder(0),
            target_types: BTreeSet::from([TargetType::SENTENCE]),
        }
    }

    #[test]
    fn blocks_stop_at_limit_and_skip_other_types() {
        let (text, printed) = preview_blocks(&page(), &sentences(), 2, &mut WordCache::offline());
        assert_eq!(text, "\n---\n一\n\n---\n二\n");
        assert_eq!(printed, 2);
    }

    #[test]
    fn counts_cover_every_item_on_the_page() {
        let counts = type_counts(&page());
        let expected: BTreeMap<String, usize> =
            [("102", 1), ("120", 3), ("none", 1)].into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        assert_eq!(counts, expected);
    }
}
