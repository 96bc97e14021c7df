//! Targets command implementation

use anyhow::{Context, Result};
use clap::Args;

use super::utils::ConnectionArgs;
use crate::config::CliOverrides;

#[derive(Args)]
pub struct TargetsArgs {
    /// Item id (a word id works too)
    #[arg(value_name = "ITEM_ID")]
    pub item_id: String,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Print the raw response as JSON
    #[arg(long)]
    pub raw: bool,
}

pub fn run(args: TargetsArgs) -> Result<()> {
    let item_id = args.item_id.trim();
    if item_id.is_empty() {
        anyhow::bail!("Item id must not be empty");
    }

    let config = args.connection.load_config(CliOverrides::default())?;
    let client = args.connection.connect(&config)?;

    if args.raw {
        let raw = client
            .item_targets_raw(item_id)
            .with_context(|| format!("Failed fetching targets for {item_id}"))?;
        println!("{}", serde_json::to_string_pretty(&raw)?);
        return Ok(());
    }

    let targets = client
        .item_targets(item_id)
        .with_context(|| format!("Failed fetching targets for {item_id}"))?;
    if targets.is_empty() {
        println!("No folders contain {item_id}");
        return Ok(());
    }

    println!("Folders containing {} ({}):", item_id, targets.len());
    for target in &targets {
        let title = target
            .raw
            .get("title")
            .and_then(|v| v.as_str())
            .map(|t| format!("\t{t}"))
            .unwrap_or_default();
        println!("  {}{}", target.parent_folder_id, title);
    }
    Ok(())
}
