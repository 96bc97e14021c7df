//! Folders command implementation

use anyhow::{Context, Result};
use clap::Args;

use super::utils::{root_folder_id, ConnectionArgs};
use crate::client::FolderDirectory;
use crate::config::CliOverrides;
use crate::scope::folders::pick_sentence_folder;

#[derive(Args)]
pub struct FoldersArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Root folder id to list under
    #[arg(long, env = "MOJI_ROOT_FOLDER_ID", value_name = "ID")]
    pub root_folder_id: Option<String>,
}

pub fn run(args: FoldersArgs) -> Result<()> {
    let overrides = CliOverrides {
        root_folder_id: root_folder_id(args.root_folder_id.as_deref()),
        ..CliOverrides::default()
    };
    let config = args.connection.load_config(overrides)?;
    let client = args.connection.connect(&config)?;

    let folders = client
        .list_folders(config.root_folder_id.as_deref())
        .context("Failed listing folders")?;
    if folders.is_empty() {
        println!("No folders returned for this account");
        return Ok(());
    }

    let suggested = pick_sentence_folder(&folders).map(|f| f.id.clone());
    println!("Folders ({}):", folders.len());
    for folder in &folders {
        let marker = if suggested.as_deref() == Some(folder.id.as_str()) { "  *" } else { "" };
        println!("  {}\t{}{}", folder.id, folder.title, marker);
    }
    if suggested.is_some() {
        println!("* exported by default when no --folder-id is given");
    }
    Ok(())
}
