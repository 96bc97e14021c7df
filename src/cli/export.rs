//! Export command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::utils::{parse_csv_multi, parse_mode, root_folder_id, ConnectionArgs};
use crate::client::FolderDirectory;
use crate::config::CliOverrides;
use crate::domain::{Config, TargetType};
use crate::engine::{run_export, ExportReport, ReconcileOptions};
use crate::render::WordCache;
use crate::scope::{parse_sort_orders, parse_target_types, select_folders, ExportScope, FolderSelection};
use crate::sink::{JsonFileSink, TextSink};
use crate::walker::WalkLimits;

const UTF8_BOM: &str = "\u{feff}";

#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Folder id to export (repeatable or comma-separated)
    #[arg(short = 'f', long = "folder-id", value_name = "ID")]
    pub folder_id: Vec<String>,

    /// Export every folder of the account, plus the root folder when given
    #[arg(long, conflicts_with = "folder_id")]
    pub all_folders: bool,

    /// Root folder id used when listing folders
    #[arg(long, env = "MOJI_ROOT_FOLDER_ID", value_name = "ID")]
    pub root_folder_id: Option<String>,

    /// What to export: sentences, words or both
    #[arg(short = 'm', long, value_name = "MODE")]
    pub mode: Option<String>,

    /// Explicit targetType list (comma-separated), overrides --mode
    #[arg(long, value_name = "TYPES")]
    pub target_types: Option<String>,

    /// Sort types to walk, e.g. '0' or '0..20' or '0,3,5-7'
    #[arg(short = 's', long, value_name = "LIST")]
    pub sort_types: Option<String>,

    /// First page to request (1-based)
    #[arg(long, value_name = "N")]
    pub page: Option<u32>,

    /// Items per page
    #[arg(long, value_name = "N")]
    pub count: Option<u32>,

    /// Maximum pages per folder view (0 removes the bound)
    #[arg(long, value_name = "N")]
    pub max_pages: Option<u32>,

    /// End a folder view after this many pages without new items (0 disables)
    #[arg(long, value_name = "N")]
    pub stop_after_no_new: Option<u32>,

    /// Stop once this many unique items are collected
    #[arg(long, value_name = "N")]
    pub expected: Option<usize>,

    /// Output file (stdout when omitted)
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write a JSON progress file instead of text, rewritten after every page
    #[arg(long)]
    pub json: bool,
}

impl ExportArgs {
    fn overrides(&self) -> Result<CliOverrides> {
        let mode = self.mode.as_deref().map(parse_mode).transpose()?;
        let target_types: Option<Vec<TargetType>> = self
            .target_types
            .as_deref()
            .map(|input| parse_target_types(input).map(|types| types.into_iter().collect()))
            .transpose()?;

        Ok(CliOverrides {
            root_folder_id: root_folder_id(self.root_folder_id.as_deref()),
            folder_ids: parse_csv_multi(&self.folder_id),
            all_folders: if self.all_folders { Some(true) } else { None },
            mode,
            target_types,
            sort_types: self.sort_types.clone(),
            start_page: self.page,
            page_size: self.count,
            max_pages: self.max_pages,
            stop_after_no_new: self.stop_after_no_new,
            expected: self.expected,
            output: self.output.clone(),
            json: if self.json { Some(true) } else { None },
            client_version: None,
        })
    }
}

pub fn run(args: ExportArgs) -> Result<()> {
    let start_time = Instant::now();

    let config = args.connection.load_config(args.overrides()?)?;
    validate(&config)?;

    // Everything that can be checked offline is checked before the first request
    let sort_orders = parse_sort_orders(&config.sort_types)?;
    let target_types = config.effective_target_types();
    let options = ReconcileOptions {
        limits: WalkLimits {
            page_size: config.page_size,
            start_page: config.start_page,
            max_pages: config.max_pages,
            stop_after_no_new: config.stop_after_no_new,
        },
        expected_count: config.expected_count(),
    };

    let client = args.connection.connect(&config)?;

    let selection = if !config.folder_ids.is_empty() {
        FolderSelection::Explicit(config.folder_ids.clone())
    } else if config.all_folders {
        FolderSelection::All
    } else {
        FolderSelection::Auto
    };
    let root = config.root_folder_id.as_deref();
    let listed = client.list_folders(root).context("Failed listing folders")?;
    let folders = select_folders(&listed, &selection, root)?;
    for folder in &folders {
        tracing::info!("selected folder {} ({})", folder.id, folder.title);
    }

    let scope = ExportScope::new(folders, sort_orders, target_types);

    let report = match (&config.output, config.json) {
        (Some(path), true) => {
            let mut sink = JsonFileSink::new(path);
            let report = run_export(&client, &scope, &options, &mut sink)?;
            eprintln!("Wrote progress file {} ({} writes)", sink.path().display(), sink.writes());
            report
        }
        _ => {
            let out = open_text_output(config.output.as_deref())?;
            let mut sink = TextSink::new(out, WordCache::new(&client));
            let report = run_export(&client, &scope, &options, &mut sink)?;
            if let Some(path) = &config.output {
                eprintln!("Wrote {}", path.display());
            }
            eprintln!("Rendered {} of {} items", sink.rendered(), report.unique_items());
            report
        }
    };

    print_summary(&report, start_time.elapsed().as_secs_f64());
    Ok(())
}

fn validate(config: &Config) -> Result<()> {
    if config.json && config.output.is_none() {
        anyhow::bail!("--json requires --output");
    }
    if config.page_size == 0 {
        anyhow::bail!("Page size must be at least 1");
    }
    if config.start_page == 0 {
        anyhow::bail!("Pages are numbered from 1");
    }
    Ok(())
}

/// Text goes to `path`, prefixed with a UTF-8 BOM, or to stdout.
fn open_text_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    let Some(path) = path else {
        return Ok(Box::new(io::stdout()));
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed creating directory: {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("Failed writing output: {}", path.display()))?;
    let mut out = BufWriter::new(file);
    out.write_all(UTF8_BOM.as_bytes())
        .with_context(|| format!("Failed writing output: {}", path.display()))?;
    Ok(Box::new(out))
}

fn print_summary(report: &ExportReport, elapsed_secs: f64) {
    let meta = &report.metadata;
    eprintln!(
        "Unique items: {} from {} folder views in {:.1}s",
        report.unique_items(),
        meta.partitions.len(),
        elapsed_secs
    );
    if let Some(expected) = meta.expected {
        let state = if meta.stopped { "reached" } else { "not reached" };
        eprintln!("Expected count {expected}: {state}");
    }
    if !report.is_complete() {
        eprintln!("Failed folder views ({}):", meta.failed_partitions.len());
        for failed in &meta.failed_partitions {
            eprintln!(
                "  folder {} ({}) sortType {} page {}: {}",
                failed.folder_id, failed.folder_title, failed.sort_type, failed.page_index, failed.error
            );
        }
    }
}
