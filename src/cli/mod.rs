//! Command-line interface for moji-export
//!
//! Provides `export`, `preview`, `folders`, `targets` and `inspect` subcommands.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod export;
mod folders;
mod inspect;
mod preview;
mod targets;
mod utils;

/// Export saved words and example sentences from a MOJi dictionary account
#[derive(Parser)]
#[command(name = "moji-export")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk every folder view and export the union of saved items
    Export(Box<export::ExportArgs>),

    /// Print the first items of a single page, with per-type counts
    Preview(Box<preview::PreviewArgs>),

    /// List the folders of the account
    Folders(folders::FoldersArgs),

    /// Show which folders contain an item
    Targets(targets::TargetsArgs),

    /// Summarize a JSON progress file without network access
    Inspect(inspect::InspectArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Export(args) => export::run(*args),
        Commands::Preview(args) => preview::run(*args),
        Commands::Folders(args) => folders::run(args),
        Commands::Targets(args) => targets::run(args),
        Commands::Inspect(args) => inspect::run(args),
    }
}
