//! Shared CLI utilities.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::client::{Credentials, MojiClient};
use crate::config::{load_config, merge_cli_with_config, CliOverrides};
use crate::domain::{Config, ExportMode};

/// Account and connection flags shared by every networked command.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Session token of a logged-in MOJi web session
    #[arg(long, env = "MOJI_SESSION_TOKEN", value_name = "TOKEN", hide_env_values = true)]
    pub session_token: Option<String>,

    /// Parse installation id sent with cloud function calls
    #[arg(long, env = "MOJI_INSTALLATION_ID", value_name = "ID")]
    pub installation_id: Option<String>,

    /// Device id sent with REST calls
    #[arg(long, env = "MOJI_DEVICE_ID", value_name = "ID")]
    pub device_id: Option<String>,

    /// Client version reported to the Parse server
    #[arg(long, value_name = "VERSION")]
    pub client_version: Option<String>,

    /// Path to config file (moji-export.toml or .moji-export.yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ConnectionArgs {
    /// Load the config file from `--config` or the current directory and apply
    /// `overrides` on top of it.
    pub fn load_config(&self, mut overrides: CliOverrides) -> Result<Config> {
        let cwd = std::env::current_dir().context("Failed reading current directory")?;
        let file_config = load_config(&cwd, self.config.as_deref())?;
        if overrides.client_version.is_none() {
            overrides.client_version = self.client_version.clone();
        }
        Ok(merge_cli_with_config(file_config, overrides))
    }

    pub fn credentials(&self) -> Result<Credentials> {
        let session_token = non_empty(&self.session_token).ok_or_else(|| {
            anyhow::anyhow!("Missing session token: pass --session-token or set MOJI_SESSION_TOKEN")
        })?;
        Ok(Credentials {
            session_token,
            installation_id: non_empty(&self.installation_id),
            device_id: non_empty(&self.device_id),
        })
    }

    pub fn connect(&self, config: &Config) -> Result<MojiClient> {
        Ok(MojiClient::new(self.credentials()?, config.client.clone()))
    }
}

/// Older setups name the root folder `MOJI_PFID`.
const LEGACY_ROOT_FOLDER_ENV: &str = "MOJI_PFID";

/// `--root-folder-id` (or `MOJI_ROOT_FOLDER_ID`), falling back to `MOJI_PFID`.
pub fn root_folder_id(flag: Option<&str>) -> Option<String> {
    pick_root_folder(flag, std::env::var(LEGACY_ROOT_FOLDER_ENV).ok().as_deref())
}

fn pick_root_folder(flag: Option<&str>, legacy: Option<&str>) -> Option<String> {
    [flag, legacy]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|id| !id.is_empty())
        .map(str::to_string)
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Flatten repeatable, possibly comma-separated values, dropping duplicates.
pub fn parse_csv_multi(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if !out.iter().any(|existing| existing == part) {
                out.push(part.to_string());
            }
        }
    }
    out
}

pub fn parse_mode(value: &str) -> Result<ExportMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "sentences" | "sentence" => Ok(ExportMode::Sentences),
        "words" | "word" => Ok(ExportMode::Words),
        "both" | "all" => Ok(ExportMode::Both),
        other => anyhow::bail!("Unknown mode '{}': expected sentences, words or both", other),
    }
}
