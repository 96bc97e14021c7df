//! Export configuration with defaults.

use super::item::TargetType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

pub const DEFAULT_PARSE_SERVER: &str = "https://api.mojidict.com/parse";
pub const DEFAULT_PARSE_APP_ID: &str = "E62VyFVLMiW7kvbtVq3p";
pub const DEFAULT_API_BASE: &str = "https://api.mojidict.com/app/mojidict";
pub const DEFAULT_CLIENT_VERSION: &str = "js3.4.4";
pub const DEFAULT_MOJI_APP_ID: &str = "com.mojitec.mojidict";
pub const DEFAULT_MOJI_APP_VERSION: &str = "4.15.4";

/// Which kinds of saved items to export when no explicit type list is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    #[default]
    Sentences,
    Words,
    Both,
}

impl ExportMode {
    pub fn target_types(self) -> BTreeSet<TargetType> {
        match self {
            ExportMode::Sentences => BTreeSet::from([TargetType::EXAMPLE, TargetType::SENTENCE]),
            ExportMode::Words => BTreeSet::from([TargetType::WORD]),
            ExportMode::Both => {
                BTreeSet::from([TargetType::WORD, TargetType::EXAMPLE, TargetType::SENTENCE])
            }
        }
    }
}

/// Connection settings for the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub parse_server: String,
    pub parse_app_id: String,
    pub api_base: String,
    pub client_version: String,
    pub app_id: String,
    pub app_version: String,
    pub timeout_secs: u64,
    /// Extra attempts after an HTTP 403 before giving up on a request.
    pub forbidden_retries: u32,
    /// Base delay before a 403 retry; attempt `n` waits `n` times this.
    pub forbidden_backoff_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            parse_server: DEFAULT_PARSE_SERVER.to_string(),
            parse_app_id: DEFAULT_PARSE_APP_ID.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            client_version: DEFAULT_CLIENT_VERSION.to_string(),
            app_id: DEFAULT_MOJI_APP_ID.to_string(),
            app_version: DEFAULT_MOJI_APP_VERSION.to_string(),
            timeout_secs: 30,
            forbidden_retries: 2,
            forbidden_backoff_ms: 750,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub root_folder_id: Option<String>,
    pub folder_ids: Vec<String>,
    pub all_folders: bool,
    pub mode: ExportMode,
    /// Explicit `targetType` allowlist; overrides `mode` when non-empty.
    pub target_types: Vec<TargetType>,
    /// Sort orders to walk: comma-separated values and inclusive ranges (`0..20`, `0-20`).
    pub sort_types: String,
    pub start_page: u32,
    pub page_size: u32,
    pub max_pages: u32,
    pub stop_after_no_new: u32,
    /// Stop once this many unique items have been collected (0 disables).
    pub expected: usize,
    pub output: Option<PathBuf>,
    pub json: bool,
    pub client: ClientConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_folder_id: None,
            folder_ids: Vec::new(),
            all_folders: false,
            mode: ExportMode::default(),
            target_types: Vec::new(),
            sort_types: "0".to_string(),
            start_page: 1,
            page_size: 20,
            max_pages: 200,
            stop_after_no_new: 3,
            expected: 0,
            output: None,
            json: false,
            client: ClientConfig::default(),
        }
    }
}

impl Config {
    /// The type filter every partition carries.
    pub fn effective_target_types(&self) -> BTreeSet<TargetType> {
        if self.target_types.is_empty() {
            self.mode.target_types()
        } else {
            self.target_types.iter().copied().collect()
        }
    }

    pub fn expected_count(&self) -> Option<usize> {
        (self.expected > 0).then_some(self.expected)
    }
}
