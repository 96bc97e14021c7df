//! Apply command-line overrides on top of file configuration.

use crate::domain::{Config, ExportMode, TargetType};
use std::path::PathBuf;

/// Values given on the command line. `None` (or an empty list) keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub root_folder_id: Option<String>,
    pub folder_ids: Vec<String>,
    pub all_folders: Option<bool>,
    pub mode: Option<ExportMode>,
    pub target_types: Option<Vec<TargetType>>,
    pub sort_types: Option<String>,
    pub start_page: Option<u32>,
    pub page_size: Option<u32>,
    pub max_pages: Option<u32>,
    pub stop_after_no_new: Option<u32>,
    pub expected: Option<usize>,
    pub output: Option<PathBuf>,
    pub json: Option<bool>,
    pub client_version: Option<String>,
}

pub fn merge_cli_with_config(mut config: Config, cli: CliOverrides) -> Config {
    if let Some(root) = cli.root_folder_id {
        config.root_folder_id = Some(root);
    }
    if !cli.folder_ids.is_empty() {
        config.folder_ids = cli.folder_ids.clone();
    }
    if let Some(all) = cli.all_folders {
        config.all_folders = all;
        // Explicit ids take precedence when selecting, so drop the file's list
        if all && cli.folder_ids.is_empty() {
            config.folder_ids.clear();
        }
    }
    if let Some(mode) = cli.mode {
        config.mode = mode;
        // A mode on the command line beats a type list from the file
        if cli.target_types.is_none() {
            config.target_types.clear();
        }
    }
    if let Some(types) = cli.target_types {
        config.target_types = types;
    }
    if let Some(sort_types) = cli.sort_types {
        config.sort_types = sort_types;
    }
    if let Some(page) = cli.start_page {
        config.start_page = page;
    }
    if let Some(count) = cli.page_size {
        config.page_size = count;
    }
    if let Some(max_pages) = cli.max_pages {
        config.max_pages = max_pages;
    }
    if let Some(streak) = cli.stop_after_no_new {
        config.stop_after_no_new = streak;
    }
    if let Some(expected) = cli.expected {
        config.expected = expected;
    }
    if let Some(output) = cli.output {
        config.output = Some(output);
    }
    if let Some(json) = cli.json {
        config.json = json;
    }
    if let Some(version) = cli.client_version {
        config.client.client_version = version;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_overrides_keep_file_values() {
        let file = Config { sort_types: "0..5".into(), max_pages: 10, ..Config::default() };
        let merged = merge_cli_with_config(file.clone(), CliOverrides::default());
        assert_eq!(merged, file);
    }

    #[test]
    fn cli_values_win() {
        let file = Config {
            folder_ids: vec!["from-file".into()],
            expected: 100,
            page_size: 50,
            ..Config::default()
        };
        let cli = CliOverrides {
            folder_ids: vec!["a".into(), "b".into()],
            expected: Some(7),
            json: Some(true),
            client_version: Some("js9.9.9".into()),
            ..CliOverrides::default()
        };
        let merged = merge_cli_with_config(file, cli);
        assert_eq!(merged.folder_ids, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(merged.expected, 7);
        assert_eq!(merged.page_size, 50);
        assert!(merged.json);
        assert_eq!(merged.client.client_version, "js9.9.9");
    }

    #[test]
    fn cli_mode_clears_file_type_list() {
        let file = Config { target_types: vec![TargetType(10)], ..Config::default() };
        let cli = CliOverrides { mode: Some(ExportMode::Words), ..CliOverrides::default() };
        let merged = merge_cli_with_config(file, cli);
        assert!(merged.target_types.is_empty());
        assert_eq!(merged.effective_target_types().len(), 1);
        assert!(merged.effective_target_types().contains(&TargetType::WORD));
    }

    #[test]
    fn cli_all_folders_clears_file_folder_ids() {
        let file = Config { folder_ids: vec!["from-file".into()], ..Config::default() };
        let cli = CliOverrides { all_folders: Some(true), ..CliOverrides::default() };
        let merged = merge_cli_with_config(file, cli);
        assert!(merged.all_folders);
        assert!(merged.folder_ids.is_empty());
    }
}
