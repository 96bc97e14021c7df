//! Integration tests for CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn moji_export(cwd: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("moji-export"));
    cmd.current_dir(cwd.path())
        .env_remove("MOJI_SESSION_TOKEN")
        .env_remove("MOJI_INSTALLATION_ID")
        .env_remove("MOJI_DEVICE_ID")
        .env_remove("MOJI_ROOT_FOLDER_ID")
        .env_remove("MOJI_PFID")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("moji-export"));
    cmd.arg("--version");
    cmd.assert().success().stdout(predicate::str::contains("moji-export"));
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("moji-export"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Export saved words and example sentences"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("preview"))
        .stdout(predicate::str::contains("folders"))
        .stdout(predicate::str::contains("targets"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn test_export_help_lists_scope_flags() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("moji-export"));
    cmd.args(["export", "--help"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--folder-id"))
        .stdout(predicate::str::contains("--sort-types"))
        .stdout(predicate::str::contains("--expected"))
        .stdout(predicate::str::contains("--stop-after-no-new"));
}

#[test]
fn test_export_requires_session_token() {
    let tmp = TempDir::new().expect("tmp");
    let mut cmd = moji_export(&tmp);
    cmd.arg("export");
    cmd.assert().failure().stderr(predicate::str::contains("Missing session token"));
}

#[test]
fn test_export_rejects_reversed_sort_range_before_connecting() {
    let tmp = TempDir::new().expect("tmp");
    let mut cmd = moji_export(&tmp);
    cmd.args(["export", "--session-token", "r:test", "--sort-types", "5..1"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("start 5 is greater than end 1"));
}

#[test]
fn test_export_rejects_unknown_mode() {
    let tmp = TempDir::new().expect("tmp");
    let mut cmd = moji_export(&tmp);
    cmd.args(["export", "--session-token", "r:test", "--mode", "phrases"]);
    cmd.assert().failure().stderr(predicate::str::contains("Unknown mode 'phrases'"));
}

#[test]
fn test_export_json_requires_output() {
    let tmp = TempDir::new().expect("tmp");
    let mut cmd = moji_export(&tmp);
    cmd.args(["export", "--session-token", "r:test", "--json"]);
    cmd.assert().failure().stderr(predicate::str::contains("--output"));
}

#[test]
fn test_export_json_accepts_output_from_config() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("moji-export.toml"), "output = 'out.json'\n").expect("write config");
    let mut cmd = moji_export(&tmp);
    cmd.args(["export", "--session-token", "r:test", "--json", "--sort-types", "5..1"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("start 5 is greater than end 1"))
        .stderr(predicate::str::contains("--output").not());
}

#[test]
fn test_export_help_shows_root_folder_env() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("moji-export"));
    cmd.args(["export", "--help"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--root-folder-id"))
        .stdout(predicate::str::contains("MOJI_ROOT_FOLDER_ID"));
}

#[test]
fn test_preview_help_lists_limit() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("moji-export"));
    cmd.args(["preview", "--help"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--limit"))
        .stdout(predicate::str::contains("[default: 10]"))
        .stdout(predicate::str::contains("--sort-type"));
}

#[test]
fn test_preview_rejects_zero_page_before_connecting() {
    let tmp = TempDir::new().expect("tmp");
    let mut cmd = moji_export(&tmp);
    cmd.args(["preview", "--session-token", "r:test", "--page", "0"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Page and page size must be at least 1"));
}

#[test]
fn test_export_json_from_config_requires_output() {
    let tmp = TempDir::new().expect("tmp");
    fs::write(tmp.path().join("moji-export.toml"), "json = true\n").expect("write config");
    let mut cmd = moji_export(&tmp);
    cmd.args(["export", "--session-token", "r:test"]);
    cmd.assert().failure().stderr(predicate::str::contains("--json requires --output"));
}

#[test]
fn test_explicit_invalid_config_fails() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("custom.toml");
    fs::write(&path, "page_size = 'lots'\n").expect("write config");
    let mut cmd = moji_export(&tmp);
    cmd.args(["export", "--session-token", "r:test", "--config", path.to_str().expect("utf8 path")]);
    cmd.assert().failure().stderr(predicate::str::contains("Invalid TOML config"));
}

#[test]
fn test_inspect_summarizes_progress_file() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("progress.json");
    fs::write(
        &path,
        r#"{
  "meta": {
    "targetTypes": [103, 120],
    "expected": 10,
    "uniqueItems": 3,
    "last": {"folderId": "F1", "folderTitle": "例文", "sortType": 2, "pageIndex": 4},
    "partitions": [
      {"folderId": "F1", "sortType": 0, "lastPage": 3, "pagesWalked": 3, "newItems": 2, "ended": "repeated-page"},
      {"folderId": "F1", "sortType": 1, "lastPage": null, "pagesWalked": 0, "newItems": 0, "ended": "failed"},
      {"folderId": "F1", "sortType": 2, "lastPage": 4, "pagesWalked": 4, "newItems": 1, "ended": null}
    ],
    "failedPartitions": [
      {"folderId": "F1", "folderTitle": "例文", "sortType": 1, "pageIndex": 1, "error": "transport error (HTTP 502): bad gateway"}
    ],
    "stopped": false,
    "updatedAt": "2026-01-02T03:04:05Z"
  },
  "itemsById": {
    "120:s1": {"targetType": 120, "target": {"objectId": "s1"}},
    "120:s2": {"targetType": 120, "target": {"objectId": "s2"}},
    "103:e1": {"targetType": 103, "target": {"objectId": "e1"}}
  }
}
"#,
    )
    .expect("write fixture");

    let mut cmd = moji_export(&tmp);
    cmd.args(["inspect", path.to_str().expect("utf8 path")]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Unique items: 3"))
        .stdout(predicate::str::contains("targetType 120: 2"))
        .stdout(predicate::str::contains("targetType 103: 1"))
        .stdout(predicate::str::contains("Expected: 10 (stopped: false)"))
        .stdout(predicate::str::contains("Last position: folder F1 (例文) sortType 2 page 4"))
        .stdout(predicate::str::contains("Folder views walked: 3"))
        .stdout(predicate::str::contains("Failed folder views (1):"))
        .stdout(predicate::str::contains("HTTP 502"));
}

#[test]
fn test_inspect_rejects_malformed_file() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("broken.json");
    fs::write(&path, "{\"meta\": 1}").expect("write fixture");
    let mut cmd = moji_export(&tmp);
    cmd.args(["inspect", path.to_str().expect("utf8 path")]);
    cmd.assert().failure().stderr(predicate::str::contains("Invalid progress file"));
}
