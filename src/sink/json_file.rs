//! JSON progress file, rewritten in full after every page.

use super::ProgressSink;
use crate::domain::RunMetadata;
use crate::index::DedupSnapshot;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// The persisted artifact: run metadata plus every unique item keyed `"<type>:<id>"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressArtifact {
    pub meta: RunMetadata,
    pub items_by_id: Map<String, Value>,
}

impl ProgressArtifact {
    pub fn from_state(metadata: &RunMetadata, snapshot: &DedupSnapshot) -> Self {
        Self { meta: metadata.clone(), items_by_id: snapshot.items_by_id() }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed reading progress file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid progress file: {}", path.display()))
    }
}

/// Writes the artifact to `<path>.tmp` and renames it over `path`.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
    writes: usize,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), writes: 0 }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ProgressSink for JsonFileSink {
    fn record(&mut self, metadata: &RunMetadata, snapshot: &DedupSnapshot) -> Result<()> {
        let artifact = ProgressArtifact::from_state(metadata, snapshot);
        let mut content = serde_json::to_string_pretty(&artifact)?;
        content.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed creating directory: {}", parent.display()))?;
        }
        let tmp = self.temp_path();
        fs::write(&tmp, content)
            .with_context(|| format!("Failed writing progress file: {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed replacing progress file: {}", self.path.display()))?;
        self.writes += 1;
        Ok(())
    }
}
