//! Progress persistence.
//!
//! The engine hands a sink the full run state after every completed page. How (or
//! whether) it is stored is up to the sink.

use crate::domain::RunMetadata;
use crate::index::DedupSnapshot;
use anyhow::Result;

pub mod json_file;
pub mod text;

pub use json_file::{JsonFileSink, ProgressArtifact};
pub use text::TextSink;

pub trait ProgressSink {
    /// Persist the state after a completed page. Each call replaces the previous state.
    fn record(&mut self, metadata: &RunMetadata, snapshot: &DedupSnapshot) -> Result<()>;
}

impl<F> ProgressSink for F
where
    F: FnMut(&RunMetadata, &DedupSnapshot),
{
    fn record(&mut self, metadata: &RunMetadata, snapshot: &DedupSnapshot) -> Result<()> {
        self(metadata, snapshot);
        Ok(())
    }
}

/// Discards progress; used when only the final result matters.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn record(&mut self, _metadata: &RunMetadata, _snapshot: &DedupSnapshot) -> Result<()> {
        Ok(())
    }
}
