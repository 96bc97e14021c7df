//! Error taxonomy for the export core and the remote client.

use thiserror::Error;

/// Errors surfaced by scope resolution, the remote client and the reconciliation engine.
///
/// Only [`ExportError::Configuration`] and [`ExportError::Auth`] abort a run. A
/// [`ExportError::Transport`] failure is contained to the partition it happened in.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("transport error{}: {reason}", status_suffix(.status))]
    Transport { status: Option<u16>, reason: String },
    #[error("credentials rejected: {0}")]
    Auth(String),
}

impl ExportError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport { status: None, reason: reason.into() }
    }

    pub fn http(status: u16, reason: impl Into<String>) -> Self {
        Self::Transport { status: Some(status), reason: reason.into() }
    }

    /// Whether this error must abort the whole run rather than a single partition.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Auth(_))
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}
