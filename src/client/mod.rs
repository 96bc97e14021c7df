//! Remote collection client boundary.
//!
//! The core only ever sees the canonical [`Page`] shape; the response variance of the
//! remote service is absorbed by [`response`].

use crate::domain::{Folder, Partition, RawItem};
use crate::error::ExportError;
use serde::{Deserialize, Serialize};

pub mod http;
pub mod response;

pub use http::MojiClient;

/// One page of a partition as returned by the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<RawItem>,
    /// The server's `totalPage`, if it sent one. `Some(0)` is common and meaningless.
    pub reported_page_count: Option<u32>,
}

/// Fetches single pages of a partition. Implementations hold no walk state.
pub trait CollectionClient {
    fn fetch_page(
        &self,
        partition: &Partition,
        page_index: u32,
        page_size: u32,
    ) -> Result<Page, ExportError>;
}

impl<C: CollectionClient + ?Sized> CollectionClient for &C {
    fn fetch_page(
        &self,
        partition: &Partition,
        page_index: u32,
        page_size: u32,
    ) -> Result<Page, ExportError> {
        (**self).fetch_page(partition, page_index, page_size)
    }
}

/// Dictionary details of a word entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDetail {
    pub spell: String,
    pub pron: String,
    pub accent: String,
    pub excerpt: String,
}

/// Resolves word ids to their dictionary details.
pub trait WordLookup {
    fn word_detail(&self, word_id: &str) -> Result<Option<WordDetail>, ExportError>;
}

/// A folder that holds a given item, as reported by the targets endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemTarget {
    pub parent_folder_id: String,
    pub raw: serde_json::Value,
}

/// Session credentials. Never read from config files.
#[derive(Clone)]
pub struct Credentials {
    pub session_token: String,
    pub installation_id: Option<String>,
    pub device_id: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("session_token", &"<redacted>")
            .field("installation_id", &self.installation_id)
            .field("device_id", &self.device_id)
            .finish()
    }
}

/// Folder listings are only needed by the CLI to build a scope.
pub trait FolderDirectory {
    fn list_folders(&self, root_folder_id: Option<&str>) -> Result<Vec<Folder>, ExportError>;
}
