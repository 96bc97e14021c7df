//! Choosing which folders to export from the folders an account lists.

use crate::domain::Folder;
use crate::error::ExportError;

/// Title keywords of folders that usually hold saved example sentences.
const SENTENCE_FOLDER_KEYWORDS: &[&str] = &["例文", "例句", "例", "sentence", "sentences"];

pub const ROOT_FOLDER_TITLE: &str = "(root)";

/// How the user asked for folders to be chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderSelection {
    /// These folder ids, each of which must be listed by the account.
    Explicit(Vec<String>),
    /// Every listed folder, plus the root folder itself.
    All,
    /// The most likely sentence folder.
    Auto,
}

/// Resolve a selection against the listed folders. Order follows the selection (explicit)
/// or the listing (all), with the root first when it is added.
pub fn select_folders(
    listed: &[Folder],
    selection: &FolderSelection,
    root_folder_id: Option<&str>,
) -> Result<Vec<Folder>, ExportError> {
    let root = root_folder_id.map(str::trim).filter(|id| !id.is_empty());

    match selection {
        FolderSelection::Explicit(ids) => {
            let mut chosen: Vec<Folder> = Vec::with_capacity(ids.len());
            for id in ids {
                let found = listed
                    .iter()
                    .find(|f| f.id == *id)
                    .cloned()
                    .or_else(|| (root == Some(id.as_str())).then(|| Folder::new(id, ROOT_FOLDER_TITLE)))
                    .ok_or_else(|| ExportError::config(format!("Folder id not found in folder listing: {id}")))?;
                if !chosen.iter().any(|f| f.id == found.id) {
                    chosen.push(found);
                }
            }
            if chosen.is_empty() {
                return Err(ExportError::config("No folder ids given"));
            }
            Ok(chosen)
        }
        FolderSelection::All => {
            let mut chosen: Vec<Folder> = listed.iter().filter(|f| !f.id.is_empty()).cloned().collect();
            if let Some(root_id) = root {
                if !chosen.iter().any(|f| f.id == root_id) {
                    chosen.insert(0, Folder::new(root_id, ROOT_FOLDER_TITLE));
                }
            }
            if chosen.is_empty() {
                return Err(ExportError::config("No folders returned for this account"));
            }
            Ok(chosen)
        }
        FolderSelection::Auto => {
            if let Some(folder) = pick_sentence_folder(listed) {
                return Ok(vec![folder.clone()]);
            }
            match root {
                Some(root_id) => Ok(vec![Folder::new(root_id, ROOT_FOLDER_TITLE)]),
                None => Err(ExportError::config("No folders returned for this account")),
            }
        }
    }
}

/// First folder whose title mentions sentences, else the first folder.
pub fn pick_sentence_folder(folders: &[Folder]) -> Option<&Folder> {
    let usable: Vec<&Folder> = folders.iter().filter(|f| !f.id.is_empty()).collect();
    SENTENCE_FOLDER_KEYWORDS
        .iter()
        .find_map(|kw| {
            let kw = kw.to_lowercase();
            usable.iter().find(|f| f.title.to_lowercase().contains(&kw)).copied()
        })
        .or_else(|| usable.first().copied())
}
