//! Folder-root persistence in a small JSON file.

use crate::config::FOLDERS_FILE;
use crate::error::{AppError, Result};
use crate::media::FolderRoot;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Load/save of the registered folder roots.
pub trait FolderStore: Send + Sync {
    fn load_folder_roots(&self) -> Result<BTreeSet<FolderRoot>>;

    fn save_folder_roots(&self, roots: &BTreeSet<FolderRoot>) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedFolders {
    #[serde(default)]
    folder_uris: Vec<FolderRoot>,
}

/// Stores roots as `folders.json` inside a data directory.
pub struct JsonFolderStore {
    path: PathBuf,
}

impl JsonFolderStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(FOLDERS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FolderStore for JsonFolderStore {
    /// A missing file means no folders have been added yet.
    fn load_folder_roots(&self) -> Result<BTreeSet<FolderRoot>> {
        if !self.path.exists() {
            return Ok(BTreeSet::new());
        }

        let file = fs::File::open(&self.path).map_err(|e| AppError::Persistence(e.to_string()))?;
        let persisted: PersistedFolders = serde_json::from_reader(BufReader::new(file))?;
        debug!(
            "Loaded {} folder roots from {}",
            persisted.folder_uris.len(),
            self.path.display()
        );
        Ok(persisted.folder_uris.into_iter().collect())
    }

    fn save_folder_roots(&self, roots: &BTreeSet<FolderRoot>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| AppError::Persistence(e.to_string()))?;
        }

        let persisted = PersistedFolders {
            folder_uris: roots.iter().cloned().collect(),
        };
        let file =
            fs::File::create(&self.path).map_err(|e| AppError::Persistence(e.to_string()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &persisted)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_empty_set() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let store = JsonFolderStore::new(temp_dir.path());
        assert!(store.load_folder_roots().expect("load failed").is_empty());
    }

    #[test]
    fn saved_roots_load_back() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let store = JsonFolderStore::new(&temp_dir.path().join("nested").join("data"));
        let roots = BTreeSet::from([FolderRoot::new("/pics/a"), FolderRoot::new("/pics/b")]);

        store.save_folder_roots(&roots).expect("save failed");

        assert_eq!(store.load_folder_roots().expect("load failed"), roots);
    }

    #[test]
    fn corrupt_file_is_a_persistence_error() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let store = JsonFolderStore::new(temp_dir.path());
        fs::write(store.path(), b"{not json").expect("write");

        assert!(matches!(
            store.load_folder_roots(),
            Err(AppError::Persistence(_))
        ));
    }
}
