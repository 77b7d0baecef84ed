use super::{StorageEntry, StorageProvider};
use crate::file_utils::{self, PathExt};
use log::debug;
use std::fs;
use std::io;
use std::path::Path;

/// Storage provider backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

impl StorageProvider for LocalStorage {
    fn list_children(&self, container: &Path) -> io::Result<Vec<StorageEntry>> {
        let entries = fs::read_dir(container)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                // Entries whose type cannot be read are skipped.
                let file_type = entry.file_type().ok()?;
                let path = entry.path();
                if file_type.is_dir() {
                    Some(StorageEntry::container(path))
                } else {
                    let content_type = file_utils::content_type_for(&path);
                    Some(StorageEntry::file(path, content_type))
                }
            })
            .collect();
        Ok(entries)
    }

    fn delete(&self, handle: &Path) -> io::Result<()> {
        debug!("Deleting {}", handle.format_for_log());
        fs::remove_file(handle)
    }
}
