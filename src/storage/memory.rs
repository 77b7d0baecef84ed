//! In-memory provider for tests: a fixed tree with injectable failures.

use super::{StorageEntry, StorageProvider};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryStorage {
    children: Mutex<HashMap<PathBuf, Vec<StorageEntry>>>,
    failing: Mutex<HashSet<PathBuf>>,
    deleted: Mutex<Vec<PathBuf>>,
    undeletable: Mutex<HashSet<PathBuf>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `path` as a container holding the given `image/jpeg` files.
    pub fn add_dir(&self, path: &str, images: &[&str]) -> &Self {
        let path = PathBuf::from(path);
        let entries = images
            .iter()
            .map(|name| StorageEntry::file(path.join(name), "image/jpeg"))
            .collect::<Vec<_>>();
        self.children
            .lock()
            .unwrap()
            .entry(path)
            .or_default()
            .extend(entries);
        self
    }

    pub fn add_entry(&self, parent: &str, entry: StorageEntry) -> &Self {
        self.children
            .lock()
            .unwrap()
            .entry(PathBuf::from(parent))
            .or_default()
            .push(entry);
        self
    }

    /// Makes listing `path` fail with permission denied.
    pub fn fail_listing(&self, path: &str) -> &Self {
        self.failing.lock().unwrap().insert(PathBuf::from(path));
        self
    }

    pub fn fail_delete(&self, path: &str) -> &Self {
        self.undeletable.lock().unwrap().insert(PathBuf::from(path));
        self
    }

    pub fn deleted(&self) -> Vec<PathBuf> {
        self.deleted.lock().unwrap().clone()
    }
}

impl StorageProvider for MemoryStorage {
    fn list_children(&self, container: &Path) -> io::Result<Vec<StorageEntry>> {
        if self.failing.lock().unwrap().contains(container) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "revoked"));
        }
        self.children
            .lock()
            .unwrap()
            .get(container)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such container"))
    }

    fn delete(&self, handle: &Path) -> io::Result<()> {
        if self.undeletable.lock().unwrap().contains(handle) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        }
        self.deleted.lock().unwrap().push(handle.to_path_buf());
        Ok(())
    }
}
