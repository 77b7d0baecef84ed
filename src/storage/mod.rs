//! Storage provider abstraction over the hierarchical namespace holding images.

use std::io;
use std::path::{Path, PathBuf};

mod local;
#[cfg(test)]
pub mod memory;

pub use local::LocalStorage;

/// One child of a container as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    pub handle: PathBuf,
    pub content_type: String,
    pub is_container: bool,
}

impl StorageEntry {
    pub fn container(handle: impl Into<PathBuf>) -> Self {
        Self {
            handle: handle.into(),
            content_type: String::new(),
            is_container: true,
        }
    }

    pub fn file(handle: impl Into<PathBuf>, content_type: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            content_type: content_type.into(),
            is_container: false,
        }
    }
}

/// Listing and deletion over the host storage.
///
/// Both calls are blocking I/O; callers keep them off the UI thread.
pub trait StorageProvider: Send + Sync {
    fn list_children(&self, container: &Path) -> io::Result<Vec<StorageEntry>>;

    fn delete(&self, handle: &Path) -> io::Result<()>;
}
