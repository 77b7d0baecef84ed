//! Recursive discovery of images under folder roots.

use crate::error::AppError;
use crate::file_utils::{self, PathExt};
use crate::media::{FolderRoot, ImageRef};
use crate::storage::StorageProvider;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A container whose listing failed; its subtree contributed nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanFailure {
    pub container: PathBuf,
    pub error: AppError,
}

/// Images found by one traversal plus the containers that could not be read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    pub images: Vec<ImageRef>,
    pub failures: Vec<ScanFailure>,
}

impl ScanReport {
    fn merge(&mut self, other: ScanReport) {
        self.images.extend(other.images);
        self.failures.extend(other.failures);
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Depth-first walker over a [`StorageProvider`].
#[derive(Clone)]
pub struct TreeScanner {
    provider: Arc<dyn StorageProvider>,
}

impl TreeScanner {
    pub fn new(provider: Arc<dyn StorageProvider>) -> Self {
        Self { provider }
    }

    /// Scans every root. Never fails: unreadable subtrees end up in
    /// [`ScanReport::failures`] and the walk carries on.
    pub fn scan(&self, roots: &[FolderRoot]) -> ScanReport {
        let start = std::time::Instant::now();
        let mut report = ScanReport::default();

        for root in roots {
            let root_report = self.scan_container(root.path());
            debug!(
                "Root {} yielded {} images ({} failures)",
                root.path().format_for_log(),
                root_report.images.len(),
                root_report.failures.len()
            );
            report.merge(root_report);
        }

        debug!(
            "Scanned {} roots: {} images in {:?}",
            roots.len(),
            report.images.len(),
            start.elapsed()
        );
        report
    }

    fn scan_container(&self, container: &Path) -> ScanReport {
        let mut report = ScanReport::default();

        let children = match self.provider.list_children(container) {
            Ok(children) => children,
            Err(e) => {
                warn!("Skipping {}: {}", container.display(), e);
                report.failures.push(ScanFailure {
                    container: container.to_path_buf(),
                    error: AppError::from(e),
                });
                return report;
            }
        };

        for child in children {
            if child.is_container {
                report.merge(self.scan_container(&child.handle));
            } else if file_utils::is_image_content_type(&child.content_type) {
                report.images.push(ImageRef::new(child.handle));
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;
    use crate::storage::{LocalStorage, StorageEntry};
    use std::collections::HashSet;
    use std::fs;
    use tempfile::tempdir;

    fn scanner(storage: MemoryStorage) -> TreeScanner {
        TreeScanner::new(Arc::new(storage))
    }

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn names(report: &ScanReport) -> HashSet<String> {
        report.images.iter().map(|i| i.display_name()).collect()
    }

    #[test]
    fn scans_two_roots_into_one_result() {
        let storage = MemoryStorage::new();
        storage.add_dir("/A", &["a1.jpg", "a2.jpg"]);
        storage.add_dir("/B", &["b1.jpg"]);

        let report = scanner(storage).scan(&[FolderRoot::new("/A"), FolderRoot::new("/B")]);

        assert_eq!(report.images.len(), 3);
        assert_eq!(
            names(&report),
            set(&["a1.jpg", "a2.jpg", "b1.jpg"])
        );
        assert!(report.is_complete());
    }

    #[test]
    fn recurses_into_containers_and_skips_non_images() {
        let storage = MemoryStorage::new();
        storage.add_dir("/A", &["top.jpg"]);
        storage.add_entry("/A", StorageEntry::container("/A/nested"));
        storage.add_entry("/A", StorageEntry::file("/A/readme.txt", "text/plain"));
        storage.add_dir("/A/nested", &["deep.jpg"]);
        storage.add_entry("/A/nested", StorageEntry::container("/A/nested/empty"));
        storage.add_dir("/A/nested/empty", &[]);

        let report = scanner(storage).scan(&[FolderRoot::new("/A")]);

        assert_eq!(
            names(&report),
            set(&["top.jpg", "deep.jpg"])
        );
        assert!(report.images.iter().all(|i| !i.path().ends_with("nested")));
        assert!(report.images.iter().all(|i| !i.path().ends_with("empty")));
    }

    #[test]
    fn failing_root_does_not_abort_other_roots() {
        let storage = MemoryStorage::new();
        storage.add_dir("/A", &["a1.jpg"]);
        storage.fail_listing("/revoked");

        let report = scanner(storage).scan(&[
            FolderRoot::new("/revoked"),
            FolderRoot::new("/A"),
            FolderRoot::new("/missing"),
        ]);

        assert_eq!(names(&report), set(&["a1.jpg"]));
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].container, PathBuf::from("/revoked"));
    }

    #[test]
    fn failing_subtree_keeps_siblings() {
        let storage = MemoryStorage::new();
        storage.add_dir("/A", &["a1.jpg"]);
        storage.add_entry("/A", StorageEntry::container("/A/locked"));
        storage.add_entry("/A", StorageEntry::container("/A/open"));
        storage.add_dir("/A/open", &["o.jpg"]);
        storage.fail_listing("/A/locked");

        let report = scanner(storage).scan(&[FolderRoot::new("/A")]);

        assert_eq!(names(&report), set(&["a1.jpg", "o.jpg"]));
        assert_eq!(report.failures.len(), 1);
    }

    #[test]
    fn all_roots_invalid_yields_empty_result() {
        let report = scanner(MemoryStorage::new()).scan(&[FolderRoot::new("/x"), FolderRoot::new("/y")]);
        assert!(report.images.is_empty());
        assert_eq!(report.failures.len(), 2);
    }

    #[test]
    fn overlapping_roots_keep_duplicates() {
        let storage = MemoryStorage::new();
        storage.add_dir("/A", &["a1.jpg"]);
        storage.add_entry("/A", StorageEntry::container("/A/sub"));
        storage.add_dir("/A/sub", &["s.jpg"]);

        let report = scanner(storage).scan(&[FolderRoot::new("/A"), FolderRoot::new("/A/sub")]);

        let duplicates = report
            .images
            .iter()
            .filter(|i| i.display_name() == "s.jpg")
            .count();
        assert_eq!(duplicates, 2);
    }

    #[test]
    fn scans_local_directory_tree() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let nested = temp_dir.path().join("trip").join("day1");
        fs::create_dir_all(&nested).expect("mkdir");
        fs::write(temp_dir.path().join("cover.png"), b"fake").expect("write");
        fs::write(nested.join("beach.JPG"), b"fake").expect("write");
        fs::write(nested.join("log.txt"), b"text").expect("write");

        let report = TreeScanner::new(Arc::new(LocalStorage::new()))
            .scan(&[FolderRoot::new(temp_dir.path())]);

        assert_eq!(
            names(&report),
            set(&["cover.png", "beach.JPG"])
        );
    }
}
