//! Service for linking and unlinking folder roots.

use crate::error::{AppError, Result};
use crate::media::FolderRoot;
use crate::persistence::FolderStore;
use crate::services::{AutoRescanService, ScanService};
use crate::state::AppState;
use log::{info, warn};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Service for managing the registered folder roots.
#[derive(Clone)]
pub struct FolderService {
    state: AppState,
    store: Arc<dyn FolderStore>,
    scans: ScanService,
    watches: AutoRescanService,
}

impl FolderService {
    pub fn new(state: AppState, store: Arc<dyn FolderStore>, scans: ScanService) -> Self {
        let watches = AutoRescanService::new(scans.clone(), state.clone());
        Self {
            state,
            store,
            scans,
            watches,
        }
    }

    /// Watch over the registered roots. Kept in step by add and remove.
    pub fn watches(&self) -> &AutoRescanService {
        &self.watches
    }

    /// Loads persisted roots into the state. On failure the folder list stays
    /// empty and the error is returned for display.
    pub fn load(&self) -> Result<usize> {
        let roots = match self.store.load_folder_roots() {
            Ok(roots) => roots,
            Err(e) => {
                warn!("Could not load saved folders: {}", e);
                return Err(e);
            }
        };
        let count = roots.len();
        let mut folders = self
            .state
            .folders
            .lock()
            .map_err(|_| AppError::StateUnavailable)?;
        *folders = roots;
        drop(folders);

        self.watches.sync();
        Ok(count)
    }

    pub fn folders(&self) -> Vec<FolderRoot> {
        self.state
            .folders
            .lock()
            .map(|folders| folders.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Registers a root, persists the set and rescans. A live watch picks the
    /// root up. Returns false if the root was already registered.
    pub fn add_folder(&self, root: FolderRoot) -> Result<bool> {
        info!("Linking folder {}", root.path().display());
        self.update(|folders| folders.insert(root))
    }

    /// Unlinks a root, persists the set and rescans. A live watch lets go of
    /// the root. Returns false if the root was not registered.
    pub fn remove_folder(&self, root: &FolderRoot) -> Result<bool> {
        info!("Unlinking folder {}", root.path().display());
        self.update(|folders| folders.remove(root))
    }

    fn update<F>(&self, change: F) -> Result<bool>
    where
        F: FnOnce(&mut BTreeSet<FolderRoot>) -> bool,
    {
        let snapshot = {
            let mut folders = self
                .state
                .folders
                .lock()
                .map_err(|_| AppError::StateUnavailable)?;
            if !change(&mut folders) {
                return Ok(false);
            }
            folders.clone()
        };

        // The new set applies even if saving fails.
        self.scans.request_scan();
        self.watches.sync();
        self.store.save_folder_roots(&snapshot)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::JsonFolderStore;
    use crate::scanner::TreeScanner;
    use crate::storage::memory::MemoryStorage;
    use crate::storage::LocalStorage;
    use std::sync::mpsc;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn add_and_remove_persist_and_rescan() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let storage = MemoryStorage::new();
        storage.add_dir("/A", &["a1.jpg", "a2.jpg"]);
        let state = AppState::default();
        let (tx, rx) = mpsc::channel();
        let scans = ScanService::with_callback(
            TreeScanner::new(Arc::new(storage)),
            state.clone(),
            move |summary| {
                let _ = tx.send(summary.image_count);
            },
        );
        let store = Arc::new(JsonFolderStore::new(temp_dir.path()));
        let service = FolderService::new(state.clone(), store.clone(), scans);

        assert!(service.add_folder(FolderRoot::new("/A")).expect("add failed"));
        assert!(!service.add_folder(FolderRoot::new("/A")).expect("add failed"));
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(2));
        assert_eq!(store.load_folder_roots().expect("load failed").len(), 1);

        assert!(service.remove_folder(&FolderRoot::new("/A")).expect("remove failed"));
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(0));
        assert!(store.load_folder_roots().expect("load failed").is_empty());
        assert!(service.folders().is_empty());
    }

    #[test]
    fn load_restores_saved_roots() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let store = Arc::new(JsonFolderStore::new(temp_dir.path()));
        store
            .save_folder_roots(&[FolderRoot::new("/x"), FolderRoot::new("/y")].into())
            .expect("save failed");
        let state = AppState::default();
        let scans = ScanService::new(TreeScanner::new(Arc::new(MemoryStorage::new())), state.clone());
        let service = FolderService::new(state, store, scans);

        assert_eq!(service.load().expect("load failed"), 2);
        assert_eq!(
            service.folders(),
            vec![FolderRoot::new("/x"), FolderRoot::new("/y")]
        );
    }

    #[test]
    fn linking_while_watching_extends_the_watch() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let early = FolderRoot::new(temp_dir.path().join("early"));
        let late = FolderRoot::new(temp_dir.path().join("late"));
        std::fs::create_dir_all(early.path()).expect("mkdir");
        std::fs::create_dir_all(late.path()).expect("mkdir");

        let state = AppState::default();
        let scans = ScanService::new(TreeScanner::new(Arc::new(LocalStorage::new())), state.clone());
        let store = Arc::new(JsonFolderStore::new(&temp_dir.path().join("data")));
        let service = FolderService::new(state, store, scans);

        service.add_folder(early.clone()).expect("add failed");
        service.watches().start_watching().expect("watch failed");
        service.add_folder(late.clone()).expect("add failed");
        assert_eq!(
            service.watches().watched_roots(),
            vec![early.clone(), late.clone()]
        );

        service.remove_folder(&early).expect("remove failed");
        assert_eq!(service.watches().watched_roots(), vec![late]);
        service.watches().stop_watching();
    }
}
