//! Wiring of state, storage and services into one handle for a host.

use crate::config::AppConfig;
use crate::error::Result;
use crate::favorites::{FavoritesStore, LocalFavorites};
use crate::persistence::{FolderStore, JsonFolderStore};
use crate::scanner::TreeScanner;
use crate::services::{FavoritesService, FolderService, PlaybackService, ScanService};
use crate::state::{AppState, SessionList, ViewSnapshot};
use crate::storage::{LocalStorage, StorageProvider};
use log::{info, warn};
use std::sync::Arc;

/// Everything a front end needs to drive a roulette session.
#[derive(Clone)]
pub struct RouletteApp {
    pub state: AppState,
    pub scans: ScanService,
    pub playback: PlaybackService,
    pub favorites: FavoritesService,
    pub folders: FolderService,
    config: AppConfig,
}

impl RouletteApp {
    /// Builds the app over the local file system.
    pub fn new(config: AppConfig) -> Self {
        let folder_store = Arc::new(JsonFolderStore::new(&config.data_dir));
        let favorites_store = Arc::new(LocalFavorites::new(config.favorites_dir.clone()));
        Self::with_collaborators(
            config,
            Arc::new(LocalStorage::new()),
            folder_store,
            favorites_store,
        )
    }

    pub fn with_collaborators(
        config: AppConfig,
        storage: Arc<dyn StorageProvider>,
        folder_store: Arc<dyn FolderStore>,
        favorites_store: Arc<dyn FavoritesStore>,
    ) -> Self {
        let state = AppState::with_session(SessionList::new(config.session.advance_policy));
        let scans = ScanService::new(TreeScanner::new(storage.clone()), state.clone());
        let playback =
            PlaybackService::new(state.clone(), storage.clone(), config.session.undo_window());
        let favorites = FavoritesService::new(state.clone(), favorites_store, storage);
        let folders = FolderService::new(state.clone(), folder_store, scans.clone());

        Self {
            state,
            scans,
            playback,
            favorites,
            folders,
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Restores saved folders and favorites, then kicks off the first scan.
    /// Failures are logged; the app stays usable with whatever loaded.
    pub fn startup(&self) {
        match self.folders.load() {
            Ok(count) => info!("Restored {} linked folders", count),
            Err(e) => warn!("Starting without saved folders: {}", e),
        }
        match self.favorites.refresh() {
            Ok(count) => info!("Found {} favorites", count),
            Err(e) => warn!("Could not list favorites: {}", e),
        }
        self.scans.request_scan();
    }

    /// Starts watching the linked folders when enabled in the config and
    /// returns whether a watch is running. Folders linked or unlinked later
    /// are followed by the watch.
    pub fn watch_folders(&self) -> Result<bool> {
        if !self.config.watch_folders {
            return Ok(false);
        }
        self.folders.watches().start_watching()?;
        Ok(true)
    }

    pub fn stop_watching(&self) {
        self.folders.watches().stop_watching();
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.state.snapshot()
    }
}
