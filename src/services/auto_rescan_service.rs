//! Service for automatic rescans when linked folders change.

use crate::config::{WATCH_DEBOUNCE, WATCH_POLL_INTERVAL};
use crate::error::{AppError, Result};
use crate::file_utils::{self, PathExt};
use crate::media::FolderRoot;
use crate::services::ScanService;
use crate::state::AppState;
use log::{debug, info, warn};
use notify::{PollWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer_opt, Config, DebounceEventResult, DebouncedEvent, Debouncer};
use std::collections::BTreeSet;
use std::path::Path;

/// Polling debouncer behind a [`FolderWatch`].
pub type FolderWatcher = Debouncer<PollWatcher>;

/// Live folder watch and the roots it currently covers.
pub struct FolderWatch {
    debouncer: FolderWatcher,
    roots: BTreeSet<FolderRoot>,
}

/// Service for managing folder watches.
///
/// The watch lives in [`AppState::watch`], so every clone sees the same one
/// and folder changes can be applied to it.
#[derive(Clone)]
pub struct AutoRescanService {
    scans: ScanService,
    state: AppState,
}

/// Events that can change the library: image files, or extension-less paths
/// which are usually directories coming and going.
fn is_relevant(path: &Path) -> bool {
    file_utils::is_supported_image(path) || path.extension().is_none()
}

/// Handles debounced file system events.
fn handle_debounced_events(events: Vec<DebouncedEvent>, scans: &ScanService) {
    let relevant: Vec<_> = events
        .into_iter()
        .filter(|event| is_relevant(&event.path))
        .collect();

    if relevant.is_empty() {
        return;
    }

    debug!("Debounced folder events: {} events", relevant.len());
    for event in &relevant {
        debug!("  - {:?} for {}", event.kind, event.path.format_for_log());
    }

    scans.request_scan();
}

impl AutoRescanService {
    pub fn new(scans: ScanService, state: AppState) -> Self {
        Self { scans, state }
    }

    /// Starts a polling watch over the registered roots, replacing any
    /// previous one. Roots that cannot be watched are skipped with a warning
    /// and retried on the next [`Self::sync`].
    pub fn start_watching(&self) -> Result<()> {
        let scans = self.scans.clone();

        let notify_config = notify::Config::default().with_poll_interval(WATCH_POLL_INTERVAL);
        let debouncer_config = Config::default()
            .with_timeout(WATCH_DEBOUNCE)
            .with_notify_config(notify_config);

        let debouncer = new_debouncer_opt::<_, PollWatcher>(
            debouncer_config,
            move |res: DebounceEventResult| match res {
                Ok(events) => handle_debounced_events(events, &scans),
                Err(error) => warn!("Folder watcher error: {}", error),
            },
        )
        .map_err(|e| AppError::Watch(format!("Failed to create debouncer: {}", e)))?;

        let mut slot = self
            .state
            .watch
            .lock()
            .map_err(|_| AppError::StateUnavailable)?;
        let watch = slot.insert(FolderWatch {
            debouncer,
            roots: BTreeSet::new(),
        });
        self.apply_roots(watch);
        info!("Watching {} folders", watch.roots.len());
        Ok(())
    }

    /// Stops watching. Dropping the debouncer ends its polling thread.
    pub fn stop_watching(&self) {
        if let Ok(mut slot) = self.state.watch.lock() {
            if slot.take().is_some() {
                info!("Stopped watching folders");
            }
        }
    }

    pub fn is_watching(&self) -> bool {
        self.state
            .watch
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    /// Roots the live watch covers; empty when not watching.
    pub fn watched_roots(&self) -> Vec<FolderRoot> {
        self.state
            .watch
            .lock()
            .ok()
            .and_then(|slot| slot.as_ref().map(|w| w.roots.iter().cloned().collect()))
            .unwrap_or_default()
    }

    /// Brings the live watch in line with the registered roots. No-op when
    /// not watching.
    pub fn sync(&self) {
        let Ok(mut slot) = self.state.watch.lock() else {
            return;
        };
        if let Some(watch) = slot.as_mut() {
            self.apply_roots(watch);
        }
    }

    /// Lock order: watch slot before folders.
    fn apply_roots(&self, watch: &mut FolderWatch) {
        let wanted: BTreeSet<FolderRoot> = match self.state.folders.lock() {
            Ok(folders) => folders.clone(),
            Err(_) => {
                warn!("Folder list unavailable, leaving watches unchanged");
                return;
            }
        };

        let stale: Vec<FolderRoot> = watch.roots.difference(&wanted).cloned().collect();
        for root in stale {
            if let Err(e) = watch.debouncer.watcher().unwatch(root.path()) {
                debug!("Unwatch {}: {}", root.path().display(), e);
            }
            watch.roots.remove(&root);
        }

        let missing: Vec<FolderRoot> = wanted.difference(&watch.roots).cloned().collect();
        for root in missing {
            match watch
                .debouncer
                .watcher()
                .watch(root.path(), RecursiveMode::Recursive)
            {
                Ok(()) => {
                    watch.roots.insert(root);
                }
                Err(e) => warn!("Cannot watch {}: {}", root.path().display(), e),
            }
        }
    }
}
