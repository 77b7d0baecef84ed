//! State management for the roulette core.

use crate::config::AdvancePolicy;
use crate::media::{FavoriteEntry, FolderRoot, ImageRef, PlaybackSource};
use crate::services::FolderWatch;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub mod session;

pub use session::{RemoveOutcome, SessionList, UndoTicket};

/// Application-wide state container.
///
/// Everything the host needs to render lives here; services own the
/// transitions.
#[derive(Clone)]
pub struct AppState {
    pub folders: Arc<Mutex<BTreeSet<FolderRoot>>>,
    /// Result of the latest completed scan.
    pub library: Arc<Mutex<Vec<ImageRef>>>,
    pub favorites: Arc<Mutex<Vec<FavoriteEntry>>>,
    pub session: Arc<Mutex<SessionList>>,
    /// Set while a scan is running on a worker.
    pub scanning: Arc<AtomicBool>,
    /// Folder watch, when automatic rescans are on.
    pub watch: Arc<Mutex<Option<FolderWatch>>>,
}

/// Read-only view handed to the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub playing: bool,
    pub scanning: bool,
    pub watching: bool,
    pub library_count: usize,
    pub favorites_count: usize,
    pub folder_count: usize,
    pub current: Option<ImageRef>,
    /// 1-based position and session length.
    pub position: Option<(usize, usize)>,
    pub source: Option<PlaybackSource>,
    pub undo_available: bool,
}

impl AppState {
    pub fn new(policy: AdvancePolicy) -> Self {
        Self::with_session(SessionList::new(policy))
    }

    pub fn with_session(session: SessionList) -> Self {
        Self {
            folders: Arc::new(Mutex::new(BTreeSet::new())),
            library: Arc::new(Mutex::new(Vec::new())),
            favorites: Arc::new(Mutex::new(Vec::new())),
            session: Arc::new(Mutex::new(session)),
            scanning: Arc::new(AtomicBool::new(false)),
            watch: Arc::new(Mutex::new(None)),
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::SeqCst)
    }

    /// Collects the current state in one pass. Poisoned parts read as empty.
    pub fn snapshot(&self) -> ViewSnapshot {
        let mut snapshot = ViewSnapshot {
            playing: false,
            scanning: self.is_scanning(),
            watching: self.watch.lock().map(|w| w.is_some()).unwrap_or(false),
            library_count: self.library.lock().map(|l| l.len()).unwrap_or(0),
            favorites_count: self.favorites.lock().map(|f| f.len()).unwrap_or(0),
            folder_count: self.folders.lock().map(|f| f.len()).unwrap_or(0),
            current: None,
            position: None,
            source: None,
            undo_available: false,
        };

        if let Ok(session) = self.session.lock() {
            snapshot.playing = !session.is_empty();
            snapshot.current = session.current_item().cloned();
            snapshot.position = session.position();
            snapshot.source = session.source();
            snapshot.undo_available = session.pending_undo().is_some();
        }

        snapshot
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AdvancePolicy::default())
    }
}
