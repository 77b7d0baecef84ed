//! Core of a picture roulette viewer.
//!
//! Scans user-linked folder trees for images, plays them back in a shuffled
//! session with next/previous/delete/undo, and keeps starred images as copies
//! in a favorites folder. Rendering is left to the host, which reads
//! [`ViewSnapshot`] and calls into the services on [`RouletteApp`].

pub mod app;
pub mod config;
pub mod error;
pub mod favorites;
pub mod file_utils;
pub mod media;
pub mod persistence;
pub mod scanner;
pub mod services;
pub mod state;
pub mod storage;

pub use app::RouletteApp;
pub use config::{AdvancePolicy, AppConfig, SessionConfig};
pub use error::{AppError, Result, SessionError};
pub use media::{FavoriteEntry, FolderRoot, ImageRef, PlaybackSource};
pub use scanner::{ScanFailure, ScanReport, TreeScanner};
pub use state::{AppState, RemoveOutcome, SessionList, UndoTicket, ViewSnapshot};
pub use storage::{StorageEntry, StorageProvider};

/// Sets up `env_logger` at debug level in debug builds. Later calls are no-ops.
pub fn init_logging() {
    #[cfg(debug_assertions)]
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}
