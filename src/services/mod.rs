//! Service layer for business logic.
//!
//! Separates playback, favorites and folder handling from whatever front end drives them.

pub mod auto_rescan_service;
pub mod favorites_service;
pub mod folder_service;
pub mod playback_service;
pub mod scan_service;

pub use auto_rescan_service::{AutoRescanService, FolderWatch, FolderWatcher};
pub use favorites_service::{FavoritesService, StarOutcome};
pub use folder_service::FolderService;
pub use playback_service::{DeleteOutcome, PlaybackResult, PlaybackService};
pub use scan_service::{ScanRequest, ScanService, ScanSummary};
