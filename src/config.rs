//! Application configuration constants and settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Supported image file extensions for scanning directories.
pub const SUPPORTED_IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// Folder (under the user's pictures directory) holding favorite copies.
pub const FAVORITES_DIR_NAME: &str = "PicRoulette_Favorites";

/// File name prefix marking a favorite copy.
pub const FAVORITE_PREFIX: &str = "PR_";

/// JPEG quality used when writing favorite copies.
pub const FAVORITE_JPEG_QUALITY: u8 = 95;

/// Directory name under the platform data dir for persisted settings.
pub const APP_DATA_DIR_NAME: &str = "pic-roulette";

/// File holding the persisted folder roots.
pub const FOLDERS_FILE: &str = "folders.json";

/// How long a soft delete stays reversible.
pub const DEFAULT_UNDO_WINDOW: Duration = Duration::from_secs(4);

/// Poll interval of the folder watcher backend.
pub const WATCH_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Debounce period before a burst of folder events triggers a rescan.
pub const WATCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// What `advance` does when the cursor is on the last item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvancePolicy {
    /// Jump back to the first item.
    Wrap,
    /// Reshuffle and start over, never repeating the item just shown.
    #[default]
    ReshuffleWithoutRepeat,
}

/// Session behaviour settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub advance_policy: AdvancePolicy,
    /// Undo window in milliseconds.
    pub undo_window_ms: u64,
}

impl SessionConfig {
    pub fn undo_window(&self) -> Duration {
        Duration::from_millis(self.undo_window_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            advance_policy: AdvancePolicy::default(),
            undo_window_ms: DEFAULT_UNDO_WINDOW.as_millis() as u64,
        }
    }
}

/// Top-level settings used to assemble a [`crate::RouletteApp`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub session: SessionConfig,
    /// Where favorite copies are written.
    pub favorites_dir: PathBuf,
    /// Where `folders.json` lives.
    pub data_dir: PathBuf,
    /// Rescan automatically when files change under a folder root.
    pub watch_folders: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            favorites_dir: default_favorites_dir(),
            data_dir: default_data_dir(),
            watch_folders: false,
        }
    }
}

/// `<Pictures>/PicRoulette_Favorites`, falling back to the home directory.
pub fn default_favorites_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(FAVORITES_DIR_NAME)
}

/// Platform data directory for this application.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DATA_DIR_NAME)
}
