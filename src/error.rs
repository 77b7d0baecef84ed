//! Unified error types for the roulette core.

use std::fmt;

/// Application-specific errors.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Error loading, decoding or encoding an image file
    ImageLoad(String),
    /// Error listing a container while scanning
    DirectoryScan(String),
    /// Error deleting an image through the storage provider
    Delete(String),
    /// Error reading or writing persisted folder roots
    Persistence(String),
    /// Error reading or writing the favorites folder
    Favorites(String),
    /// Error setting up the folder watcher
    Watch(String),
    /// Shared state lock was poisoned
    StateUnavailable,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ImageLoad(msg) => write!(f, "image load error: {}", msg),
            AppError::DirectoryScan(msg) => write!(f, "directory scan error: {}", msg),
            AppError::Delete(msg) => write!(f, "delete failed: {}", msg),
            AppError::Persistence(msg) => write!(f, "settings error: {}", msg),
            AppError::Favorites(msg) => write!(f, "favorites error: {}", msg),
            AppError::Watch(msg) => write!(f, "folder watcher error: {}", msg),
            AppError::StateUnavailable => write!(f, "application state is unavailable"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::ImageLoad(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::DirectoryScan(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Persistence(err.to_string())
    }
}

/// Type alias for Results in this crate.
pub type Result<T> = std::result::Result<T, AppError>;

/// Rejections from the viewing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// Playback cannot start from an empty source
    EmptySource,
    /// No session is playing
    NotPlaying,
    /// The image is not part of the session
    NotInSession,
    /// No soft delete is waiting to be undone
    NothingToUndo,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::EmptySource => write!(f, "no images to play"),
            SessionError::NotPlaying => write!(f, "no session is playing"),
            SessionError::NotInSession => write!(f, "image is not in the current session"),
            SessionError::NothingToUndo => write!(f, "nothing to undo"),
        }
    }
}

impl std::error::Error for SessionError {}
