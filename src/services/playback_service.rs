//! Service for driving the viewing session.
//!
//! Provides high-level playback methods that coordinate between
//! SessionList, the cached library/favorites lists and the storage provider.

use crate::error::{AppError, SessionError};
use crate::file_utils::PathExt;
use crate::media::{ImageRef, PlaybackSource};
use crate::state::{AppState, RemoveOutcome, SessionList, UndoTicket};
use crate::storage::StorageProvider;
use log::{debug, error, info, warn};
use std::sync::{Arc, MutexGuard};
use std::time::Duration;

/// Result type for playback operations.
pub type PlaybackResult<T> = Result<T, SessionError>;

/// Result of a permanent delete of the current image.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteOutcome {
    pub session: RemoveOutcome,
    /// Whether the provider actually deleted the resource. The session moves
    /// past the image either way.
    pub deleted: Result<(), AppError>,
}

/// Service for managing playback.
#[derive(Clone)]
pub struct PlaybackService {
    state: AppState,
    storage: Arc<dyn StorageProvider>,
    undo_window: Duration,
}

impl PlaybackService {
    pub fn new(state: AppState, storage: Arc<dyn StorageProvider>, undo_window: Duration) -> Self {
        Self {
            state,
            storage,
            undo_window,
        }
    }

    /// Starts a shuffled session over the latest scan result.
    pub fn start_library(&self) -> PlaybackResult<ImageRef> {
        let images = self
            .state
            .library
            .lock()
            .map(|library| library.clone())
            .unwrap_or_default();
        self.start(&images, PlaybackSource::Library)
    }

    /// Starts a shuffled session over the favorite copies.
    pub fn start_favorites(&self) -> PlaybackResult<ImageRef> {
        let images: Vec<ImageRef> = self
            .state
            .favorites
            .lock()
            .map(|favorites| favorites.iter().map(|f| f.image.clone()).collect())
            .unwrap_or_default();
        self.start(&images, PlaybackSource::Favorites)
    }

    fn start(&self, images: &[ImageRef], origin: PlaybackSource) -> PlaybackResult<ImageRef> {
        let (first, committed) = {
            let mut session = self.lock_session()?;
            let first = session.start(images, origin)?.clone();
            (first, session.take_committed())
        };
        self.delete_committed(committed);
        Ok(first)
    }

    /// Navigates to the next image and returns it.
    pub fn next(&self) -> PlaybackResult<ImageRef> {
        let (next, committed) = {
            let mut session = self.lock_session()?;
            let next = session.advance().cloned().ok_or(SessionError::NotPlaying)?;
            (next, session.take_committed())
        };
        self.delete_committed(committed);
        Ok(next)
    }

    /// Navigates to the previous image and returns it.
    pub fn previous(&self) -> PlaybackResult<ImageRef> {
        let mut session = self.lock_session()?;
        session.retreat().cloned().ok_or(SessionError::NotPlaying)
    }

    pub fn current(&self) -> Option<ImageRef> {
        self.state
            .session
            .lock()
            .ok()
            .and_then(|session| session.current_item().cloned())
    }

    pub fn is_playing(&self) -> bool {
        self.current().is_some()
    }

    /// Leaves playback. Any soft delete still in its undo window is carried out.
    pub fn exit(&self) {
        let committed = match self.state.session.lock() {
            Ok(mut session) => {
                session.clear();
                session.take_committed()
            }
            Err(_) => return,
        };
        info!("Playback stopped");
        self.delete_committed(committed);
    }

    /// Drops the current image from the session without touching storage,
    /// e.g. after it failed to decode.
    pub fn skip_current(&self) -> PlaybackResult<RemoveOutcome> {
        let (outcome, committed) = {
            let mut session = self.lock_session()?;
            let outcome = session.remove_current()?;
            (outcome, session.take_committed())
        };
        self.delete_committed(committed);
        Ok(outcome)
    }

    /// Deletes the current image from storage right away.
    ///
    /// A failed delete is reported in [`DeleteOutcome::deleted`] but the image
    /// still leaves the session so playback never sticks on it.
    pub fn delete_current(&self) -> PlaybackResult<DeleteOutcome> {
        let (outcome, committed) = {
            let mut session = self.lock_session()?;
            let outcome = session.remove_current()?;
            (outcome, session.take_committed())
        };
        self.delete_committed(committed);

        let deleted = self.delete_resource(outcome.removed());
        Ok(DeleteOutcome {
            session: outcome,
            deleted,
        })
    }

    /// Removes the current image and schedules its deletion once the undo
    /// window passes.
    pub fn soft_delete_current(&self) -> PlaybackResult<UndoTicket> {
        let (ticket, committed) = {
            let mut session = self.lock_session()?;
            let current = session
                .current_item()
                .cloned()
                .ok_or(SessionError::NotPlaying)?;
            let ticket = session.remove_and_allow_undo(&current, self.undo_window)?;
            (ticket, session.take_committed())
        };
        self.delete_committed(committed);

        debug!(
            "Soft delete of {} pending for {:?}",
            ticket.outcome.removed().path().format_for_log(),
            self.undo_window
        );
        self.schedule_finalize(ticket.token);
        Ok(ticket)
    }

    /// Restores the image removed by the last soft delete.
    pub fn undo(&self) -> PlaybackResult<ImageRef> {
        let mut session = self.lock_session()?;
        let restored = session.undo()?.clone();
        info!("Undo: back to {}", restored.path().format_for_log());
        Ok(restored)
    }

    /// Carries out a pending soft delete without waiting for its timer.
    pub fn finalize_pending(&self) {
        let committed = match self.state.session.lock() {
            Ok(mut session) => {
                session.commit_pending();
                session.take_committed()
            }
            Err(_) => return,
        };
        self.delete_committed(committed);
    }

    fn schedule_finalize(&self, token: u64) {
        let service = self.clone();
        let window = self.undo_window;
        async_std::task::spawn(async move {
            async_std::task::sleep(window).await;

            let committed = match service.state.session.lock() {
                Ok(mut session) => {
                    if session.finalize(token).is_none() {
                        debug!("Undo window {} already closed", token);
                    }
                    session.take_committed()
                }
                Err(_) => return,
            };

            if !committed.is_empty() {
                async_std::task::spawn_blocking(move || service.delete_committed(committed))
                    .await;
            }
        });
    }

    fn delete_committed(&self, committed: Vec<ImageRef>) {
        for image in committed {
            let _ = self.delete_resource(&image);
        }
    }

    /// Deletes through the provider and drops the image from cached lists.
    fn delete_resource(&self, image: &ImageRef) -> Result<(), AppError> {
        if let Ok(mut library) = self.state.library.lock() {
            library.retain(|item| item != image);
        }
        if let Ok(mut favorites) = self.state.favorites.lock() {
            favorites.retain(|favorite| favorite.image != *image);
        }

        match self.storage.delete(image.path()) {
            Ok(()) => {
                info!("Deleted {}", image.path().format_for_log());
                Ok(())
            }
            Err(e) => {
                error!("Failed to delete {}: {}", image, e);
                Err(AppError::Delete(e.to_string()))
            }
        }
    }

    fn lock_session(&self) -> PlaybackResult<MutexGuard<'_, SessionList>> {
        self.state.session.lock().map_err(|_| {
            warn!("Session state poisoned");
            SessionError::NotPlaying
        })
    }
}
