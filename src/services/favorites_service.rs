//! Service for handling star/unstar operations.
//!
//! Manages favorite copies with duplicate write prevention and keeps the
//! cached favorites list and a favorites session in step.

use crate::error::{AppError, Result};
use crate::favorites::FavoritesStore;
use crate::file_utils;
use crate::media::{FavoriteEntry, ImageRef, PlaybackSource};
use crate::state::{AppState, RemoveOutcome};
use crate::storage::StorageProvider;
use log::{info, warn};
use std::sync::{Arc, Mutex};

/// Result of toggling the star on an image.
#[derive(Debug, Clone, PartialEq)]
pub enum StarOutcome {
    Starred(FavoriteEntry),
    Unstarred {
        entry: FavoriteEntry,
        /// Set when the copy was also dropped from a running favorites session.
        session: Option<RemoveOutcome>,
    },
}

/// Service for managing favorites.
#[derive(Clone)]
pub struct FavoritesService {
    state: AppState,
    store: Arc<dyn FavoritesStore>,
    storage: Arc<dyn StorageProvider>,
    current_writing: Arc<Mutex<Option<ImageRef>>>,
}

impl FavoritesService {
    pub fn new(
        state: AppState,
        store: Arc<dyn FavoritesStore>,
        storage: Arc<dyn StorageProvider>,
    ) -> Self {
        Self {
            state,
            store,
            storage,
            current_writing: Arc::new(Mutex::new(None)),
        }
    }

    /// Reloads the cached favorites from the store and returns their count.
    pub fn refresh(&self) -> Result<usize> {
        let favorites = self.store.list_favorites()?;
        let count = favorites.len();
        let mut cached = self
            .state
            .favorites
            .lock()
            .map_err(|_| AppError::StateUnavailable)?;
        *cached = favorites;
        Ok(count)
    }

    /// Favorite entry matching `image`, either the image itself or its copy.
    pub fn find_favorite(&self, image: &ImageRef) -> Option<FavoriteEntry> {
        let copy_name = file_utils::favorite_file_name(&image.display_name());
        let favorites = self.state.favorites.lock().ok()?;
        favorites
            .iter()
            .find(|favorite| favorite.image == *image || favorite.name == copy_name)
            .cloned()
    }

    pub fn is_starred(&self, image: &ImageRef) -> bool {
        self.find_favorite(image).is_some()
    }

    /// Toggles the star on the image currently shown.
    pub fn toggle_current(&self) -> Result<StarOutcome> {
        let current = self
            .state
            .session
            .lock()
            .map_err(|_| AppError::StateUnavailable)?
            .current_item()
            .cloned()
            .ok_or_else(|| AppError::Favorites("No image selected".to_string()))?;
        self.toggle(&current)
    }

    /// Stars `image` by copying it into favorites, or unstars it by deleting
    /// the existing copy.
    ///
    /// Returns an error if:
    /// - A copy of this image is already being written
    /// - Copying or deleting fails
    pub fn toggle(&self, image: &ImageRef) -> Result<StarOutcome> {
        match self.find_favorite(image) {
            Some(entry) => self.unstar(entry),
            None => self.star(image),
        }
    }

    fn star(&self, image: &ImageRef) -> Result<StarOutcome> {
        if !self.begin_writing(image) {
            return Err(AppError::Favorites(
                "Write already in progress for this file".to_string(),
            ));
        }

        let copy_result = self.store.copy_to_favorites(image, &image.display_name());
        self.clear_writing_lock();

        let copy = copy_result?;
        let entry = FavoriteEntry {
            name: copy.display_name(),
            image: copy,
        };
        if let Ok(mut favorites) = self.state.favorites.lock() {
            favorites.push(entry.clone());
        }
        Ok(StarOutcome::Starred(entry))
    }

    fn unstar(&self, entry: FavoriteEntry) -> Result<StarOutcome> {
        self.storage
            .delete(entry.image.path())
            .map_err(|e| AppError::Delete(e.to_string()))?;
        info!("Removed favorite {}", entry.name);

        if let Ok(mut favorites) = self.state.favorites.lock() {
            favorites.retain(|favorite| favorite.image != entry.image);
        }

        // The copy no longer exists, so a favorites session drops it now.
        let session = match self.state.session.lock() {
            Ok(mut session) if session.source() == Some(PlaybackSource::Favorites) => {
                session.remove_item(&entry.image).ok()
            }
            _ => None,
        };

        Ok(StarOutcome::Unstarred { entry, session })
    }

    /// Claims the write slot for `image` unless a copy of it is already
    /// being written. Check and claim happen under one lock.
    fn begin_writing(&self, image: &ImageRef) -> bool {
        let Ok(mut writing) = self.current_writing.lock() else {
            return false;
        };
        if writing.as_ref() == Some(image) {
            warn!("Favorite copy already in progress for: {}", image);
            return false;
        }
        *writing = Some(image.clone());
        true
    }

    fn clear_writing_lock(&self) {
        if let Ok(mut writing) = self.current_writing.lock() {
            *writing = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdvancePolicy;
    use crate::favorites::LocalFavorites;
    use crate::state::SessionList;
    use crate::storage::LocalStorage;
    use image::{Rgb, RgbImage};
    use std::path::Path;
    use tempfile::tempdir;

    fn write_png(path: &Path) -> ImageRef {
        RgbImage::from_pixel(2, 2, Rgb([10, 200, 10]))
            .save(path)
            .expect("failed to write test png");
        ImageRef::new(path)
    }

    fn setup(favs_dir: &Path) -> (FavoritesService, AppState) {
        let state = AppState::with_session(SessionList::with_seed(AdvancePolicy::Wrap, 4));
        let service = FavoritesService::new(
            state.clone(),
            Arc::new(LocalFavorites::new(favs_dir)),
            Arc::new(LocalStorage::new()),
        );
        (service, state)
    }

    #[test]
    fn star_then_unstar_round_trip() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let image = write_png(&temp_dir.path().join("dog.png"));
        let favs = temp_dir.path().join("favs");
        let (service, state) = setup(&favs);

        let starred = service.toggle(&image).expect("star failed");
        let StarOutcome::Starred(entry) = starred else {
            panic!("expected a new favorite");
        };
        assert_eq!(entry.name, "PR_dog.jpg");
        assert!(entry.image.path().exists());
        assert!(service.is_starred(&image));
        assert!(service.is_starred(&entry.image));

        let unstarred = service.toggle(&image).expect("unstar failed");
        assert!(matches!(unstarred, StarOutcome::Unstarred { session: None, .. }));
        assert!(!entry.image.path().exists());
        assert!(image.path().exists());
        assert!(state.favorites.lock().unwrap().is_empty());
    }

    #[test]
    fn refresh_picks_up_existing_copies() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let favs = temp_dir.path().join("favs");
        std::fs::create_dir_all(&favs).expect("mkdir");
        write_png(&favs.join("PR_cat.jpg"));
        let (service, _) = setup(&favs);

        assert_eq!(service.refresh().expect("refresh failed"), 1);
        assert!(service.is_starred(&ImageRef::new("/somewhere/else/cat.png")));
    }

    #[test]
    fn unstar_during_favorites_playback_drops_current() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let favs = temp_dir.path().join("favs");
        std::fs::create_dir_all(&favs).expect("mkdir");
        write_png(&favs.join("PR_a.jpg"));
        write_png(&favs.join("PR_b.jpg"));
        let (service, state) = setup(&favs);
        service.refresh().expect("refresh failed");

        let favorites: Vec<ImageRef> = state
            .favorites
            .lock()
            .unwrap()
            .iter()
            .map(|f| f.image.clone())
            .collect();
        let current = state
            .session
            .lock()
            .unwrap()
            .start(&favorites, PlaybackSource::Favorites)
            .expect("start failed")
            .clone();

        let outcome = service.toggle_current().expect("unstar failed");

        assert!(matches!(
            outcome,
            StarOutcome::Unstarred { session: Some(RemoveOutcome::Continue(_)), .. }
        ));
        assert_eq!(state.session.lock().unwrap().len(), 1);
        assert_ne!(state.session.lock().unwrap().current_item(), Some(&current));
        assert!(!current.path().exists());
    }

    #[test]
    fn toggle_without_playback_is_an_error() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let (service, _) = setup(&temp_dir.path().join("favs"));
        assert!(matches!(
            service.toggle_current(),
            Err(AppError::Favorites(_))
        ));
    }

    #[test]
    fn star_is_refused_while_same_copy_is_being_written() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let image = write_png(&temp_dir.path().join("dog.png"));
        let favs = temp_dir.path().join("favs");
        let (service, _) = setup(&favs);

        assert!(service.begin_writing(&image));
        assert!(!service.begin_writing(&image));
        assert!(matches!(service.toggle(&image), Err(AppError::Favorites(_))));
        assert!(!favs.join("PR_dog.jpg").exists());

        service.clear_writing_lock();
        assert!(matches!(service.toggle(&image), Ok(StarOutcome::Starred(_))));
    }
}
