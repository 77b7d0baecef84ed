//! Favorites folder: JPEG copies of starred images.

use crate::config::FAVORITE_JPEG_QUALITY;
use crate::error::{AppError, Result};
use crate::file_utils::{self, PathExt};
use crate::media::{FavoriteEntry, ImageRef};
use image::codecs::jpeg::JpegEncoder;
use log::info;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Listing and creation of favorite copies.
pub trait FavoritesStore: Send + Sync {
    fn list_favorites(&self) -> Result<Vec<FavoriteEntry>>;

    /// Copies `image` into the favorites location under a name derived from
    /// `name` and returns the new copy.
    fn copy_to_favorites(&self, image: &ImageRef, name: &str) -> Result<ImageRef>;
}

/// Favorites kept as files in one directory.
pub struct LocalFavorites {
    dir: PathBuf,
}

impl LocalFavorites {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FavoritesStore for LocalFavorites {
    fn list_favorites(&self) -> Result<Vec<FavoriteEntry>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut favorites: Vec<FavoriteEntry> = fs::read_dir(&self.dir)
            .map_err(|e| AppError::Favorites(e.to_string()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && file_utils::is_supported_image(path))
            .map(|path| FavoriteEntry {
                name: file_utils::display_name(&path),
                image: ImageRef::new(path),
            })
            .collect();

        favorites.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(favorites)
    }

    /// Decodes the source and writes it as a JPEG named `PR_<stem>.jpg`.
    fn copy_to_favorites(&self, image: &ImageRef, name: &str) -> Result<ImageRef> {
        let decoded = image::ImageReader::open(image.path())
            .map_err(|e| AppError::ImageLoad(e.to_string()))?
            .with_guessed_format()
            .map_err(|e| AppError::ImageLoad(e.to_string()))?
            .decode()?;

        fs::create_dir_all(&self.dir).map_err(|e| AppError::Favorites(e.to_string()))?;
        let target = self.dir.join(file_utils::favorite_file_name(name));
        let file = fs::File::create(&target).map_err(|e| AppError::Favorites(e.to_string()))?;

        let mut writer = BufWriter::new(file);
        JpegEncoder::new_with_quality(&mut writer, FAVORITE_JPEG_QUALITY)
            .encode_image(&decoded.to_rgb8())?;
        writer
            .flush()
            .map_err(|e| AppError::Favorites(e.to_string()))?;

        info!(
            "Saved favorite {} -> {}",
            image.path().format_for_log(),
            target.format_for_log()
        );
        Ok(ImageRef::new(target))
    }
}
