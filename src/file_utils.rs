use crate::config::{FAVORITE_PREFIX, SUPPORTED_IMAGE_EXTENSIONS};
use image::ImageFormat;
use std::path::Path;

/// Content type reported for files that are not supported images.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Returns true if the path has one of the supported image extensions.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext_str| SUPPORTED_IMAGE_EXTENSIONS.contains(&ext_str.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Classifies a file by extension into a MIME content type.
pub fn content_type_for(path: &Path) -> &'static str {
    if !is_supported_image(path) {
        return OCTET_STREAM;
    }
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .unwrap_or(OCTET_STREAM)
}

/// Returns true for `image/*` content types.
pub fn is_image_content_type(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

/// Last path component, or the whole path when there is none.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Name of the favorite copy for an image called `name`: `PR_<stem>.jpg`.
///
/// Names that already carry the prefix keep it only once, so a favorite copy
/// maps to itself.
pub fn favorite_file_name(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    if stem.starts_with(FAVORITE_PREFIX) {
        format!("{}.jpg", stem)
    } else {
        format!("{}{}.jpg", FAVORITE_PREFIX, stem)
    }
}

pub trait PathExt {
    /// Short form for log lines: `parent/file`.
    fn format_for_log(&self) -> String;
}

impl PathExt for Path {
    fn format_for_log(&self) -> String {
        let name = display_name(self);
        match self.parent().and_then(|p| p.file_name()) {
            Some(parent) => format!("{}/{}", parent.to_string_lossy(), name),
            None => name,
        }
    }
}
