//! Image path validation.

use std::path::{Path, PathBuf};

use crate::error::{ImageError, ImageResult};

/// File extensions accepted as logo images (compared case-insensitively).
pub const ALLOWED_IMAGE_FORMATS: &[&str] = &[
    "png", "jpeg", "jpg", "bmp", "tiff", "tif", "gif", "pbm", "pgm", "ppm", "webp",
];

/// Lower-case extension of `path`, if any.
pub(crate) fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Verify that `path` points to an existing file of a supported format.
///
/// Returns the absolute path.
pub fn check_image_path(path: impl AsRef<Path>) -> ImageResult<PathBuf> {
    let path = path.as_ref();

    let extension = extension_of(path)
        .ok_or_else(|| ImageError::invalid_path(format!("no extension found in {}", path.display())))?;

    if !ALLOWED_IMAGE_FORMATS.contains(&extension.as_str()) {
        return Err(ImageError::UnsupportedFormat {
            extension,
            allowed: ALLOWED_IMAGE_FORMATS.to_vec(),
        });
    }

    if !path.is_file() {
        return Err(ImageError::FileNotFound(path.to_path_buf()));
    }

    Ok(path.canonicalize()?)
}
