//! Error types for image operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for image operations.
pub type ImageResult<T> = Result<T, ImageError>;

/// Errors that can occur while loading, transforming or saving images.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Invalid path provided: {0}")]
    InvalidPath(String),

    #[error("Invalid image format `{extension}`. Allowed formats are {allowed:?}")]
    UnsupportedFormat {
        extension: String,
        allowed: Vec<&'static str>,
    },

    #[error("Image file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Face detection failed: {0}")]
    DetectionFailed(String),

    #[error("Image codec error: {0}")]
    Codec(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImageError {
    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::InvalidPath(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a detection failure error.
    pub fn detection_failed(msg: impl Into<String>) -> Self {
        Self::DetectionFailed(msg.into())
    }
}
