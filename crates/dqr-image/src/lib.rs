//! Logo image wrapper with face detection.
//!
//! This crate provides:
//! - Path validation against the supported image formats
//! - `LogoImage`, an in-memory image with derived views and mutations
//! - A pluggable `FaceDetector` trait, with an OpenCV Haar cascade
//!   implementation behind the `opencv` feature

pub mod detection;
pub mod error;
#[cfg(feature = "opencv")]
pub mod haar;
pub mod logo;
pub mod path;

pub use detection::{DetectionParams, FaceDetector, FaceRegion};
pub use error::{ImageError, ImageResult};
#[cfg(feature = "opencv")]
pub use haar::HaarCascadeDetector;
pub use logo::{ColorMode, FlipDirection, LogoImage};
pub use path::{check_image_path, ALLOWED_IMAGE_FORMATS};
