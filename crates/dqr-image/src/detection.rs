//! Face detection interface.

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::error::ImageResult;

/// Axis-aligned face location in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaceRegion {
    /// Left edge x-coordinate
    pub x: u32,
    /// Top edge y-coordinate
    pub y: u32,
    /// Box width
    pub width: u32,
    /// Box height
    pub height: u32,
}

impl FaceRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Tuning knobs for cascade-style detectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionParams {
    /// Image pyramid scale step. Smaller is more precise and slower.
    pub scale_factor: f64,
    /// Neighbouring candidates required to keep a detection.
    pub min_neighbors: i32,
    /// Smallest face considered, as (width, height).
    pub min_size: (u32, u32),
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            scale_factor: 1.1,
            min_neighbors: 5,
            min_size: (30, 30),
        }
    }
}

/// Pluggable face detection backend.
///
/// Implementations receive the grayscale view of an image and return the
/// regions they consider faces.
pub trait FaceDetector: Send + Sync {
    fn detect(&self, gray: &GrayImage, params: &DetectionParams) -> ImageResult<Vec<FaceRegion>>;
}
