//! OpenCV Haar cascade face detector.
//!
//! Uses the `haarcascade_frontalface_default.xml` model shipped with OpenCV.
//! The model path can be overridden with `DQR_FACE_CASCADE`.

use std::path::Path;
use std::sync::Mutex;

use image::GrayImage;
use opencv::core::{Mat, Rect, Size, Vector};
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::{CascadeClassifierTrait, CascadeClassifierTraitConst};
use tracing::{debug, info};

use crate::detection::{DetectionParams, FaceDetector, FaceRegion};
use crate::error::{ImageError, ImageResult};

/// Environment variable pointing at a cascade XML file.
pub const CASCADE_PATH_ENV: &str = "DQR_FACE_CASCADE";

/// Locations the frontal face cascade is installed to by common packages.
const CASCADE_PATHS: &[&str] = &[
    "/usr/share/opencv4/haarcascades/haarcascade_frontalface_default.xml",
    "/usr/local/share/opencv4/haarcascades/haarcascade_frontalface_default.xml",
    "/usr/share/opencv/haarcascades/haarcascade_frontalface_default.xml",
    "/opt/homebrew/share/opencv4/haarcascades/haarcascade_frontalface_default.xml",
    "/app/models/haarcascade_frontalface_default.xml",
];

fn find_cascade_path() -> Option<String> {
    if let Ok(path) = std::env::var(CASCADE_PATH_ENV) {
        if Path::new(&path).is_file() {
            return Some(path);
        }
        debug!("{} points to missing file {}", CASCADE_PATH_ENV, path);
    }

    CASCADE_PATHS
        .iter()
        .find(|path| Path::new(path).is_file())
        .map(|path| path.to_string())
}

/// Frontal face detector backed by `cv::CascadeClassifier`.
pub struct HaarCascadeDetector {
    classifier: Mutex<CascadeClassifier>,
    cascade_path: String,
}

impl HaarCascadeDetector {
    /// Load the cascade from `DQR_FACE_CASCADE` or the first known install
    /// location.
    pub fn new() -> ImageResult<Self> {
        let path = find_cascade_path().ok_or_else(|| {
            ImageError::detection_failed(format!(
                "Haar cascade not found; set {} or install OpenCV data files",
                CASCADE_PATH_ENV
            ))
        })?;
        Self::from_path(&path)
    }

    pub fn from_path(path: &str) -> ImageResult<Self> {
        let classifier = CascadeClassifier::new(path).map_err(|e| {
            ImageError::detection_failed(format!("Failed to load cascade {}: {}", path, e))
        })?;

        let empty = classifier
            .empty()
            .map_err(|e| ImageError::detection_failed(e.to_string()))?;
        if empty {
            return Err(ImageError::detection_failed(format!(
                "Cascade {} contains no stages",
                path
            )));
        }

        info!("Loaded Haar cascade from {}", path);
        Ok(Self {
            classifier: Mutex::new(classifier),
            cascade_path: path.to_string(),
        })
    }

    pub fn cascade_path(&self) -> &str {
        &self.cascade_path
    }
}

impl FaceDetector for HaarCascadeDetector {
    fn detect(&self, gray: &GrayImage, params: &DetectionParams) -> ImageResult<Vec<FaceRegion>> {
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return Ok(Vec::new());
        }

        let mat = Mat::new_rows_cols_with_data(height as i32, width as i32, gray.as_raw().as_slice())
            .map_err(|e| ImageError::detection_failed(e.to_string()))?;

        let mut objects = Vector::<Rect>::new();
        let mut classifier = self
            .classifier
            .lock()
            .map_err(|_| ImageError::detection_failed("cascade classifier lock poisoned"))?;

        classifier
            .detect_multi_scale(
                &*mat,
                &mut objects,
                params.scale_factor,
                params.min_neighbors,
                0,
                Size::new(params.min_size.0 as i32, params.min_size.1 as i32),
                Size::default(),
            )
            .map_err(|e| ImageError::detection_failed(e.to_string()))?;

        Ok(objects
            .iter()
            .map(|r| {
                FaceRegion::new(
                    r.x.max(0) as u32,
                    r.y.max(0) as u32,
                    r.width.max(0) as u32,
                    r.height.max(0) as u32,
                )
            })
            .collect())
    }
}
