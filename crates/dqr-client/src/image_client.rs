//! QR codes for face images.
//!
//! The API cannot encode an image directly. The image is uploaded as the
//! QR code's logo, then the QR code's `link` is pointed at the uploaded
//! logo's URL.

use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;

use dqr_image::{FaceDetector, LogoImage};
use dqr_models::{GeneratedQrCode, Payload, QrCodeRecord};
use tracing::{debug, warn};

use crate::client::{LogoPart, QrClient};
use crate::error::{ClientError, ClientResult};
use crate::options::{GenerateOptions, DEFAULT_LINK};

/// Image to turn into a QR code.
#[derive(Debug, Clone)]
pub enum ImageInput {
    /// Path to an image file; loaded and validated on use.
    Path(PathBuf),
    /// An already loaded image.
    Image(LogoImage),
}

impl From<LogoImage> for ImageInput {
    fn from(image: LogoImage) -> Self {
        ImageInput::Image(image)
    }
}

impl From<PathBuf> for ImageInput {
    fn from(path: PathBuf) -> Self {
        ImageInput::Path(path)
    }
}

impl From<&std::path::Path> for ImageInput {
    fn from(path: &std::path::Path) -> Self {
        ImageInput::Path(path.to_path_buf())
    }
}

impl From<&str> for ImageInput {
    fn from(path: &str) -> Self {
        ImageInput::Path(PathBuf::from(path.trim().replace('\\', "/")))
    }
}

/// [`QrClient`] for images containing faces.
///
/// Everything not overridden here is available through `Deref`.
#[derive(Clone)]
pub struct ImageQrClient {
    inner: QrClient,
    detector: Arc<dyn FaceDetector>,
}

impl std::fmt::Debug for ImageQrClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageQrClient")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl ImageQrClient {
    pub fn new(inner: QrClient, detector: Arc<dyn FaceDetector>) -> Self {
        Self { inner, detector }
    }

    /// Use the OpenCV frontal face cascade for detection.
    #[cfg(feature = "opencv")]
    pub fn with_haar_cascade(inner: QrClient) -> ClientResult<Self> {
        let detector = dqr_image::HaarCascadeDetector::new()?;
        Ok(Self::new(inner, Arc::new(detector)))
    }

    pub fn detector(&self) -> &dyn FaceDetector {
        self.detector.as_ref()
    }

    pub fn into_inner(self) -> QrClient {
        self.inner
    }

    // =========================================================================
    // Generation
    // =========================================================================

    /// Create QR codes for `image` and return their (image url, id) pairs.
    ///
    /// `image_name` defaults to the image's file name; the part before the
    /// first `.` becomes the product name. `options.link`, `options.logo`
    /// and `options.product_name` are ignored.
    pub async fn generate_qrcode(
        &self,
        image: impl Into<ImageInput>,
        image_name: Option<&str>,
        options: &GenerateOptions,
    ) -> ClientResult<Vec<GeneratedQrCode>> {
        let records = self.generate_qrcode_verbose(image, image_name, options).await?;
        records
            .iter()
            .map(|record| {
                record.to_generated().ok_or_else(|| {
                    ClientError::generation(format!(
                        "QR Code {} has no `qrcode_image_url`",
                        record.qrcode_id
                    ))
                })
            })
            .collect()
    }

    /// Create QR codes for `image` and return the records after their link
    /// was pointed at the uploaded image.
    pub async fn generate_qrcode_verbose(
        &self,
        image: impl Into<ImageInput>,
        image_name: Option<&str>,
        options: &GenerateOptions,
    ) -> ClientResult<Vec<QrCodeRecord>> {
        options.parsed_type()?;

        let image = self.load_with_face(image.into()).await?;
        let image_name = image_name
            .map(str::to_string)
            .unwrap_or_else(|| image.name());
        let product_name = image_name.split('.').next().unwrap_or_default().to_string();

        let mut options = options.clone();
        options.link = DEFAULT_LINK.to_string();
        options.product_name = Some(product_name);
        options.logo = None;

        let logo = LogoPart::new(image_name, image.to_bytes()?);
        let created = self.inner.create(&options, Some(logo)).await?;

        let mut linked = Vec::with_capacity(created.len());
        for record in &created {
            linked.push(self.link_to_logo(record).await?);
        }
        Ok(linked)
    }

    async fn load_with_face(&self, input: ImageInput) -> ClientResult<LogoImage> {
        let detector = Arc::clone(&self.detector);

        let (image, has_face) = tokio::task::spawn_blocking(move || -> ClientResult<(LogoImage, bool)> {
            let image = match input {
                ImageInput::Path(path) => LogoImage::open(path)?,
                ImageInput::Image(image) => image,
            };
            let has_face = image.has_faces(detector.as_ref())?;
            Ok((image, has_face))
        })
        .await
        .map_err(|e| ClientError::Io(std::io::Error::other(e)))??;

        if !has_face {
            return Err(ClientError::NoFaceDetected);
        }
        debug!("Face found in {}", image.name());
        Ok(image)
    }

    async fn link_to_logo(&self, record: &QrCodeRecord) -> ClientResult<QrCodeRecord> {
        let logo_url = record
            .logo_url
            .clone()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                ClientError::generation(format!("QR Code {} has no `logo_url`", record.qrcode_id))
            })?;

        self.update_qrcode_verbose(&record.qrcode_id, Payload::new().with("link", logo_url))
            .await
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Update a QR code and return its new image URL.
    pub async fn update_qrcode(&self, qrcode_id: &str, payload: Payload) -> ClientResult<String> {
        let record = self.update_qrcode_verbose(qrcode_id, payload).await?;
        record.qrcode_image_url.ok_or_else(|| {
            ClientError::update(format!("QR Code {} has no `qrcode_image_url`", qrcode_id))
        })
    }

    /// Update a QR code and return the updated record. Always sent as JSON;
    /// a `logo` entry is dropped.
    pub async fn update_qrcode_verbose(&self, qrcode_id: &str, mut payload: Payload) -> ClientResult<QrCodeRecord> {
        payload.insert("company_id", self.inner.credentials().user_id.clone());
        if payload.remove("logo").is_some() {
            warn!(qrcode_id, "`logo` is ignored when updating image QR codes");
        }

        self.inner.send_update(qrcode_id, payload, None).await
    }
}

impl Deref for ImageQrClient {
    type Target = QrClient;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClientConfig, Credentials};
    use dqr_image::{DetectionParams, FaceRegion, ImageResult};
    use image::GrayImage;

    struct NoFaces;

    impl FaceDetector for NoFaces {
        fn detect(&self, _gray: &GrayImage, _params: &DetectionParams) -> ImageResult<Vec<FaceRegion>> {
            Ok(Vec::new())
        }
    }

    fn client() -> ImageQrClient {
        let inner = QrClient::new(
            Credentials::new("alice", "u-1", None),
            ClientConfig::default().with_base_url("http://localhost:1/api/v2"),
        )
        .unwrap();
        ImageQrClient::new(inner, Arc::new(NoFaces))
    }

    #[test]
    fn test_str_input_normalises_separators() {
        match ImageInput::from(" images\\face.png ") {
            ImageInput::Path(path) => assert_eq!(path, PathBuf::from("images/face.png")),
            ImageInput::Image(_) => panic!("expected a path"),
        }
    }

    #[test]
    fn test_derefs_to_base_client() {
        let client = client();
        assert_eq!(client.available_qrcode_types(), vec!["Link".to_string()]);
        assert_eq!(client.credentials().username, "alice");
    }

    #[tokio::test]
    async fn test_no_face_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("landscape.png");
        image::RgbImage::new(32, 32).save(&path).unwrap();

        let err = client()
            .generate_qrcode(path.as_path(), None, &GenerateOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NoFaceDetected));
    }

    #[tokio::test]
    async fn test_missing_image_is_reported() {
        let err = client()
            .generate_qrcode("does/not/exist.png", None, &GenerateOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Image(_)));
    }
}
