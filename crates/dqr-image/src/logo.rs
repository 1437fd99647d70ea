//! In-memory logo image with derived views and mutations.
//!
//! All mutating operations replace the pixel buffer held by [`LogoImage`];
//! the file on disk is only written by [`LogoImage::save`].

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufWriter, Cursor};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, GrayImage, ImageFormat, Luma, LumaA, Pixel, Rgb, Rgba};
use imageproc::contrast::{equalize_histogram, threshold, ThresholdType};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::geometric_transformations::{warp, Interpolation, Projection};
use imageproc::rect::Rect;
use tracing::debug;

use crate::detection::{DetectionParams, FaceDetector, FaceRegion};
use crate::error::{ImageError, ImageResult};
use crate::path::{check_image_path, extension_of, ALLOWED_IMAGE_FORMATS};

/// Gray level separating black from white in binary views.
const BINARY_THRESHOLD: u8 = 127;

/// Line thickness used when marking out faces.
const FACE_MARK_THICKNESS: u32 = 2;

/// How the pixel data should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Single channel holding only pure black and pure white.
    Binary,
    /// Single channel, any gray levels.
    Grayscale,
    /// Three or more channels.
    Color,
}

/// Flip axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipDirection {
    /// Upside-down.
    Vertical,
    /// Side-ways.
    Horizontal,
    /// Both axes at once.
    Both,
}

impl FlipDirection {
    /// Map an OpenCV-style flip code: `0` vertical, positive horizontal,
    /// negative both.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => FlipDirection::Vertical,
            c if c > 0 => FlipDirection::Horizontal,
            _ => FlipDirection::Both,
        }
    }
}

/// An image file loaded into memory.
#[derive(Debug, Clone)]
pub struct LogoImage {
    path: PathBuf,
    data: DynamicImage,
}

impl LogoImage {
    /// Validate `path` and decode the image it points to.
    pub fn open(path: impl AsRef<Path>) -> ImageResult<Self> {
        let path = check_image_path(path)?;
        let data = image::open(&path)?;
        debug!(
            "Loaded image {} ({}x{}, {:?})",
            path.display(),
            data.width(),
            data.height(),
            data.color()
        );
        Ok(Self { path, data })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Absolute path the image was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Point the image at another file. The pixel buffer is kept.
    pub fn set_path(&mut self, path: impl AsRef<Path>) -> ImageResult<()> {
        self.path = check_image_path(path)?;
        Ok(())
    }

    /// File name, including extension.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Lower-case file extension, e.g. `jpg`.
    pub fn format(&self) -> String {
        extension_of(&self.path).unwrap_or_default()
    }

    pub fn data(&self) -> &DynamicImage {
        &self.data
    }

    pub fn set_data(&mut self, data: DynamicImage) {
        self.data = data;
    }

    pub fn into_data(self) -> DynamicImage {
        self.data
    }

    /// Encode the current buffer in the image's own format.
    pub fn to_bytes(&self) -> ImageResult<Vec<u8>> {
        let format = image_format(&self.format())?;
        let mut buffer = Cursor::new(Vec::new());
        encodable(&self.data, format).write_to(&mut buffer, format)?;
        Ok(buffer.into_inner())
    }

    /// (height, width, channels)
    pub fn shape(&self) -> (u32, u32, u8) {
        (self.height(), self.width(), self.channels())
    }

    pub fn width(&self) -> u32 {
        self.data.width()
    }

    pub fn height(&self) -> u32 {
        self.data.height()
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    /// Width divided by height; `0.0` for an empty image.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height() == 0 {
            return 0.0;
        }
        f64::from(self.width()) / f64::from(self.height())
    }

    /// (width, height)
    pub fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn channels(&self) -> u8 {
        self.data.color().channel_count()
    }

    pub fn color_mode(&self) -> ColorMode {
        if self.data.color().has_color() {
            ColorMode::Color
        } else if is_black_and_white(&self.gray()) {
            ColorMode::Binary
        } else {
            ColorMode::Grayscale
        }
    }

    pub fn is_grayscale(&self) -> bool {
        self.color_mode() == ColorMode::Grayscale
    }

    pub fn is_color(&self) -> bool {
        self.color_mode() == ColorMode::Color
    }

    pub fn is_binary(&self) -> bool {
        self.color_mode() == ColorMode::Binary
    }

    pub fn is_empty(&self) -> bool {
        self.area() == 0
    }

    pub fn is_valid(&self) -> bool {
        !self.is_empty()
    }

    pub fn is_valid_grayscale(&self) -> bool {
        self.is_valid() && self.is_grayscale()
    }

    pub fn is_valid_color(&self) -> bool {
        self.is_valid() && self.is_color()
    }

    pub fn is_valid_binary(&self) -> bool {
        self.is_valid() && self.is_binary()
    }

    // =========================================================================
    // Derived views
    // =========================================================================

    /// Grayscale view. Single-channel images are returned unchanged.
    pub fn gray(&self) -> GrayImage {
        self.data.to_luma8()
    }

    /// Histogram-equalized grayscale view.
    pub fn equalized_gray(&self) -> GrayImage {
        equalize_histogram(&self.gray())
    }

    /// Black and white view; gray levels above 127 become white.
    pub fn binary(&self) -> GrayImage {
        threshold(&self.gray(), BINARY_THRESHOLD, ThresholdType::Binary)
    }

    /// Inverted black and white view.
    pub fn binary_inverted(&self) -> GrayImage {
        threshold(&self.gray(), BINARY_THRESHOLD, ThresholdType::BinaryInverted)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Resize to the given dimensions.
    ///
    /// When only one dimension is given the other is derived from the
    /// current aspect ratio.
    pub fn resize(&mut self, width: Option<u32>, height: Option<u32>) -> ImageResult<()> {
        if self.is_empty() {
            return Err(ImageError::invalid_argument("cannot resize an empty image"));
        }

        let (width, height) = match (width, height) {
            (None, None) => {
                return Err(ImageError::invalid_argument(
                    "either width or height must be provided",
                ))
            }
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => (w, scale_dimension(w, self.height(), self.width())),
            (None, Some(h)) => (scale_dimension(h, self.width(), self.height()), h),
        };

        if width == 0 || height == 0 {
            return Err(ImageError::invalid_argument(format!(
                "resize target {}x{} is empty",
                width, height
            )));
        }

        self.data = self.data.resize_exact(width, height, FilterType::Triangle);
        Ok(())
    }

    /// Rotate by `angle` degrees (positive is clockwise) around `center`,
    /// scaling by `scale`.
    ///
    /// The canvas keeps its size; areas not covered by the source become
    /// black. `center` defaults to the middle of the image.
    pub fn rotate(&mut self, angle: f32, center: Option<(f32, f32)>, scale: f32) -> ImageResult<()> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(ImageError::invalid_argument(format!(
                "rotation scale must be positive, got {}",
                scale
            )));
        }

        let (cx, cy) = center.unwrap_or((self.width() as f32 / 2.0, self.height() as f32 / 2.0));
        let projection = Projection::translate(cx, cy)
            * Projection::rotate(angle.to_radians())
            * Projection::scale(scale, scale)
            * Projection::translate(-cx, -cy);

        macro_rules! warp_native {
            ($variant:ident, $buf:expr, $fill:expr) => {
                DynamicImage::$variant(warp($buf, &projection, Interpolation::Bilinear, $fill))
            };
        }

        self.data = match &self.data {
            DynamicImage::ImageLuma8(buf) => warp_native!(ImageLuma8, buf, Luma([0])),
            DynamicImage::ImageLumaA8(buf) => warp_native!(ImageLumaA8, buf, LumaA([0, 0])),
            DynamicImage::ImageRgb8(buf) => warp_native!(ImageRgb8, buf, Rgb([0, 0, 0])),
            DynamicImage::ImageRgba8(buf) => warp_native!(ImageRgba8, buf, Rgba([0, 0, 0, 0])),
            DynamicImage::ImageLuma16(buf) => warp_native!(ImageLuma16, buf, Luma([0u16])),
            DynamicImage::ImageLumaA16(buf) => warp_native!(ImageLumaA16, buf, LumaA([0u16, 0])),
            DynamicImage::ImageRgb16(buf) => warp_native!(ImageRgb16, buf, Rgb([0u16, 0, 0])),
            DynamicImage::ImageRgba16(buf) => warp_native!(ImageRgba16, buf, Rgba([0u16, 0, 0, 0])),
            other => {
                let warped = warp(
                    &other.to_rgba8(),
                    &projection,
                    Interpolation::Bilinear,
                    Rgba([0, 0, 0, 0]),
                );
                with_color_type(DynamicImage::ImageRgba8(warped), other.color())
            }
        };
        Ok(())
    }

    pub fn flip(&mut self, direction: FlipDirection) {
        self.data = match direction {
            FlipDirection::Vertical => self.data.flipv(),
            FlipDirection::Horizontal => self.data.fliph(),
            FlipDirection::Both => self.data.rotate180(),
        };
    }

    /// Keep only the region starting at (`x`, `y`).
    ///
    /// The region is clamped to the image bounds. With `resize_to_original`
    /// the cropped region is scaled back up to the previous dimensions.
    pub fn crop(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        resize_to_original: bool,
    ) -> ImageResult<()> {
        let (orig_width, orig_height) = self.size();
        if x >= orig_width || y >= orig_height || width == 0 || height == 0 {
            return Err(ImageError::invalid_argument(format!(
                "crop region {}x{} at ({}, {}) is outside the {}x{} image",
                width, height, x, y, orig_width, orig_height
            )));
        }

        let width = width.min(orig_width - x);
        let height = height.min(orig_height - y);
        let cropped = self.data.crop_imm(x, y, width, height);

        self.data = if resize_to_original {
            cropped.resize_exact(orig_width, orig_height, FilterType::Triangle)
        } else {
            cropped
        };
        Ok(())
    }

    /// Replace the buffer with its grayscale view.
    pub fn grayscale(&mut self, equalize: bool) {
        let gray = if equalize {
            self.equalized_gray()
        } else {
            self.gray()
        };
        self.data = DynamicImage::ImageLuma8(gray);
    }

    /// Replace the buffer with its black and white view.
    pub fn make_binary(&mut self, invert: bool) {
        let binary = if invert {
            self.binary_inverted()
        } else {
            self.binary()
        };
        self.data = DynamicImage::ImageLuma8(binary);
    }

    /// Draw a hollow rectangle whose outer edge starts at (`x`, `y`).
    ///
    /// Thicker lines grow inwards.
    pub fn draw_rectangle(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        color: Rgb<u8>,
        thickness: u32,
    ) {
        for inset in 0..thickness {
            let w = width.saturating_sub(2 * inset);
            let h = height.saturating_sub(2 * inset);
            if w == 0 || h == 0 {
                break;
            }
            let rect = Rect::at((x + inset) as i32, (y + inset) as i32).of_size(w, h);
            draw_rect(&mut self.data, rect, color);
        }
    }

    // =========================================================================
    // Faces
    // =========================================================================

    /// Locate faces using `detector` on the grayscale view.
    pub fn find_faces(
        &self,
        detector: &dyn FaceDetector,
        params: &DetectionParams,
    ) -> ImageResult<Vec<FaceRegion>> {
        let faces = detector.detect(&self.gray(), params)?;
        debug!("Found {} face(s) in {}", faces.len(), self.path.display());
        Ok(faces)
    }

    /// Number of faces found with default detection parameters.
    pub fn face_count(&self, detector: &dyn FaceDetector) -> ImageResult<usize> {
        Ok(self.find_faces(detector, &DetectionParams::default())?.len())
    }

    pub fn has_faces(&self, detector: &dyn FaceDetector) -> ImageResult<bool> {
        Ok(self.face_count(detector)? > 0)
    }

    /// Outline each region with `color`.
    pub fn markout_faces(&mut self, regions: &[FaceRegion], color: Rgb<u8>) {
        for region in regions {
            self.draw_rectangle(
                region.x,
                region.y,
                region.width,
                region.height,
                color,
                FACE_MARK_THICKNESS,
            );
        }
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Write the buffer to `path`, or back to the source file.
    ///
    /// `quality` must lie in `10..=100`. Below 100 it sets the JPEG quality
    /// or the PNG compression level (`quality / 10`); other formats are
    /// always written losslessly. Missing parent directories are created.
    pub fn save(&self, path: Option<&Path>, quality: u8) -> ImageResult<PathBuf> {
        if !(10..=100).contains(&quality) {
            return Err(ImageError::invalid_argument(format!(
                "quality should be between 10 and 100, got {}",
                quality
            )));
        }

        let target = path.map(Path::to_path_buf).unwrap_or_else(|| self.path.clone());
        let extension = extension_of(&target).unwrap_or_else(|| self.format());
        let format = image_format(&extension)?;

        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let prepared = encodable(&self.data, format);
        if quality < 100 {
            match format {
                ImageFormat::Jpeg => {
                    let writer = BufWriter::new(File::create(&target)?);
                    prepared.write_with_encoder(JpegEncoder::new_with_quality(writer, quality))?;
                    return Ok(target);
                }
                ImageFormat::Png => {
                    let writer = BufWriter::new(File::create(&target)?);
                    prepared.write_with_encoder(PngEncoder::new_with_quality(
                        writer,
                        png_compression(quality),
                        PngFilterType::Adaptive,
                    ))?;
                    return Ok(target);
                }
                other => debug!("Quality setting ignored for {:?}", other),
            }
        }

        prepared.save_with_format(&target, format)?;
        Ok(target)
    }
}

/// Scale `value` by `numerator / denominator`, never returning zero.
fn scale_dimension(value: u32, numerator: u32, denominator: u32) -> u32 {
    let scaled = f64::from(value) * f64::from(numerator) / f64::from(denominator);
    (scaled.round() as u32).max(1)
}

fn is_black_and_white(gray: &GrayImage) -> bool {
    let mut black = false;
    let mut white = false;
    for pixel in gray.pixels() {
        match pixel.0[0] {
            0 => black = true,
            255 => white = true,
            _ => return false,
        }
    }
    black && white
}

fn image_format(extension: &str) -> ImageResult<ImageFormat> {
    ImageFormat::from_extension(extension).ok_or_else(|| ImageError::UnsupportedFormat {
        extension: extension.to_string(),
        allowed: ALLOWED_IMAGE_FORMATS.to_vec(),
    })
}

/// Convert the buffer to a color type `format` can encode.
fn encodable(data: &DynamicImage, format: ImageFormat) -> Cow<'_, DynamicImage> {
    match format {
        ImageFormat::Jpeg | ImageFormat::Pnm => match data {
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => Cow::Borrowed(data),
            _ if data.color().has_color() => Cow::Owned(DynamicImage::ImageRgb8(data.to_rgb8())),
            _ => Cow::Owned(DynamicImage::ImageLuma8(data.to_luma8())),
        },
        ImageFormat::Gif => match data {
            DynamicImage::ImageRgba8(_) => Cow::Borrowed(data),
            _ => Cow::Owned(DynamicImage::ImageRgba8(data.to_rgba8())),
        },
        _ => Cow::Borrowed(data),
    }
}

fn png_compression(quality: u8) -> CompressionType {
    match quality / 10 {
        0..=3 => CompressionType::Fast,
        4..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

fn draw_rect(data: &mut DynamicImage, rect: Rect, color: Rgb<u8>) {
    match data {
        DynamicImage::ImageLuma8(buf) => draw_hollow_rect_mut(buf, rect, color.to_luma()),
        DynamicImage::ImageLumaA8(buf) => draw_hollow_rect_mut(buf, rect, color.to_luma_alpha()),
        DynamicImage::ImageRgb8(buf) => draw_hollow_rect_mut(buf, rect, color),
        DynamicImage::ImageRgba8(buf) => draw_hollow_rect_mut(buf, rect, color.to_rgba()),
        other => {
            let original = other.color();
            let mut buf = other.to_rgba8();
            draw_hollow_rect_mut(&mut buf, rect, color.to_rgba());
            *other = with_color_type(DynamicImage::ImageRgba8(buf), original);
        }
    }
}

/// Convert `data` back to `color`, keeping channel count and depth.
fn with_color_type(data: DynamicImage, color: ColorType) -> DynamicImage {
    match color {
        ColorType::L8 => DynamicImage::ImageLuma8(data.to_luma8()),
        ColorType::La8 => DynamicImage::ImageLumaA8(data.to_luma_alpha8()),
        ColorType::Rgb8 => DynamicImage::ImageRgb8(data.to_rgb8()),
        ColorType::L16 => DynamicImage::ImageLuma16(data.to_luma16()),
        ColorType::La16 => DynamicImage::ImageLumaA16(data.to_luma_alpha16()),
        ColorType::Rgb16 => DynamicImage::ImageRgb16(data.to_rgb16()),
        ColorType::Rgba16 => DynamicImage::ImageRgba16(data.to_rgba16()),
        ColorType::Rgb32F => DynamicImage::ImageRgb32F(data.to_rgb32f()),
        ColorType::Rgba32F => DynamicImage::ImageRgba32F(data.to_rgba32f()),
        _ => data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayAlphaImage, ImageBuffer, RgbImage};
    use tempfile::TempDir;

    struct FixedDetector(Vec<FaceRegion>);

    impl FaceDetector for FixedDetector {
        fn detect(&self, _gray: &GrayImage, _params: &DetectionParams) -> ImageResult<Vec<FaceRegion>> {
            Ok(self.0.clone())
        }
    }

    fn write_sample(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 128])
        });
        let path = dir.path().join(name);
        img.save(&path).unwrap();
        path
    }

    fn sample(width: u32, height: u32) -> (TempDir, LogoImage) {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir, "sample.png", width, height);
        let image = LogoImage::open(path).unwrap();
        (dir, image)
    }

    #[test]
    fn test_open_exposes_attributes() {
        let (_dir, image) = sample(200, 100);

        assert_eq!(image.name(), "sample.png");
        assert_eq!(image.format(), "png");
        assert!(image.path().is_absolute());
        assert_eq!(image.size(), (200, 100));
        assert_eq!(image.shape(), (100, 200, 3));
        assert_eq!(image.area(), 20_000);
        assert!((image.aspect_ratio() - 2.0).abs() < f64::EPSILON);
        assert!(image.is_color());
        assert!(image.is_valid_color());
        assert!(!image.is_binary());
        assert!(!image.is_empty());
    }

    #[test]
    fn test_to_bytes_uses_source_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir, "logo.jpg", 64, 48);
        let image = LogoImage::open(path).unwrap();

        assert_eq!(image.format(), "jpg");
        let bytes = image.to_bytes().unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[test]
    fn test_set_path_validates() {
        let (dir, mut image) = sample(10, 10);
        assert!(matches!(
            image.set_path(dir.path().join("sample")),
            Err(ImageError::InvalidPath(_))
        ));
        assert!(matches!(
            image.set_path(dir.path().join("sample.svg")),
            Err(ImageError::UnsupportedFormat { .. })
        ));

        let other = write_sample(&dir, "other.bmp", 4, 4);
        image.set_path(&other).unwrap();
        assert_eq!(image.format(), "bmp");
        assert_eq!(image.size(), (10, 10));
    }

    #[test]
    fn test_resize() {
        let (_dir, mut image) = sample(200, 100);

        image.resize(Some(80), Some(60)).unwrap();
        assert_eq!(image.size(), (80, 60));

        image.resize(Some(40), None).unwrap();
        assert_eq!(image.size(), (40, 30));

        image.resize(None, Some(15)).unwrap();
        assert_eq!(image.size(), (20, 15));

        assert!(matches!(
            image.resize(None, None),
            Err(ImageError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rotate_keeps_canvas() {
        let (_dir, mut image) = sample(120, 80);
        for angle in [90.0, 180.0, 270.0, 360.0, 450.0, -90.0] {
            image.rotate(angle, None, 1.0).unwrap();
            assert_eq!(image.size(), (120, 80));
        }
        assert!(image.rotate(45.0, Some((0.0, 0.0)), 0.0).is_err());
    }

    #[test]
    fn test_rotate_positive_angle_is_clockwise() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        GrayImage::from_fn(40, 40, |x, y| {
            if (19..=21).contains(&x) && y <= 2 {
                Luma([255])
            } else {
                Luma([0])
            }
        })
        .save(&path)
        .unwrap();
        let mut image = LogoImage::open(&path).unwrap();

        image.rotate(90.0, None, 1.0).unwrap();
        let gray = image.gray();
        assert!(gray.get_pixel(39, 20).0[0] > 200, "top centre should move to the right");
        assert!(gray.get_pixel(1, 20).0[0] < 50);
        assert!(gray.get_pixel(20, 1).0[0] < 50);
    }

    #[test]
    fn test_rotate_keeps_color_type() {
        let dir = tempfile::tempdir().unwrap();

        let gray_alpha = dir.path().join("gray_alpha.png");
        GrayAlphaImage::from_fn(32, 32, |x, y| LumaA([(x * 8) as u8, (y * 8) as u8]))
            .save(&gray_alpha)
            .unwrap();
        let deep_gray = dir.path().join("deep_gray.png");
        ImageBuffer::<Luma<u16>, Vec<u16>>::from_fn(32, 32, |x, y| Luma([(x * y * 60) as u16]))
            .save(&deep_gray)
            .unwrap();

        for (path, color) in [(gray_alpha, ColorType::La8), (deep_gray, ColorType::L16)] {
            let mut image = LogoImage::open(&path).unwrap();
            assert_eq!(image.data().color(), color);
            let channels = image.channels();

            image.rotate(10.0, None, 1.0).unwrap();
            assert_eq!(image.data().color(), color);
            assert_eq!(image.channels(), channels);
            assert!(image.is_grayscale());

            image.rotate(90.0, None, 1.0).unwrap();
            assert_eq!(image.data().color(), color);
        }
    }

    #[test]
    fn test_markout_keeps_color_type() {
        let dir = tempfile::tempdir().unwrap();

        let gray_alpha = dir.path().join("gray_alpha.png");
        GrayAlphaImage::from_fn(32, 32, |x, _| LumaA([(x * 4) as u8, 255]))
            .save(&gray_alpha)
            .unwrap();
        let mut image = LogoImage::open(&gray_alpha).unwrap();
        image.markout_faces(&[FaceRegion::new(4, 4, 10, 10)], Rgb([255, 255, 255]));
        assert_eq!(image.data().color(), ColorType::La8);
        assert_eq!(image.channels(), 2);
        assert_eq!(image.gray().get_pixel(4, 4).0[0], 255);

        let deep_rgb = dir.path().join("deep_rgb.png");
        ImageBuffer::<Rgb<u16>, Vec<u16>>::from_fn(16, 16, |x, y| Rgb([(x * 4000) as u16, (y * 4000) as u16, 0]))
            .save(&deep_rgb)
            .unwrap();
        let mut image = LogoImage::open(&deep_rgb).unwrap();
        image.draw_rectangle(0, 0, 8, 8, Rgb([0, 255, 0]), 1);
        assert_eq!(image.data().color(), ColorType::Rgb16);
        assert_eq!(*image.data().to_rgb8().get_pixel(0, 0), Rgb([0, 255, 0]));
    }

    #[test]
    fn test_flip() {
        let (_dir, mut image) = sample(50, 40);
        let before = image.data().to_rgb8();

        image.flip(FlipDirection::from_code(1));
        assert_eq!(image.data().to_rgb8().get_pixel(0, 0), before.get_pixel(49, 0));

        image.flip(FlipDirection::Horizontal);
        image.flip(FlipDirection::from_code(0));
        assert_eq!(image.data().to_rgb8().get_pixel(0, 0), before.get_pixel(0, 39));

        image.flip(FlipDirection::Vertical);
        image.flip(FlipDirection::from_code(-1));
        assert_eq!(image.data().to_rgb8().get_pixel(0, 0), before.get_pixel(49, 39));
    }

    #[test]
    fn test_crop() {
        let (_dir, mut image) = sample(200, 100);
        image.crop(150, 50, 100, 100, false).unwrap();
        assert_eq!(image.size(), (50, 50));

        let (_dir, mut image) = sample(200, 100);
        image.crop(0, 0, 80, 40, true).unwrap();
        assert_eq!(image.size(), (200, 100));

        assert!(image.crop(200, 0, 10, 10, false).is_err());
        assert!(image.crop(0, 0, 0, 10, false).is_err());
    }

    #[test]
    fn test_grayscale_and_binary() {
        let (_dir, mut image) = sample(64, 64);

        assert_eq!(image.gray().dimensions(), (64, 64));
        assert_eq!(image.equalized_gray().dimensions(), (64, 64));
        assert!(image.binary().pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));

        image.grayscale(false);
        assert_eq!(image.channels(), 1);
        assert!(image.is_grayscale());
        assert!(image.is_valid_grayscale());

        let normal = image.binary();
        let inverted = image.binary_inverted();
        for (a, b) in normal.pixels().zip(inverted.pixels()) {
            assert_eq!(a.0[0], 255 - b.0[0]);
        }

        image.make_binary(true);
        assert!(image.is_binary());
        assert!(image.is_valid_binary());
        assert_eq!(image.color_mode(), ColorMode::Binary);
    }

    #[test]
    fn test_face_detection_helpers() {
        let (_dir, mut image) = sample(100, 100);
        let none = FixedDetector(Vec::new());
        let one = FixedDetector(vec![FaceRegion::new(10, 20, 30, 40)]);

        assert!(!image.has_faces(&none).unwrap());
        assert_eq!(image.face_count(&none).unwrap(), 0);
        assert!(image.has_faces(&one).unwrap());

        let faces = image.find_faces(&one, &DetectionParams::default()).unwrap();
        image.markout_faces(&faces, Rgb([0, 255, 0]));
        let rgb = image.data().to_rgb8();
        assert_eq!(*rgb.get_pixel(10, 20), Rgb([0, 255, 0]));
        assert_eq!(*rgb.get_pixel(11, 21), Rgb([0, 255, 0]));
        assert_ne!(*rgb.get_pixel(25, 40), Rgb([0, 255, 0]));
    }

    #[test]
    fn test_draw_rectangle_on_grayscale() {
        let (_dir, mut image) = sample(40, 40);
        image.grayscale(false);
        image.draw_rectangle(5, 5, 10, 10, Rgb([255, 255, 255]), 1);
        assert_eq!(image.channels(), 1);
        assert_eq!(image.gray().get_pixel(5, 5).0[0], 255);
    }

    #[test]
    fn test_save_with_quality() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir, "face.jpg", 64, 64);
        let image = LogoImage::open(&path).unwrap();

        let target = dir.path().join("results").join("face.jpg");
        let written = image.save(Some(&target), 80).unwrap();
        assert_eq!(written, target);
        assert!(LogoImage::open(&target).is_ok());

        let png_target = dir.path().join("results").join("face.png");
        image.save(Some(&png_target), 50).unwrap();
        assert_eq!(LogoImage::open(&png_target).unwrap().size(), (64, 64));

        assert!(matches!(
            image.save(Some(&target), 5),
            Err(ImageError::InvalidArgument(_))
        ));
        assert!(matches!(
            image.save(Some(&target), 101),
            Err(ImageError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_save_defaults_to_source_path() {
        let (_dir, mut image) = sample(30, 20);
        image.resize(Some(15), Some(10)).unwrap();
        let written = image.save(None, 100).unwrap();

        assert_eq!(written, image.path());
        assert_eq!(LogoImage::open(&written).unwrap().size(), (15, 10));
    }
}
