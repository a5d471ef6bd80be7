//! Core types for decoded images.

use serde::{Deserialize, Serialize};

use crate::encode::ExportFormat;
use crate::error::{PipelineError, Result};

/// Bytes per pixel in a [`PixelBuffer`] (RGBA8).
pub const CHANNELS: usize = 4;

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

impl Orientation {
    /// Returns true if this orientation swaps width and height dimensions.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90CW
                | Orientation::Transverse
                | Orientation::Rotate270CW
        )
    }
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// Facts about the encoded input that produced a [`SourceImage`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    /// Width after orientation correction (the "natural" width).
    pub width: u32,
    /// Height after orientation correction.
    pub height: u32,
    /// EXIF orientation found in the input.
    pub orientation: Orientation,
    /// Input container, when it is one we can also export.
    pub format: Option<ExportFormat>,
    /// Size of the encoded input in bytes.
    pub byte_len: usize,
}

impl ImageMetadata {
    /// Natural aspect ratio (width / height).
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }
}

/// An in-memory RGBA8 raster.
///
/// Operations never mutate a buffer in place; each one allocates a fresh
/// output so callers can keep the previous state until the new one is known
/// to be good.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PixelBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    /// Length should be width * height * 4.
    pub pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Create a new buffer with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * CHANNELS,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// A buffer filled with one color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * CHANNELS);
        for _ in 0..count {
            pixels.extend_from_slice(&rgba);
        }
        Self::new(width, height, pixels)
    }

    /// Build a buffer from tightly packed RGB data, with opaque alpha.
    pub fn from_rgb(width: u32, height: u32, rgb: &[u8]) -> Self {
        let mut pixels = Vec::with_capacity(rgb.len() / 3 * CHANNELS);
        for px in rgb.chunks_exact(3) {
            pixels.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        Self::new(width, height, pixels)
    }

    /// Create a buffer from an `image::RgbaImage`.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Convert to an `image::RgbaImage`; `None` if the buffer length is wrong.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Get the size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// Width / height.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }

    /// Check that the buffer has pixels and that `pixels` holds exactly
    /// `width * height * 4` bytes.
    ///
    /// # Errors
    ///
    /// - `SourceNotReady` for an empty buffer
    /// - `InvalidDimension` if the pixel data does not match the dimensions
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(PipelineError::SourceNotReady);
        }
        let expected = self.pixel_count() as usize * CHANNELS;
        if self.pixels.len() != expected {
            return Err(PipelineError::invalid_dimension(
                self.width as u64,
                self.height as u64,
                "pixel data does not match dimensions",
            ));
        }
        Ok(())
    }

    /// RGBA value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Row `y` as a byte slice.
    #[inline]
    pub(crate) fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * CHANNELS;
        let start = y as usize * stride;
        &self.pixels[start..start + stride]
    }
}

/// A decoded input image together with what was learned while decoding it.
///
/// Immutable once decoded; replaced wholesale when a new input arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    image: PixelBuffer,
    metadata: ImageMetadata,
}

impl SourceImage {
    pub fn new(image: PixelBuffer, metadata: ImageMetadata) -> Self {
        Self { image, metadata }
    }

    /// Wrap an already decoded buffer (no encoded input behind it).
    pub fn from_buffer(image: PixelBuffer) -> Self {
        let metadata = ImageMetadata {
            width: image.width,
            height: image.height,
            ..Default::default()
        };
        Self { image, metadata }
    }

    pub fn image(&self) -> &PixelBuffer {
        &self.image
    }

    pub fn metadata(&self) -> &ImageMetadata {
        &self.metadata
    }

    pub fn into_image(self) -> PixelBuffer {
        self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(PixelBuffer::filled(3, 2, [0, 0, 0, 255]).validate().is_ok());
        assert!(matches!(
            PixelBuffer::default().validate(),
            Err(PipelineError::SourceNotReady)
        ));

        let short = PixelBuffer {
            width: 4,
            height: 4,
            pixels: vec![0; 10],
        };
        assert!(matches!(
            short.validate(),
            Err(PipelineError::InvalidDimension { width: 4, height: 4, .. })
        ));
    }

    #[test]
    fn test_orientation_from_u32() {
        assert_eq!(Orientation::from(1), Orientation::Normal);
        assert_eq!(Orientation::from(6), Orientation::Rotate90CW);
        assert_eq!(Orientation::from(99), Orientation::Normal); // Invalid defaults to Normal
    }

    #[test]
    fn test_orientation_swaps_dimensions() {
        assert!(!Orientation::Normal.swaps_dimensions());
        assert!(!Orientation::FlipHorizontal.swaps_dimensions());
        assert!(!Orientation::Rotate180.swaps_dimensions());
        assert!(!Orientation::FlipVertical.swaps_dimensions());

        assert!(Orientation::Transpose.swaps_dimensions());
        assert!(Orientation::Rotate90CW.swaps_dimensions());
        assert!(Orientation::Transverse.swaps_dimensions());
        assert!(Orientation::Rotate270CW.swaps_dimensions());
    }

    #[test]
    fn test_pixel_buffer_creation() {
        let img = PixelBuffer::new(100, 50, vec![0u8; 100 * 50 * 4]);

        assert_eq!(img.width, 100);
        assert_eq!(img.height, 50);
        assert_eq!(img.pixel_count(), 5000);
        assert_eq!(img.byte_size(), 20000);
        assert!(!img.is_empty());
        assert!((img.aspect_ratio() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pixel_buffer_empty() {
        assert!(PixelBuffer::default().is_empty());
        assert!(PixelBuffer::new(0, 0, vec![]).is_empty());
        assert_eq!(PixelBuffer::default().aspect_ratio(), 0.0);
    }

    #[test]
    fn test_from_rgb_adds_opaque_alpha() {
        let img = PixelBuffer::from_rgb(2, 1, &[255, 0, 0, 0, 255, 0]);
        assert_eq!(img.pixel(0, 0), [255, 0, 0, 255]);
        assert_eq!(img.pixel(1, 0), [0, 255, 0, 255]);
    }

    #[test]
    fn test_rgba_image_conversion() {
        let img = PixelBuffer::filled(3, 2, [1, 2, 3, 4]);
        let rgba = img.to_rgba_image().unwrap();
        assert_eq!(rgba.dimensions(), (3, 2));
        assert_eq!(PixelBuffer::from_rgba_image(rgba), img);
    }

    #[test]
    fn test_row_slice() {
        let mut img = PixelBuffer::filled(2, 2, [0, 0, 0, 255]);
        img.pixels[8] = 9; // first byte of row 1
        assert_eq!(img.row(1)[0], 9);
        assert_eq!(img.row(1).len(), 8);
    }

    #[test]
    fn test_source_image_from_buffer() {
        let source = SourceImage::from_buffer(PixelBuffer::filled(8, 4, [0; 4]));
        assert_eq!(source.metadata().width, 8);
        assert_eq!(source.metadata().height, 4);
        assert_eq!(source.metadata().format, None);
        assert!((source.metadata().aspect_ratio() - 2.0).abs() < f64::EPSILON);
    }
}
