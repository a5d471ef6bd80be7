//! Byte-level decoding with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageFormat, ImageReader};

use super::{ImageMetadata, Orientation, PixelBuffer, SourceImage};
use crate::encode::ExportFormat;
use crate::error::{PipelineError, Result};

/// Decode an image file's bytes into a [`SourceImage`].
///
/// # Arguments
///
/// * `bytes` - Raw file contents (PNG, JPEG, WebP, ...)
/// * `mime_type` - MIME type reported by the file picker, if any
/// * `max_pixels` - Images whose header announces more pixels are rejected
///   before any pixel data is decoded
///
/// # Behavior
///
/// - A MIME type that is not `image/*` is rejected outright
/// - The format is sniffed from the magic bytes; a known MIME type is only
///   used when sniffing fails
/// - EXIF orientation is applied so the result is upright
///
/// # Errors
///
/// Returns `PipelineError::DecodeFailure` for every failure.
pub fn decode_image(bytes: &[u8], mime_type: Option<&str>, max_pixels: u64) -> Result<SourceImage> {
    if bytes.is_empty() {
        return Err(PipelineError::DecodeFailure("empty input".to_string()));
    }

    let format = detect_format(bytes, mime_type)?;

    let (header_width, header_height) = reader_for(bytes, format)
        .into_dimensions()
        .map_err(|e| PipelineError::DecodeFailure(e.to_string()))?;
    let pixels = header_width as u64 * header_height as u64;
    if pixels > max_pixels {
        return Err(PipelineError::DecodeFailure(format!(
            "image is {header_width}x{header_height} ({pixels} pixels), limit is {max_pixels}"
        )));
    }

    let img = reader_for(bytes, format)
        .decode()
        .map_err(|e| PipelineError::DecodeFailure(e.to_string()))?;

    let orientation = extract_orientation(bytes);
    let oriented = apply_orientation(img, orientation);
    let image = PixelBuffer::from_rgba_image(oriented.into_rgba8());

    log::info!(
        "Decoded {:?} image: {}x{} (orientation {:?}, {} bytes)",
        format,
        image.width,
        image.height,
        orientation,
        bytes.len()
    );

    let metadata = ImageMetadata {
        width: image.width,
        height: image.height,
        orientation,
        format: ExportFormat::from_image_format(format),
        byte_len: bytes.len(),
    };
    Ok(SourceImage::new(image, metadata))
}

fn detect_format(bytes: &[u8], mime_type: Option<&str>) -> Result<ImageFormat> {
    let mut hinted = None;
    if let Some(mime) = mime_type.map(str::trim).filter(|m| !m.is_empty()) {
        let mime = mime.to_ascii_lowercase();
        if !mime.starts_with("image/") {
            return Err(PipelineError::DecodeFailure(format!(
                "{mime} is not an image type"
            )));
        }
        hinted = ImageFormat::from_mime_type(&mime);
    }

    // Magic bytes win over the MIME type
    match (image::guess_format(bytes), hinted) {
        (Ok(sniffed), Some(hint)) if sniffed != hint => {
            log::debug!("MIME type says {hint:?} but content is {sniffed:?}");
            Ok(sniffed)
        }
        (Ok(sniffed), _) => Ok(sniffed),
        (Err(_), Some(hint)) => Ok(hint),
        (Err(e), None) => Err(PipelineError::DecodeFailure(e.to_string())),
    }
}

fn reader_for(bytes: &[u8], format: ImageFormat) -> ImageReader<Cursor<&[u8]>> {
    let mut reader = ImageReader::new(Cursor::new(bytes));
    reader.set_format(format);
    reader
}

/// Extract EXIF orientation from an encoded image.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    extract_orientation(bytes)
}

fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    let Ok(exif) = Reader::new().read_from_container(&mut cursor) else {
        return Orientation::Normal;
    };
    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .map(Orientation::from)
        .unwrap_or_default()
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    const NO_LIMIT: u64 = u64::MAX;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 7, 255]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let bytes = png_bytes(4, 3);
        let source = decode_image(&bytes, Some("image/png"), NO_LIMIT).unwrap();

        assert_eq!(source.image().width, 4);
        assert_eq!(source.image().height, 3);
        assert_eq!(source.image().pixel(2, 1), [2, 1, 7, 255]);
        assert_eq!(source.metadata().format, Some(ExportFormat::Png));
        assert_eq!(source.metadata().byte_len, bytes.len());
        assert_eq!(source.metadata().orientation, Orientation::Normal);
    }

    #[test]
    fn test_decode_sniffs_format_without_mime() {
        let bytes = png_bytes(2, 2);
        let source = decode_image(&bytes, None, NO_LIMIT).unwrap();
        assert_eq!(source.image().width, 2);
    }

    #[test]
    fn test_decode_unknown_image_mime_falls_back_to_sniffing() {
        let bytes = png_bytes(2, 2);
        let source = decode_image(&bytes, Some("image/x-made-up"), NO_LIMIT).unwrap();
        assert_eq!(source.metadata().format, Some(ExportFormat::Png));
    }

    #[test]
    fn test_decode_content_wins_over_mime() {
        let img = image::RgbImage::from_pixel(5, 3, image::Rgb([90, 120, 150]));
        let mut jpeg = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut jpeg, ImageFormat::Jpeg)
            .unwrap();

        // A JPEG saved with a .png extension
        let source = decode_image(jpeg.get_ref(), Some("image/png"), NO_LIMIT).unwrap();
        assert_eq!((source.image().width, source.image().height), (5, 3));
        assert_eq!(source.metadata().format, Some(ExportFormat::Jpeg));
    }

    #[test]
    fn test_detect_format_falls_back_to_mime() {
        let format = detect_format(&[0x00, 0x01, 0x02, 0x03], Some("image/png")).unwrap();
        assert_eq!(format, ImageFormat::Png);
    }

    #[test]
    fn test_decode_rejects_non_image_mime() {
        let bytes = png_bytes(2, 2);
        let result = decode_image(&bytes, Some("application/pdf"), NO_LIMIT);
        assert!(matches!(result, Err(PipelineError::DecodeFailure(_))));
    }

    #[test]
    fn test_decode_invalid_bytes() {
        let result = decode_image(&[0x00, 0x01, 0x02, 0x03], None, NO_LIMIT);
        assert!(matches!(result, Err(PipelineError::DecodeFailure(_))));
    }

    #[test]
    fn test_decode_empty_bytes() {
        let result = decode_image(&[], Some("image/png"), NO_LIMIT);
        assert!(matches!(result, Err(PipelineError::DecodeFailure(_))));
    }

    #[test]
    fn test_decode_truncated_png() {
        let bytes = png_bytes(16, 16);
        let result = decode_image(&bytes[..30], Some("image/png"), NO_LIMIT);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_enforces_pixel_limit() {
        let bytes = png_bytes(10, 10);
        assert!(decode_image(&bytes, None, 100).is_ok());
        let result = decode_image(&bytes, None, 99);
        assert!(matches!(result, Err(PipelineError::DecodeFailure(_))));
    }

    #[test]
    fn test_orientation_extraction_no_exif() {
        assert_eq!(get_orientation(&png_bytes(2, 2)), Orientation::Normal);
        assert_eq!(get_orientation(&[0x00, 0x01, 0x02]), Orientation::Normal);
    }

    #[test]
    fn test_apply_orientation_rotate90() {
        let rgb_img = image::RgbaImage::from_raw(2, 1, vec![255, 0, 0, 255, 0, 255, 0, 255]).unwrap();
        let result = apply_orientation(DynamicImage::ImageRgba8(rgb_img), Orientation::Rotate90CW);
        let rgba = result.into_rgba8();

        assert_eq!(rgba.dimensions(), (1, 2));
        // Left (red) pixel ends up on top after a clockwise quarter turn
        assert_eq!(rgba.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_apply_orientation_transpose() {
        let rgb_img = image::RgbaImage::from_raw(2, 1, vec![255, 0, 0, 255, 0, 255, 0, 255]).unwrap();
        let result = apply_orientation(DynamicImage::ImageRgba8(rgb_img), Orientation::Transpose);
        let rgba = result.into_rgba8();

        // Mirrored across the main diagonal: (x, y) -> (y, x)
        assert_eq!(rgba.dimensions(), (1, 2));
        assert_eq!(rgba.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(rgba.get_pixel(0, 1).0, [0, 255, 0, 255]);
    }

    #[test]
    fn test_apply_orientation_transverse() {
        let rgb_img = image::RgbaImage::from_raw(2, 1, vec![255, 0, 0, 255, 0, 255, 0, 255]).unwrap();
        let result = apply_orientation(DynamicImage::ImageRgba8(rgb_img), Orientation::Transverse);
        let rgba = result.into_rgba8();

        // Mirrored across the anti-diagonal
        assert_eq!(rgba.dimensions(), (1, 2));
        assert_eq!(rgba.get_pixel(0, 0).0, [0, 255, 0, 255]);
        assert_eq!(rgba.get_pixel(0, 1).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_apply_orientation_flip_horizontal() {
        let rgb_img = image::RgbaImage::from_raw(2, 1, vec![255, 0, 0, 255, 0, 255, 0, 255]).unwrap();
        let result = apply_orientation(DynamicImage::ImageRgba8(rgb_img), Orientation::FlipHorizontal);
        let rgba = result.into_rgba8();

        assert_eq!(rgba.get_pixel(0, 0).0, [0, 255, 0, 255]);
        assert_eq!(rgba.get_pixel(1, 0).0, [255, 0, 0, 255]);
    }
}
