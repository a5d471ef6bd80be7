//! Per-format encoders.
//!
//! Each codec sits behind its cargo feature. When a feature is compiled out
//! the matching function reports `UnsupportedFormat` instead of failing to
//! link, so a multi-format export can skip it and carry on.

use crate::decode::PixelBuffer;
use crate::error::{PipelineError, Result};

use super::{EncodedImage, ExportFormat};

/// Encode `buffer` in one format.
///
/// `quality` must already be on the encoder scale (1-100); see
/// [`PipelineConfig::effective_quality`](crate::PipelineConfig::effective_quality).
/// PNG ignores it.
///
/// # Errors
///
/// - `SourceNotReady` for an empty buffer
/// - `InvalidDimension` if the pixel data does not match the dimensions
/// - `UnsupportedFormat` if the codec is not compiled in
/// - `EncodingFailed` if the codec itself fails
pub fn encode_format(buffer: &PixelBuffer, format: ExportFormat, quality: u8) -> Result<EncodedImage> {
    buffer.validate()?;
    let quality = quality.clamp(1, 100);

    let bytes = match format {
        ExportFormat::Png => encode_png(buffer)?,
        ExportFormat::Jpeg => encode_jpeg(buffer, quality)?,
        ExportFormat::WebP => encode_webp(buffer, quality)?,
    };

    log::debug!(
        "Encoded {}x{} as {} (quality {}): {} bytes",
        buffer.width,
        buffer.height,
        format,
        quality,
        bytes.len()
    );

    Ok(EncodedImage {
        format,
        width: buffer.width,
        height: buffer.height,
        bytes,
    })
}

#[allow(dead_code)]
fn encoding_failed(format: ExportFormat, err: impl std::fmt::Display) -> PipelineError {
    PipelineError::EncodingFailed {
        format: format.name(),
        message: err.to_string(),
    }
}

#[cfg(feature = "png")]
fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>> {
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder};

    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(&buffer.pixels, buffer.width, buffer.height, ExtendedColorType::Rgba8)
        .map_err(|e| encoding_failed(ExportFormat::Png, e))?;
    Ok(bytes)
}

#[cfg(not(feature = "png"))]
fn encode_png(_buffer: &PixelBuffer) -> Result<Vec<u8>> {
    Err(PipelineError::UnsupportedFormat(ExportFormat::Png.to_string()))
}

/// JPEG has no alpha channel; transparent pixels are composited over black,
/// which is what a canvas does when asked for `image/jpeg`.
#[cfg(feature = "jpeg")]
fn encode_jpeg(buffer: &PixelBuffer, quality: u8) -> Result<Vec<u8>> {
    use image::codecs::jpeg::JpegEncoder;
    use image::{ExtendedColorType, ImageEncoder};

    let rgb = composite_over_black(&buffer.pixels);
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .write_image(&rgb, buffer.width, buffer.height, ExtendedColorType::Rgb8)
        .map_err(|e| encoding_failed(ExportFormat::Jpeg, e))?;
    Ok(bytes)
}

#[cfg(not(feature = "jpeg"))]
fn encode_jpeg(_buffer: &PixelBuffer, _quality: u8) -> Result<Vec<u8>> {
    Err(PipelineError::UnsupportedFormat(ExportFormat::Jpeg.to_string()))
}

#[cfg(feature = "lossy-webp")]
fn encode_webp(buffer: &PixelBuffer, quality: u8) -> Result<Vec<u8>> {
    let encoder = webp::Encoder::from_rgba(&buffer.pixels, buffer.width, buffer.height);
    let memory = encoder
        .encode_simple(false, quality as f32)
        .map_err(|e| encoding_failed(ExportFormat::WebP, format!("{e:?}")))?;
    Ok(memory.to_vec())
}

/// Without libwebp only the lossless `image` encoder is available.
#[cfg(all(feature = "webp", not(feature = "lossy-webp")))]
fn encode_webp(buffer: &PixelBuffer, _quality: u8) -> Result<Vec<u8>> {
    use image::codecs::webp::WebPEncoder;
    use image::{ExtendedColorType, ImageEncoder};

    let mut bytes = Vec::new();
    WebPEncoder::new_lossless(&mut bytes)
        .write_image(&buffer.pixels, buffer.width, buffer.height, ExtendedColorType::Rgba8)
        .map_err(|e| encoding_failed(ExportFormat::WebP, e))?;
    Ok(bytes)
}

#[cfg(not(feature = "webp"))]
fn encode_webp(_buffer: &PixelBuffer, _quality: u8) -> Result<Vec<u8>> {
    Err(PipelineError::UnsupportedFormat(ExportFormat::WebP.to_string()))
}

/// Encode a square RGBA buffer as a single-image ICO.
#[cfg(feature = "ico")]
pub(crate) fn encode_ico(buffer: &PixelBuffer) -> Result<Vec<u8>> {
    use image::codecs::ico::IcoEncoder;
    use image::{ExtendedColorType, ImageEncoder};

    buffer.validate()?;
    let mut bytes = Vec::new();
    IcoEncoder::new(&mut bytes)
        .write_image(&buffer.pixels, buffer.width, buffer.height, ExtendedColorType::Rgba8)
        .map_err(|e| PipelineError::EncodingFailed {
            format: "ico",
            message: e.to_string(),
        })?;
    Ok(bytes)
}

#[cfg(not(feature = "ico"))]
pub(crate) fn encode_ico(_buffer: &PixelBuffer) -> Result<Vec<u8>> {
    Err(PipelineError::UnsupportedFormat("ico".to_string()))
}

/// Drop alpha by multiplying each color channel by it (black background).
#[cfg_attr(not(feature = "jpeg"), allow(dead_code))]
fn composite_over_black(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        let a = px[3] as u16;
        for &c in &px[..3] {
            rgb.push(((c as u16 * a + 127) / 255) as u8);
        }
    }
    rgb
}
