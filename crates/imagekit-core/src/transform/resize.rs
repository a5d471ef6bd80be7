//! Image resizing.
//!
//! Two named resize modes replace the competing "by dimensions" and
//! "as percentage" states of a resize form:
//!
//! - [`ResizeSpec::Dimensions`] - explicit target size, optionally keeping the
//!   input's aspect ratio. The dimension the caller edited last drives the
//!   other one; when both change at once, width wins.
//! - [`ResizeSpec::Percentage`] - scale both axes by the same factor.
//!
//! Resampling always interpolates; nearest-neighbour is not offered.

use serde::{Deserialize, Serialize};

use crate::decode::PixelBuffer;
use crate::error::{PipelineError, Result};

/// Interpolation filter for resize operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleFilter {
    /// Bilinear interpolation (fast, close to canvas "low" smoothing).
    Bilinear,
    /// Catmull-Rom cubic interpolation.
    CatmullRom,
    /// Lanczos3 interpolation (slowest, sharpest).
    #[default]
    Lanczos3,
}

impl ResampleFilter {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            ResampleFilter::Bilinear => image::imageops::FilterType::Triangle,
            ResampleFilter::CatmullRom => image::imageops::FilterType::CatmullRom,
            ResampleFilter::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Which dimension drives the other when the aspect ratio is locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectDriver {
    #[default]
    Width,
    Height,
}

/// How to compute the output size of a resize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ResizeSpec {
    /// Resize to explicit dimensions.
    #[serde(rename_all = "camelCase")]
    Dimensions {
        width: u32,
        height: u32,
        maintain_aspect_ratio: bool,
        #[serde(default)]
        driver: AspectDriver,
    },
    /// Scale both dimensions by `percent / 100`.
    Percentage { percent: f64 },
}

impl ResizeSpec {
    /// Exact target size, aspect ratio not enforced.
    pub fn exact(width: u32, height: u32) -> Self {
        ResizeSpec::Dimensions {
            width,
            height,
            maintain_aspect_ratio: false,
            driver: AspectDriver::Width,
        }
    }

    /// Target size with the aspect ratio locked, `driver` being authoritative.
    pub fn keep_aspect(width: u32, height: u32, driver: AspectDriver) -> Self {
        ResizeSpec::Dimensions {
            width,
            height,
            maintain_aspect_ratio: true,
            driver,
        }
    }

    pub fn percentage(percent: f64) -> Self {
        ResizeSpec::Percentage { percent }
    }

    /// Resolve the output size for an input of `src_width` x `src_height`.
    ///
    /// # Errors
    ///
    /// `InvalidDimension` when the requested or derived size is zero, the
    /// percentage is not a positive finite number, or either side exceeds
    /// `max_dimension`.
    pub fn target_dimensions(
        &self,
        src_width: u32,
        src_height: u32,
        max_dimension: u32,
    ) -> Result<(u32, u32)> {
        let (width, height) = match *self {
            ResizeSpec::Dimensions {
                width,
                height,
                maintain_aspect_ratio: true,
                driver,
            } => {
                let value = match driver {
                    AspectDriver::Width => width,
                    AspectDriver::Height => height,
                };
                if value == 0 {
                    return Err(PipelineError::invalid_dimension(
                        width as u64,
                        height as u64,
                        "driving dimension must be positive",
                    ));
                }
                aspect_linked_dimensions(src_width, src_height, driver, value)
            }
            ResizeSpec::Dimensions { width, height, .. } => {
                if width == 0 || height == 0 {
                    return Err(PipelineError::invalid_dimension(
                        width as u64,
                        height as u64,
                        "width and height must be positive",
                    ));
                }
                (width, height)
            }
            ResizeSpec::Percentage { percent } => {
                if !percent.is_finite() || percent <= 0.0 {
                    return Err(PipelineError::invalid_dimension(
                        src_width as u64,
                        src_height as u64,
                        "percentage must be positive",
                    ));
                }
                let scale = |v: u32| ((v as f64 * percent / 100.0).floor() as u64).max(1);
                let (w, h) = (scale(src_width), scale(src_height));
                if w > max_dimension as u64 || h > max_dimension as u64 {
                    return Err(PipelineError::invalid_dimension(w, h, "exceeds maximum dimension"));
                }
                (w as u32, h as u32)
            }
        };

        if width > max_dimension || height > max_dimension {
            return Err(PipelineError::invalid_dimension(
                width as u64,
                height as u64,
                "exceeds maximum dimension",
            ));
        }
        Ok((width, height))
    }
}

/// Compute both dimensions from the one the user edited, keeping the aspect
/// ratio of a `src_width` x `src_height` image.
///
/// This is what a resize form does on every keystroke when the aspect lock is
/// on. The derived side is rounded and never drops below 1.
pub fn aspect_linked_dimensions(
    src_width: u32,
    src_height: u32,
    driver: AspectDriver,
    value: u32,
) -> (u32, u32) {
    if src_width == 0 || src_height == 0 {
        return (value, value);
    }
    let (sw, sh) = (src_width as f64, src_height as f64);
    match driver {
        AspectDriver::Width => {
            let derived = (value as f64 * sh / sw).round() as u32;
            (value, derived.max(1))
        }
        AspectDriver::Height => {
            let derived = (value as f64 * sw / sh).round() as u32;
            (derived.max(1), value)
        }
    }
}

/// Resize an image according to `spec`.
///
/// # Errors
///
/// - `SourceNotReady` if `image` is empty
/// - `InvalidDimension` if the target size is invalid (see
///   [`ResizeSpec::target_dimensions`])
pub fn resize(
    image: &PixelBuffer,
    spec: &ResizeSpec,
    filter: ResampleFilter,
    max_dimension: u32,
) -> Result<PixelBuffer> {
    if image.is_empty() {
        return Err(PipelineError::SourceNotReady);
    }
    let (width, height) = spec.target_dimensions(image.width, image.height, max_dimension)?;
    resize_exact(image, width, height, filter)
}

/// Resize an image to exact dimensions.
pub fn resize_exact(
    image: &PixelBuffer,
    width: u32,
    height: u32,
    filter: ResampleFilter,
) -> Result<PixelBuffer> {
    if image.is_empty() {
        return Err(PipelineError::SourceNotReady);
    }
    if width == 0 || height == 0 {
        return Err(PipelineError::invalid_dimension(
            width as u64,
            height as u64,
            "width and height must be positive",
        ));
    }

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgba = image.to_rgba_image().ok_or_else(|| {
        PipelineError::invalid_dimension(
            image.width as u64,
            image.height as u64,
            "pixel data does not match dimensions",
        )
    })?;

    log::debug!(
        "Resizing {}x{} -> {}x{} ({:?})",
        image.width,
        image.height,
        width,
        height,
        filter
    );
    let resized = image::imageops::resize(&rgba, width, height, filter.to_image_filter());
    Ok(PixelBuffer::from_rgba_image(resized))
}

/// Shrink an image so its longest edge is at most `max_edge`, keeping the
/// aspect ratio. Images that already fit are returned unchanged.
pub fn resize_to_fit(
    image: &PixelBuffer,
    max_edge: u32,
    filter: ResampleFilter,
) -> Result<PixelBuffer> {
    if max_edge == 0 {
        return Err(PipelineError::invalid_dimension(0, 0, "max edge must be positive"));
    }
    if image.width <= max_edge && image.height <= max_edge {
        return Ok(image.clone());
    }
    let (width, height) = calculate_fit_dimensions(image.width, image.height, max_edge);
    resize_exact(image, width, height, filter)
}

/// Calculate dimensions to fit within max_edge while preserving aspect ratio.
pub(crate) fn calculate_fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    if width >= height {
        aspect_linked_dimensions(width, height, AspectDriver::Width, max_edge)
    } else {
        aspect_linked_dimensions(width, height, AspectDriver::Height, max_edge)
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: a locked aspect ratio survives resize within one pixel.
        #[test]
        fn prop_keep_aspect_preserves_ratio(
            src_w in 1u32..=4000,
            src_h in 1u32..=4000,
            target in 1u32..=4000,
            by_height in any::<bool>(),
        ) {
            let driver = if by_height { AspectDriver::Height } else { AspectDriver::Width };
            let spec = ResizeSpec::keep_aspect(target, target, driver);
            let (w, h) = spec.target_dimensions(src_w, src_h, u32::MAX).unwrap();

            prop_assert!(w >= 1 && h >= 1);
            match driver {
                AspectDriver::Width => {
                    prop_assert_eq!(w, target);
                    let ideal = target as f64 * src_h as f64 / src_w as f64;
                    prop_assert!((h as f64 - ideal).abs() <= 1.0, "h={} ideal={}", h, ideal);
                }
                AspectDriver::Height => {
                    prop_assert_eq!(h, target);
                    let ideal = target as f64 * src_w as f64 / src_h as f64;
                    prop_assert!((w as f64 - ideal).abs() <= 1.0, "w={} ideal={}", w, ideal);
                }
            }
        }

        /// Property: resized buffers have exactly the resolved dimensions.
        #[test]
        fn prop_resize_output_matches_target(
            (src_w, src_h) in (1u32..=40, 1u32..=40),
            (dst_w, dst_h) in (1u32..=40, 1u32..=40),
        ) {
            let img = PixelBuffer::filled(src_w, src_h, [1, 2, 3, 255]);
            let out = resize(&img, &ResizeSpec::exact(dst_w, dst_h), ResampleFilter::Bilinear, 100).unwrap();
            prop_assert_eq!((out.width, out.height), (dst_w, dst_h));
            prop_assert_eq!(out.pixels.len(), (dst_w * dst_h * 4) as usize);
        }
    }
}
