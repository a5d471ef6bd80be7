//! Image cropping in source-pixel coordinates.
//!
//! A [`CropRect`] is always expressed against the image's own pixel grid.
//! Crop widgets usually report either percentages or CSS pixels of a scaled
//! `<img>`; [`CropRect::from_normalized`] and [`CropRect::scaled_from_display`]
//! convert those on the caller's side before [`apply_crop`] runs.
//!
//! # Bounds policy
//!
//! Rectangles that stick out of the image are clamped to their intersection
//! with it. A rectangle with no area, or one that misses the image entirely,
//! fails with `InvalidCropRegion`.

use serde::{Deserialize, Serialize};

use crate::decode::{PixelBuffer, CHANNELS};
use crate::error::{PipelineError, Result};

/// Crop rectangle in source-pixel coordinates (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CropRect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl CropRect {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole of a `width` x `height` image.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i64, height as i64)
    }

    /// Convert a rectangle given as fractions (0.0 to 1.0) of the image.
    ///
    /// Crop widgets working in `%` units report this form; divide by 100
    /// first.
    pub fn from_normalized(
        left: f64,
        top: f64,
        width: f64,
        height: f64,
        image_width: u32,
        image_height: u32,
    ) -> Self {
        let (w, h) = (image_width as f64, image_height as f64);
        Self::new(
            (left * w).round() as i64,
            (top * h).round() as i64,
            (width * w).round() as i64,
            (height * h).round() as i64,
        )
    }

    /// Convert a rectangle measured on a CSS-scaled rendering of the image.
    ///
    /// Each axis is scaled by `natural / display`. A zero display size
    /// yields an empty rectangle, which `apply_crop` rejects.
    pub fn scaled_from_display(
        display_rect: (f64, f64, f64, f64),
        display_size: (f64, f64),
        natural_size: (u32, u32),
    ) -> Self {
        let (dx, dy, dw, dh) = display_rect;
        let (disp_w, disp_h) = display_size;
        if disp_w <= 0.0 || disp_h <= 0.0 {
            return Self::default();
        }
        let scale_x = natural_size.0 as f64 / disp_w;
        let scale_y = natural_size.1 as f64 / disp_h;
        Self::new(
            (dx * scale_x).round() as i64,
            (dy * scale_y).round() as i64,
            (dw * scale_x).round() as i64,
            (dh * scale_y).round() as i64,
        )
    }

    /// Clamp to the intersection with a `width` x `height` image.
    ///
    /// Returns `(x, y, width, height)` in unsigned pixels, or
    /// `InvalidCropRegion` if nothing is left.
    pub fn clamp_to(&self, width: u32, height: u32) -> Result<(u32, u32, u32, u32)> {
        let invalid = || PipelineError::InvalidCropRegion {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            image_width: width,
            image_height: height,
        };

        if self.width <= 0 || self.height <= 0 {
            return Err(invalid());
        }

        let left = self.x.max(0);
        let top = self.y.max(0);
        let right = self.x.saturating_add(self.width).min(width as i64);
        let bottom = self.y.saturating_add(self.height).min(height as i64);

        if right <= left || bottom <= top {
            return Err(invalid());
        }

        Ok((
            left as u32,
            top as u32,
            (right - left) as u32,
            (bottom - top) as u32,
        ))
    }
}

/// Crop an image to `rect`, clamped to the image bounds.
///
/// Pixels are copied verbatim (no resampling).
///
/// # Errors
///
/// - `SourceNotReady` if `image` is empty
/// - `InvalidDimension` if the pixel data does not match the dimensions
/// - `InvalidCropRegion` if the rectangle has no area or misses the image
///
/// # Example
///
/// ```ignore
/// let cropped = apply_crop(&image, &CropRect::new(0, 0, 300, 300))?;
/// assert_eq!((cropped.width, cropped.height), (300, 300));
/// ```
pub fn apply_crop(image: &PixelBuffer, rect: &CropRect) -> Result<PixelBuffer> {
    image.validate()?;

    let (left, top, out_width, out_height) = rect.clamp_to(image.width, image.height)?;

    // Fast path: full crop returns a clone
    if out_width == image.width && out_height == image.height {
        return Ok(image.clone());
    }

    let row_bytes = out_width as usize * CHANNELS;
    let col_offset = left as usize * CHANNELS;
    let mut output = Vec::with_capacity(row_bytes * out_height as usize);

    // Copy pixel data row by row
    for y in top..top + out_height {
        let row = image.row(y);
        output.extend_from_slice(&row[col_offset..col_offset + row_bytes]);
    }

    log::debug!(
        "Cropped {}x{} at ({}, {}) from {}x{}",
        out_width,
        out_height,
        left,
        top,
        image.width,
        image.height
    );

    Ok(PixelBuffer::new(out_width, out_height, output))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
