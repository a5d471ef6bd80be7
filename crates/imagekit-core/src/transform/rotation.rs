//! Quarter-turn rotation and mirroring.
//!
//! A [`TransformSpec`] holds the cumulative state of the rotate and flip
//! buttons: a clockwise rotation that is always one of 0/90/180/270 degrees
//! and an independent flag per mirror axis.
//!
//! # Algorithm
//!
//! The transform is a pure pixel permutation computed by inverse mapping: for
//! each output pixel we find the single source pixel that lands there. The
//! flip is applied first (in source space), then the rotation about the
//! image centre. Because nothing is resampled, four quarter turns or two
//! flips on the same axis reproduce the input exactly.
//!
//! For a W x H source and output pixel `(dx, dy)`, the pre-rotation
//! coordinate is:
//! ```text
//!   0°: (dx,        dy)
//!  90°: (dy,        H - 1 - dx)
//! 180°: (W - 1 - dx, H - 1 - dy)
//! 270°: (W - 1 - dy, dx)
//! ```

use serde::{Deserialize, Serialize};

use crate::decode::{PixelBuffer, CHANNELS};
use crate::error::Result;

/// Clockwise rotation in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Normalize any angle into `[0, 360)` and snap it to the nearest
    /// quarter turn. Negative angles rotate counter-clockwise.
    pub fn from_degrees(degrees: i32) -> Self {
        let normalized = degrees.rem_euclid(360);
        match ((normalized + 45) / 90) % 4 {
            0 => Rotation::Deg0,
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            _ => Rotation::Deg270,
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Add `degrees` to this rotation.
    pub fn rotated_by(self, degrees: i32) -> Self {
        Rotation::from_degrees(self.degrees() + degrees)
    }

    /// 90° and 270° swap width and height.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

impl Serialize for Rotation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.degrees())
    }
}

impl<'de> Deserialize<'de> for Rotation {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        i32::deserialize(deserializer).map(Rotation::from_degrees)
    }
}

/// Cumulative rotate/flip state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransformSpec {
    /// Clockwise rotation applied after flipping.
    pub rotation: Rotation,
    /// Mirror left-right.
    pub flip_horizontal: bool,
    /// Mirror top-bottom.
    pub flip_vertical: bool,
}

impl TransformSpec {
    pub fn new(rotation_degrees: i32, flip_horizontal: bool, flip_vertical: bool) -> Self {
        Self {
            rotation: Rotation::from_degrees(rotation_degrees),
            flip_horizontal,
            flip_vertical,
        }
    }

    /// Add 90° clockwise to the running rotation.
    pub fn rotate_cw(self) -> Self {
        Self {
            rotation: self.rotation.rotated_by(90),
            ..self
        }
    }

    /// Subtract 90° from the running rotation.
    pub fn rotate_ccw(self) -> Self {
        Self {
            rotation: self.rotation.rotated_by(-90),
            ..self
        }
    }

    pub fn toggle_flip_horizontal(self) -> Self {
        Self {
            flip_horizontal: !self.flip_horizontal,
            ..self
        }
    }

    pub fn toggle_flip_vertical(self) -> Self {
        Self {
            flip_vertical: !self.flip_vertical,
            ..self
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Output size for a `width` x `height` input.
    pub fn output_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if self.rotation.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

/// Apply flips, then rotation, to an image.
///
/// # Errors
///
/// - `SourceNotReady` if `image` is empty
/// - `InvalidDimension` if the pixel data does not match the dimensions
pub fn apply_transform(image: &PixelBuffer, spec: &TransformSpec) -> Result<PixelBuffer> {
    image.validate()?;

    // Fast path: nothing to do
    if spec.is_identity() {
        return Ok(image.clone());
    }

    let (src_w, src_h) = (image.width, image.height);
    let (dst_w, dst_h) = spec.output_dimensions(src_w, src_h);
    let mut output = vec![0u8; dst_w as usize * dst_h as usize * CHANNELS];

    for dst_y in 0..dst_h {
        for dst_x in 0..dst_w {
            // Undo the rotation
            let (rx, ry) = match spec.rotation {
                Rotation::Deg0 => (dst_x, dst_y),
                Rotation::Deg90 => (dst_y, src_h - 1 - dst_x),
                Rotation::Deg180 => (src_w - 1 - dst_x, src_h - 1 - dst_y),
                Rotation::Deg270 => (src_w - 1 - dst_y, dst_x),
            };

            // Undo the flip
            let src_x = if spec.flip_horizontal { src_w - 1 - rx } else { rx };
            let src_y = if spec.flip_vertical { src_h - 1 - ry } else { ry };

            let src_idx = (src_y as usize * src_w as usize + src_x as usize) * CHANNELS;
            let dst_idx = (dst_y as usize * dst_w as usize + dst_x as usize) * CHANNELS;
            output[dst_idx..dst_idx + CHANNELS]
                .copy_from_slice(&image.pixels[src_idx..src_idx + CHANNELS]);
        }
    }

    log::debug!(
        "Transformed {}x{} -> {}x{} (rotation {}°, flip h={} v={})",
        src_w,
        src_h,
        dst_w,
        dst_h,
        spec.rotation.degrees(),
        spec.flip_horizontal,
        spec.flip_vertical
    );

    Ok(PixelBuffer::new(dst_w, dst_h, output))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
