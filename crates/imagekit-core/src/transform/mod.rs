//! Geometric operations: resize, quarter-turn rotation with flips, and crop.
//!
//! Every operation takes a [`PixelBuffer`](crate::decode::PixelBuffer) by
//! reference and returns a new one; inputs are never modified.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner, x grows right, y grows down
//! - Rotation is clockwise in quarter turns
//! - Crop rectangles are in source pixels of the buffer being cropped
//!
//! # Transform Order
//!
//! Within one [`TransformSpec`], flips are applied first and the rotation
//! second.

mod crop;
mod resize;
mod rotation;

pub use crop::{apply_crop, CropRect};
pub use resize::{
    aspect_linked_dimensions, resize, resize_exact, resize_to_fit, AspectDriver, ResampleFilter,
    ResizeSpec,
};
pub use rotation::{apply_transform, Rotation, TransformSpec};
