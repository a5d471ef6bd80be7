//! Error taxonomy for the transform pipeline.
//!
//! Every operation reports failures synchronously through [`PipelineError`].
//! Nothing is retried: all inputs are local and in memory, so there is no
//! transient failure class.

use thiserror::Error;

/// Errors produced by decode, resize, transform, crop and encode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// A resize target resolved to a non-positive or oversized dimension.
    #[error("Invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimension {
        width: u64,
        height: u64,
        reason: &'static str,
    },

    /// The crop rectangle has no area or does not overlap the image.
    #[error(
        "Invalid crop region: {width}x{height} at ({x}, {y}) on a {image_width}x{image_height} image"
    )]
    InvalidCropRegion {
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        image_width: u32,
        image_height: u32,
    },

    /// An operation ran before a source image finished decoding.
    #[error("No image loaded")]
    SourceNotReady,

    /// The requested format has no encoder in this build.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The input bytes could not be decoded as an image.
    #[error("Failed to decode image: {0}")]
    DecodeFailure(String),

    /// The encoder for a supported format failed.
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        format: &'static str,
        message: String,
    },
}

impl PipelineError {
    pub(crate) fn invalid_dimension(width: u64, height: u64, reason: &'static str) -> Self {
        Self::InvalidDimension {
            width,
            height,
            reason,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
