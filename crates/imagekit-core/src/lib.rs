//! imagekit Core - raster image transform library
//!
//! This crate provides the image processing behind imagekit's tools:
//! decoding uploads, resizing, quarter-turn rotation and mirroring,
//! cropping, multi-format export, size-targeted compression and favicon
//! generation.
//!
//! Every operation takes a [`PixelBuffer`] by reference and returns a new
//! one. [`ImageTransformPipeline`] bundles the operations with a
//! [`PipelineConfig`]; [`EditSession`] adds the chained editing state an
//! editor UI needs.

pub mod compress;
pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod favicon;
pub mod pipeline;
pub mod session;
pub mod transform;

pub use compress::{compress, CompressOptions, CompressionResult, CompressionStats};
pub use config::PipelineConfig;
pub use decode::{decode_image, ImageMetadata, Orientation, PixelBuffer, SourceImage};
pub use encode::{encode, EncodedImage, EncodedOutputs, ExportFormat, ExportSpec, SkippedFormat};
pub use error::{PipelineError, Result};
pub use favicon::{generate_favicons, Favicon, FaviconSet, IconKind, IconSize};
pub use pipeline::{ImageTransformPipeline, Operation, PipelineResult};
pub use session::{EditSession, LoadOutcome, LoadTicket, SessionState};
pub use transform::{
    apply_crop, apply_transform, resize, AspectDriver, CropRect, ResampleFilter, ResizeSpec,
    Rotation, TransformSpec,
};
