//! Export encoding.
//!
//! This module provides functionality for:
//! - Encoding a [`PixelBuffer`] to PNG, JPEG or WebP
//! - Multi-format export, where every format is encoded independently from
//!   the same buffer
//!
//! # Quality
//!
//! Quality is a percentage. Values below the configured floor are raised to
//! it before they reach a lossy encoder; PNG ignores quality entirely.
//!
//! # Examples
//!
//! ```ignore
//! use imagekit_core::encode::{encode, ExportFormat, ExportSpec};
//!
//! let spec = ExportSpec::multi(ExportFormat::ALL, 75);
//! let outputs = encode(&buffer, &spec, &PipelineConfig::default())?;
//! for image in outputs.iter() {
//!     println!("{}: {} bytes", image.format, image.len());
//! }
//! ```

mod codecs;
mod format;

pub use codecs::encode_format;
pub(crate) use codecs::encode_ico;
pub use format::{EncodedImage, EncodedOutputs, ExportFormat, ExportSpec, SkippedFormat};

use crate::config::PipelineConfig;
use crate::decode::PixelBuffer;
use crate::error::{PipelineError, Result};

/// Encode `buffer` in every format of `spec`.
///
/// A format that is not compiled in is recorded in
/// [`EncodedOutputs::skipped`] and the rest still encode.
///
/// # Errors
///
/// Fails outright only for problems that would affect every format: an
/// empty buffer (`SourceNotReady`), or an encoder failure other than
/// `UnsupportedFormat`.
pub fn encode(buffer: &PixelBuffer, spec: &ExportSpec, config: &PipelineConfig) -> Result<EncodedOutputs> {
    encode_each(buffer, spec, config, encode_format)
}

fn encode_each<F>(
    buffer: &PixelBuffer,
    spec: &ExportSpec,
    config: &PipelineConfig,
    encode_one: F,
) -> Result<EncodedOutputs>
where
    F: Fn(&PixelBuffer, ExportFormat, u8) -> Result<EncodedImage>,
{
    if buffer.is_empty() {
        return Err(PipelineError::SourceNotReady);
    }

    let quality = config.effective_quality(spec.quality);
    let mut result = EncodedOutputs::default();

    for &format in &spec.formats {
        match encode_one(buffer, format, quality) {
            Ok(image) => {
                result.outputs.insert(format, image);
            }
            Err(error @ PipelineError::UnsupportedFormat(_)) => {
                log::warn!("Skipping {format} export: {error}");
                result.skipped.push(SkippedFormat { format, error });
            }
            Err(e) => return Err(e),
        }
    }

    log::info!(
        "Exported {}x{} to {} format(s), {} skipped",
        buffer.width,
        buffer.height,
        result.outputs.len(),
        result.skipped.len()
    );

    Ok(result)
}
