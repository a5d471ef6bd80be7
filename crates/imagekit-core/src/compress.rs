//! Size-targeted compression.
//!
//! Shrinks an image to fit a maximum edge length, then encodes it, lowering
//! the lossy quality step by step until the output fits a byte budget or the
//! quality floor is reached.

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::decode::SourceImage;
use crate::encode::{encode_format, EncodedImage, ExportFormat};
use crate::error::{PipelineError, Result};
use crate::transform::resize_to_fit;

/// One mebibyte, the default byte budget.
pub const DEFAULT_MAX_BYTES: usize = 1024 * 1024;

/// Default longest edge after compression.
pub const DEFAULT_MAX_EDGE: u32 = 1920;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompressOptions {
    pub format: ExportFormat,
    /// Starting quality, 0-100.
    pub quality: u8,
    /// Longest edge of the output; larger images are scaled down, smaller
    /// ones are left alone.
    pub max_edge: u32,
    /// Target size in bytes, or `None` to encode once at `quality`.
    pub max_bytes: Option<usize>,
    /// How much quality drops per retry.
    pub quality_step: u8,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Jpeg,
            quality: 80,
            max_edge: DEFAULT_MAX_EDGE,
            max_bytes: Some(DEFAULT_MAX_BYTES),
            quality_step: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionStats {
    /// Size of the encoded input (0 when the source was not decoded from bytes).
    pub original_bytes: usize,
    pub compressed_bytes: usize,
    pub width: u32,
    pub height: u32,
    /// Quality of the final encode.
    pub quality: u8,
    /// Number of encodes performed.
    pub attempts: u32,
}

impl CompressionStats {
    /// compressed / original, or 0.0 when the original size is unknown.
    pub fn ratio(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        self.compressed_bytes as f64 / self.original_bytes as f64
    }

    /// Percentage of bytes saved; negative if the output grew.
    pub fn saved_percent(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        (1.0 - self.ratio()) * 100.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompressionResult {
    pub image: EncodedImage,
    pub stats: CompressionStats,
}

/// Compress `source` according to `options`.
///
/// The byte budget is best effort: if the output is still too large at the
/// quality floor, that last encode is returned. Lossless formats are encoded
/// once.
///
/// # Errors
///
/// - `SourceNotReady` for an empty source
/// - `InvalidDimension` if `max_edge` is 0
/// - any encoder error for the requested format
pub fn compress(
    source: &SourceImage,
    options: &CompressOptions,
    config: &PipelineConfig,
) -> Result<CompressionResult> {
    let image = source.image();
    if image.is_empty() {
        return Err(PipelineError::SourceNotReady);
    }

    let fitted = resize_to_fit(image, options.max_edge, config.resize_filter)?;
    let floor = config.effective_quality(0);
    let step = options.quality_step.max(1);
    let mut quality = config.effective_quality(options.quality);
    let mut attempts = 0;

    let encoded = loop {
        let encoded = encode_format(&fitted, options.format, quality)?;
        attempts += 1;

        let within_budget = options.max_bytes.map_or(true, |max| encoded.len() <= max);
        if within_budget || !options.format.is_lossy() || quality <= floor {
            break encoded;
        }

        log::debug!(
            "{} bytes at quality {} exceeds budget, retrying",
            encoded.len(),
            quality
        );
        quality = quality.saturating_sub(step).max(floor);
    };

    let stats = CompressionStats {
        original_bytes: source.metadata().byte_len,
        compressed_bytes: encoded.len(),
        width: encoded.width,
        height: encoded.height,
        quality,
        attempts,
    };

    log::info!(
        "Compressed to {}x{} {} at quality {}: {} -> {} bytes",
        stats.width,
        stats.height,
        options.format,
        stats.quality,
        stats.original_bytes,
        stats.compressed_bytes
    );

    Ok(CompressionResult {
        image: encoded,
        stats,
    })
}
