//! Pipeline configuration.
//!
//! All tunable policy lives in [`PipelineConfig`] and is passed explicitly to
//! the pipeline. There is no global quality or format state: per-call values
//! such as export quality travel in their own spec objects, and the config
//! only supplies defaults and limits.

use serde::{Deserialize, Serialize};

use crate::encode::{ExportFormat, ExportSpec};
use crate::transform::ResampleFilter;

/// Limits and defaults for a pipeline instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Interpolation filter used by resize.
    pub resize_filter: ResampleFilter,
    /// Largest width or height any operation may produce.
    pub max_dimension: u32,
    /// Decoded images above this pixel count are rejected before decoding.
    pub max_decoded_pixels: u64,
    /// Minimum effective lossy quality (percent). Lower requests are raised
    /// to this floor so encoders never emit degenerate output.
    pub quality_floor: u8,
    /// Quality used when the caller does not pick one.
    pub default_quality: u8,
    /// Format used when the caller does not pick one.
    pub default_format: ExportFormat,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resize_filter: ResampleFilter::Lanczos3,
            max_dimension: 16_384,
            max_decoded_pixels: 100_000_000,
            quality_floor: 10,
            default_quality: 80,
            default_format: ExportFormat::WebP,
        }
    }
}

impl PipelineConfig {
    /// Clamp a requested quality to `[quality_floor, 100]`.
    pub fn effective_quality(&self, quality: u8) -> u8 {
        let floor = self.quality_floor.clamp(1, 100);
        quality.clamp(floor, 100)
    }

    /// Export request with the configured fallbacks filled in.
    ///
    /// An empty format list becomes `default_format`, and a missing quality
    /// becomes `default_quality`.
    pub fn export_spec(
        &self,
        formats: impl IntoIterator<Item = ExportFormat>,
        quality: Option<u8>,
    ) -> ExportSpec {
        let mut spec = ExportSpec::multi(formats, quality.unwrap_or(self.default_quality));
        if spec.formats.is_empty() {
            spec.formats.push(self.default_format);
        }
        spec
    }
}
