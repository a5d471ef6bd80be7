//! The image transform pipeline.
//!
//! [`ImageTransformPipeline`] binds a [`PipelineConfig`] to the free
//! functions in [`decode`](crate::decode), [`transform`](crate::transform)
//! and [`encode`](crate::encode). Each call takes explicit value objects,
//! runs to completion and returns a fresh buffer.

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::decode::{self, PixelBuffer, SourceImage};
use crate::encode::{self, EncodedOutputs, ExportSpec};
use crate::error::Result;
use crate::transform::{self, CropRect, ResizeSpec, TransformSpec};

/// Exactly one geometric operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Operation {
    Resize(ResizeSpec),
    Transform(TransformSpec),
    Crop(CropRect),
}

/// Final buffer of a [`ImageTransformPipeline::run`] plus its encodings.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    pub image: PixelBuffer,
    pub outputs: EncodedOutputs,
}

#[derive(Debug, Clone, Default)]
pub struct ImageTransformPipeline {
    config: PipelineConfig,
}

impl ImageTransformPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Decode encoded bytes; `mime_type` is the type reported by the file
    /// picker, if known.
    pub fn decode(&self, bytes: &[u8], mime_type: Option<&str>) -> Result<SourceImage> {
        decode::decode_image(bytes, mime_type, self.config.max_decoded_pixels)
    }

    pub fn resize(&self, image: &PixelBuffer, spec: &ResizeSpec) -> Result<PixelBuffer> {
        transform::resize(image, spec, self.config.resize_filter, self.config.max_dimension)
    }

    pub fn transform(&self, image: &PixelBuffer, spec: &TransformSpec) -> Result<PixelBuffer> {
        transform::apply_transform(image, spec)
    }

    pub fn crop(&self, image: &PixelBuffer, rect: &CropRect) -> Result<PixelBuffer> {
        transform::apply_crop(image, rect)
    }

    pub fn encode(&self, image: &PixelBuffer, spec: &ExportSpec) -> Result<EncodedOutputs> {
        encode::encode(image, spec, &self.config)
    }

    /// Apply a single operation.
    pub fn apply(&self, image: &PixelBuffer, operation: &Operation) -> Result<PixelBuffer> {
        match operation {
            Operation::Resize(spec) => self.resize(image, spec),
            Operation::Transform(spec) => self.transform(image, spec),
            Operation::Crop(rect) => self.crop(image, rect),
        }
    }

    /// Apply one operation, then encode the result.
    pub fn run(&self, image: &PixelBuffer, operation: &Operation, export: &ExportSpec) -> Result<PipelineResult> {
        let image = self.apply(image, operation)?;
        let outputs = self.encode(&image, export)?;
        Ok(PipelineResult { image, outputs })
    }
}
