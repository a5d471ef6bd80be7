//! Export formats and the encoded artifacts they produce.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Output container for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg,
    #[serde(rename = "webp")]
    WebP,
}

impl ExportFormat {
    /// All formats, in export order.
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Png, ExportFormat::Jpeg, ExportFormat::WebP];

    /// Map a detected input format onto an export format, if there is one.
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(ExportFormat::Png),
            ImageFormat::Jpeg => Some(ExportFormat::Jpeg),
            ImageFormat::WebP => Some(ExportFormat::WebP),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::WebP => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::WebP => "image/webp",
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::WebP => "webp",
        }
    }

    /// Whether the quality parameter has any effect.
    pub fn is_lossy(self) -> bool {
        match self {
            ExportFormat::Png => false,
            ExportFormat::Jpeg => true,
            ExportFormat::WebP => cfg!(feature = "lossy-webp"),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportFormat {
    type Err = PipelineError;

    /// Accepts format names, `jpg`, and `image/*` MIME types, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let name = lower.strip_prefix("image/").unwrap_or(&lower);
        match name {
            "png" => Ok(ExportFormat::Png),
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg),
            "webp" => Ok(ExportFormat::WebP),
            _ => Err(PipelineError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// What to encode and at which quality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSpec {
    /// Requested formats, in order, without duplicates.
    pub formats: Vec<ExportFormat>,
    /// Lossy quality 0-100; ignored for PNG.
    pub quality: u8,
}

impl ExportSpec {
    pub fn single(format: ExportFormat, quality: u8) -> Self {
        Self {
            formats: vec![format],
            quality,
        }
    }

    /// Several formats from the same buffer. Repeats are dropped, first
    /// occurrence wins.
    pub fn multi(formats: impl IntoIterator<Item = ExportFormat>, quality: u8) -> Self {
        let mut unique = Vec::new();
        for format in formats {
            if !unique.contains(&format) {
                unique.push(format);
            }
        }
        Self {
            formats: unique,
            quality,
        }
    }
}

/// One encoded artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub format: ExportFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Download name, e.g. `compressed-image.jpg`.
    pub fn file_name(&self, stem: &str) -> String {
        format!("{stem}.{}", self.format.extension())
    }

    /// `data:` URI with the bytes base64-encoded.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(&self.bytes))
    }
}

/// A format that was requested but could not be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFormat {
    pub format: ExportFormat,
    pub error: PipelineError,
}

/// Result of a multi-format export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedOutputs {
    pub outputs: BTreeMap<ExportFormat, EncodedImage>,
    pub skipped: Vec<SkippedFormat>,
}

impl EncodedOutputs {
    pub fn get(&self, format: ExportFormat) -> Option<&EncodedImage> {
        self.outputs.get(&format)
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EncodedImage> {
        self.outputs.values()
    }
}
