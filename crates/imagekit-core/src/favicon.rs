//! Favicon and Apple touch icon generation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::decode::PixelBuffer;
use crate::encode::{encode_format, encode_ico, ExportFormat};
use crate::error::{PipelineError, Result};
use crate::transform::{resize_exact, ResampleFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconKind {
    /// Browser tab icon, written as ICO.
    Favicon,
    /// iOS home screen icon, written as PNG.
    AppleTouch,
}

impl IconKind {
    pub fn name(self) -> &'static str {
        match self {
            IconKind::Favicon => "favicon",
            IconKind::AppleTouch => "apple-touch",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            IconKind::Favicon => "ico",
            IconKind::AppleTouch => "png",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            IconKind::Favicon => "image/x-icon",
            IconKind::AppleTouch => "image/png",
        }
    }
}

impl fmt::Display for IconKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A square icon size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IconSize {
    pub kind: IconKind,
    pub size: u32,
}

impl IconSize {
    pub const fn new(kind: IconKind, size: u32) -> Self {
        Self { kind, size }
    }

    /// Favicons at 16, 32 and 64 px; touch icons at 57, 72, 114 and 144 px.
    pub fn standard_set() -> Vec<IconSize> {
        let favicons = [16, 32, 64].map(|s| IconSize::new(IconKind::Favicon, s));
        let touch = [57, 72, 114, 144].map(|s| IconSize::new(IconKind::AppleTouch, s));
        favicons.into_iter().chain(touch).collect()
    }

    /// e.g. `favicon-32x32.ico`
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}x{}.{}",
            self.kind,
            self.size,
            self.size,
            self.kind.extension()
        )
    }

    /// e.g. `Apple Touch 57x57`
    pub fn label(&self) -> String {
        let kind = match self.kind {
            IconKind::Favicon => "Favicon",
            IconKind::AppleTouch => "Apple Touch",
        };
        format!("{kind} {}x{}", self.size, self.size)
    }
}

/// An encoded icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Favicon {
    pub size: IconSize,
    pub bytes: Vec<u8>,
}

impl Favicon {
    pub fn file_name(&self) -> String {
        self.size.file_name()
    }

    pub fn mime_type(&self) -> &'static str {
        self.size.kind.mime_type()
    }
}

/// Icons that were produced, plus the ones that could not be.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaviconSet {
    pub icons: Vec<Favicon>,
    pub skipped: Vec<(IconSize, PipelineError)>,
}

/// Render `source` at every size in `sizes`.
///
/// The source is stretched to a square, so non-square inputs are distorted;
/// crop first to avoid that. An icon whose codec is not compiled in lands in
/// [`FaviconSet::skipped`].
///
/// # Errors
///
/// - `SourceNotReady` for an empty source
/// - `InvalidDimension` for a zero size, or an ICO above 256 px
pub fn generate_favicons(
    source: &PixelBuffer,
    sizes: &[IconSize],
    filter: ResampleFilter,
) -> Result<FaviconSet> {
    if source.is_empty() {
        return Err(PipelineError::SourceNotReady);
    }

    let mut set = FaviconSet::default();
    for &size in sizes {
        if size.kind == IconKind::Favicon && size.size > 256 {
            return Err(PipelineError::invalid_dimension(
                size.size as u64,
                size.size as u64,
                "ICO images are limited to 256 pixels",
            ));
        }

        let scaled = resize_exact(source, size.size, size.size, filter)?;
        let encoded = match size.kind {
            IconKind::Favicon => encode_ico(&scaled),
            IconKind::AppleTouch => encode_format(&scaled, ExportFormat::Png, 100).map(|e| e.bytes),
        };

        match encoded {
            Ok(bytes) => set.icons.push(Favicon { size, bytes }),
            Err(error @ PipelineError::UnsupportedFormat(_)) => {
                log::warn!("Skipping {}: {error}", size.file_name());
                set.skipped.push((size, error));
            }
            Err(e) => return Err(e),
        }
    }

    log::info!("Generated {} icon(s)", set.icons.len());
    Ok(set)
}
