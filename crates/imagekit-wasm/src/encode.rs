//! Image encoding WASM bindings.
//!
//! # Functions
//!
//! - [`encode_image`] - Encode to several formats at once
//! - [`encode_data_uri`] - Encode to one format as a `data:` URI
//!
//! # Example
//!
//! ```typescript
//! import { encode_image } from '@imagekit/wasm';
//!
//! const outputs = encode_image(image, ['png', 'jpeg', 'webp'], 80);
//! const fallback = encode_image(image, []); // WebP at quality 80
//! const jpeg: Uint8Array = outputs.get('jpeg');
//! ```

use crate::types::{js_error, JsPixelBuffer};
use imagekit_core::encode::{self, EncodedOutputs, ExportFormat, ExportSpec};
use imagekit_core::PipelineConfig;
use js_sys::{Map, Uint8Array};
use wasm_bindgen::prelude::*;

/// Encode `image` in each of `formats` at `quality` (0-100, ignored for PNG).
///
/// Returns a `Map` from format name (`"png"`, `"jpeg"`, `"webp"`) to
/// `Uint8Array`. Unknown or unavailable formats are left out of the map and
/// logged to the console; the remaining formats are still encoded. An empty
/// `formats` array exports WebP, and an omitted `quality` means 80.
///
/// In the browser build WebP is lossless, so `quality` does not affect it.
#[wasm_bindgen]
pub fn encode_image(
    image: &JsPixelBuffer,
    formats: Vec<String>,
    quality: Option<u8>,
) -> Result<Map, JsValue> {
    let config = PipelineConfig::default();
    let src = image.to_buffer().map_err(js_error)?;
    let spec = export_spec(&config, &formats, quality);
    let outputs = encode::encode(&src, &spec, &config).map_err(js_error)?;
    Ok(outputs_to_map(&outputs))
}

/// Encode `image` in a single format and return a `data:` URI.
#[wasm_bindgen]
pub fn encode_data_uri(image: &JsPixelBuffer, format: &str, quality: Option<u8>) -> Result<String, JsValue> {
    let config = PipelineConfig::default();
    let format: ExportFormat = format.parse().map_err(js_error)?;
    let src = image.to_buffer().map_err(js_error)?;
    let quality = config.effective_quality(quality.unwrap_or(config.default_quality));
    encode::encode_format(&src, format, quality)
        .map(|encoded| encoded.to_data_uri())
        .map_err(js_error)
}

/// Parse format names, dropping (and logging) the ones that are not known.
pub(crate) fn parse_formats(names: &[String]) -> Vec<ExportFormat> {
    names
        .iter()
        .filter_map(|name| match name.parse::<ExportFormat>() {
            Ok(format) => Some(format),
            Err(e) => {
                log::warn!("Skipping export: {e}");
                None
            }
        })
        .collect()
}

/// Build the export request from JS arguments.
///
/// Only an empty name list falls back to the default format; names that are
/// all unknown export nothing.
pub(crate) fn export_spec(config: &PipelineConfig, names: &[String], quality: Option<u8>) -> ExportSpec {
    if names.is_empty() {
        return config.export_spec([], quality);
    }
    ExportSpec::multi(
        parse_formats(names),
        quality.unwrap_or(config.default_quality),
    )
}

pub(crate) fn outputs_to_map(outputs: &EncodedOutputs) -> Map {
    let map = Map::new();
    for encoded in outputs.iter() {
        map.set(
            &JsValue::from_str(encoded.format.name()),
            &Uint8Array::from(encoded.bytes.as_slice()).into(),
        );
    }
    map
}
