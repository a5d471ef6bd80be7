//! WASM bindings for size-targeted compression.

use crate::types::js_error;
use imagekit_core::compress::{self, CompressOptions, CompressionResult};
use imagekit_core::{decode, PipelineConfig};
use wasm_bindgen::prelude::*;

/// Output of [`compress_image`].
#[wasm_bindgen]
pub struct JsCompressionResult {
    inner: CompressionResult,
}

#[wasm_bindgen]
impl JsCompressionResult {
    /// Encoded bytes as a `Uint8Array` (copied).
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.image.bytes.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        self.inner.image.mime_type().to_string()
    }

    /// `compressed-image.<ext>`
    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        self.inner.image.file_name("compressed-image")
    }

    pub fn data_uri(&self) -> String {
        self.inner.image.to_data_uri()
    }

    /// `{ originalBytes, compressedBytes, width, height, quality, attempts }`
    pub fn stats(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.stats)
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize stats: {}", e)))
    }

    /// Bytes saved relative to the input, in percent.
    #[wasm_bindgen(getter)]
    pub fn saved_percent(&self) -> f64 {
        self.inner.stats.saved_percent()
    }
}

/// Decode an uploaded file and compress it.
///
/// # Arguments
///
/// * `bytes` - The file contents
/// * `mime_type` - `File.type`, or `undefined`
/// * `options` - Optional `{ format, quality, maxEdge, maxBytes, qualityStep }`;
///   missing fields use the defaults (JPEG, 80, 1920 px, 1 MiB, 10)
///
/// # Example (TypeScript)
///
/// ```typescript
/// const result = compress_image(bytes, file.type, { format: 'webp', quality: 70 });
/// console.log(result.stats());
/// ```
#[wasm_bindgen]
pub fn compress_image(
    bytes: &[u8],
    mime_type: Option<String>,
    options: JsValue,
) -> Result<JsCompressionResult, JsValue> {
    let options: CompressOptions = if options.is_undefined() || options.is_null() {
        CompressOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options)
            .map_err(|e| JsValue::from_str(&format!("Invalid compress options: {}", e)))?
    };
    compress_bytes(bytes, mime_type.as_deref(), &options)
}

fn compress_bytes(
    bytes: &[u8],
    mime_type: Option<&str>,
    options: &CompressOptions,
) -> Result<JsCompressionResult, JsValue> {
    let config = PipelineConfig::default();
    let source = decode::decode_image(bytes, mime_type, config.max_decoded_pixels).map_err(js_error)?;
    compress::compress(&source, options, &config)
        .map(|inner| JsCompressionResult { inner })
        .map_err(js_error)
}
