//! Image decoding WASM bindings.
//!
//! # Functions
//!
//! - [`decode_image`] - Decode PNG, JPEG or WebP bytes to RGBA
//! - [`image_orientation`] - Read the EXIF orientation without decoding
//!
//! # Example
//!
//! ```typescript
//! import { decode_image } from '@imagekit/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image(bytes, file.type);
//! console.log(`Decoded ${image.width}x${image.height}`);
//! ```

use crate::types::{js_error, JsPixelBuffer};
use imagekit_core::{decode, PipelineConfig};
use wasm_bindgen::prelude::*;

/// Decode an image file's bytes.
///
/// EXIF orientation is applied, so the result is upright.
///
/// # Arguments
///
/// * `bytes` - The file contents as a `Uint8Array`
/// * `mime_type` - `File.type` from the picker; pass `undefined` to sniff the
///   format from the bytes
///
/// # Errors
///
/// Throws if the MIME type is not `image/*` or the bytes cannot be decoded.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8], mime_type: Option<String>) -> Result<JsPixelBuffer, JsValue> {
    let max_pixels = PipelineConfig::default().max_decoded_pixels;
    decode::decode_image(bytes, mime_type.as_deref(), max_pixels)
        .map(|source| JsPixelBuffer::from_buffer(source.into_image()))
        .map_err(js_error)
}

/// EXIF orientation (1-8) of an encoded image; 1 when absent.
#[wasm_bindgen]
pub fn image_orientation(bytes: &[u8]) -> u8 {
    decode::get_orientation(bytes) as u8
}
