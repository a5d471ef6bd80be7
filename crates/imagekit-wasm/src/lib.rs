//! imagekit WASM - WebAssembly bindings for imagekit
//!
//! This crate provides WASM bindings to expose the imagekit-core functionality
//! to JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - Image decoding bindings (PNG, JPEG, WebP with EXIF orientation)
//! - `transform` - Resize, rotate/flip and crop bindings
//! - `encode` - Multi-format export bindings
//! - `compress` - Size-targeted compression
//! - `favicon` - Favicon and Apple touch icon generation
//! - `session` - Chained editing session with superseding loads
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_image, transform_image, encode_image } from '@imagekit/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image(bytes, file.type);
//! const rotated = transform_image(image, 90, false, false);
//! const outputs = encode_image(rotated, ['png', 'webp'], 80);
//! ```

use wasm_bindgen::prelude::*;

mod compress;
mod decode;
mod encode;
mod favicon;
mod logger;
mod session;
mod transform;
mod types;

// Re-export public types
pub use compress::{compress_image, JsCompressionResult};
pub use decode::{decode_image, image_orientation};
pub use encode::{encode_data_uri, encode_image};
pub use favicon::generate_favicons;
pub use session::{JsEditSession, JsLoadTicket};
pub use transform::{
    crop_image, crop_image_from_display, linked_dimensions, resize_image,
    resize_image_by_percentage, transform_image,
};
pub use types::JsPixelBuffer;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logger::install(log::LevelFilter::Info);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
