//! The pixel buffer handed across the JS boundary, plus small conversions
//! shared by the binding modules.

use imagekit_core::{PipelineError, PixelBuffer, ResampleFilter};
use wasm_bindgen::prelude::*;

/// An RGBA raster owned by WASM memory.
///
/// Same layout as a canvas `ImageData` (4 bytes per pixel, rows top to
/// bottom), so `new JsPixelBuffer(data.width, data.height, data.data)` and
/// `new ImageData(new Uint8ClampedArray(buf.pixels()), buf.width)` both work.
#[wasm_bindgen]
pub struct JsPixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsPixelBuffer {
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsPixelBuffer {
        JsPixelBuffer {
            width,
            height,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Length of the pixel data in bytes.
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Copy of the RGBA data as a `Uint8Array`.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }
}

impl JsPixelBuffer {
    pub(crate) fn from_buffer(img: PixelBuffer) -> Self {
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }

    /// Copy into a core buffer, rejecting data whose length is not
    /// `width * height * 4`.
    pub(crate) fn to_buffer(&self) -> Result<PixelBuffer, PipelineError> {
        let buffer = PixelBuffer {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
        };
        buffer.validate()?;
        Ok(buffer)
    }
}

/// Convert a u8 filter value to the core ResampleFilter.
///
/// Values:
/// - 0 = Bilinear (fastest)
/// - 1 = CatmullRom
/// - 2 = Lanczos3 (best quality, slowest)
///
/// Any other value defaults to Lanczos3.
pub(crate) fn filter_from_u8(value: u8) -> ResampleFilter {
    match value {
        0 => ResampleFilter::Bilinear,
        1 => ResampleFilter::CatmullRom,
        _ => ResampleFilter::Lanczos3,
    }
}

/// Map a core error onto the string `JsValue` thrown to JavaScript.
pub(crate) fn js_error(err: PipelineError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
