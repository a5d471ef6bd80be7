//! WASM bindings for resize, rotate/flip and crop.
//!
//! Every function returns a new `JsPixelBuffer`; the input is left untouched.

use crate::types::{filter_from_u8, js_error, JsPixelBuffer};
use imagekit_core::transform::{self, AspectDriver, CropRect, ResizeSpec, TransformSpec};
use imagekit_core::PipelineConfig;
use wasm_bindgen::prelude::*;

/// Resize to explicit dimensions.
///
/// # Arguments
///
/// * `image` - Source image
/// * `width`, `height` - Target size
/// * `maintain_aspect_ratio` - Derive the other side from the source aspect
///   ratio, driven by whichever side `driver_is_height` names
/// * `driver_is_height` - `true` if the user last edited the height field
/// * `filter` - 0 = Bilinear, 1 = CatmullRom, 2 = Lanczos3
///
/// # Example (TypeScript)
///
/// ```typescript
/// // 800x600 source, width 400 with the aspect lock on -> 400x300
/// const resized = resize_image(image, 400, 0, true, false, 2);
/// ```
#[wasm_bindgen]
pub fn resize_image(
    image: &JsPixelBuffer,
    width: u32,
    height: u32,
    maintain_aspect_ratio: bool,
    driver_is_height: bool,
    filter: u8,
) -> Result<JsPixelBuffer, JsValue> {
    let driver = if driver_is_height {
        AspectDriver::Height
    } else {
        AspectDriver::Width
    };
    let spec = ResizeSpec::Dimensions {
        width,
        height,
        maintain_aspect_ratio,
        driver,
    };
    apply_resize(image, &spec, filter)
}

/// Scale both sides by `percent` (e.g. 50 halves the image).
#[wasm_bindgen]
pub fn resize_image_by_percentage(
    image: &JsPixelBuffer,
    percent: f64,
    filter: u8,
) -> Result<JsPixelBuffer, JsValue> {
    apply_resize(image, &ResizeSpec::percentage(percent), filter)
}

fn apply_resize(image: &JsPixelBuffer, spec: &ResizeSpec, filter: u8) -> Result<JsPixelBuffer, JsValue> {
    let max_dimension = PipelineConfig::default().max_dimension;
    let src = image.to_buffer().map_err(js_error)?;
    transform::resize(&src, spec, filter_from_u8(filter), max_dimension)
        .map(JsPixelBuffer::from_buffer)
        .map_err(js_error)
}

/// Both dimensions for a resize form with the aspect lock on.
///
/// Returns `[width, height]`.
#[wasm_bindgen]
pub fn linked_dimensions(src_width: u32, src_height: u32, value: u32, driver_is_height: bool) -> Vec<u32> {
    let driver = if driver_is_height {
        AspectDriver::Height
    } else {
        AspectDriver::Width
    };
    let (w, h) = transform::aspect_linked_dimensions(src_width, src_height, driver, value);
    vec![w, h]
}

/// Rotate clockwise by `rotation_degrees` (snapped to quarter turns) after
/// applying the requested flips.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const rotated = transform_image(image, 90, false, false);
/// const mirrored = transform_image(image, 0, true, false);
/// ```
#[wasm_bindgen]
pub fn transform_image(
    image: &JsPixelBuffer,
    rotation_degrees: i32,
    flip_horizontal: bool,
    flip_vertical: bool,
) -> Result<JsPixelBuffer, JsValue> {
    let spec = TransformSpec::new(rotation_degrees, flip_horizontal, flip_vertical);
    let src = image.to_buffer().map_err(js_error)?;
    transform::apply_transform(&src, &spec)
        .map(JsPixelBuffer::from_buffer)
        .map_err(js_error)
}

/// Crop a rectangle given in source pixels.
///
/// Rectangles that extend past the image are clamped to it; empty or fully
/// outside rectangles throw.
#[wasm_bindgen]
pub fn crop_image(
    image: &JsPixelBuffer,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Result<JsPixelBuffer, JsValue> {
    let rect = CropRect::new(
        x.round() as i64,
        y.round() as i64,
        width.round() as i64,
        height.round() as i64,
    );
    apply_crop(image, &rect)
}

/// Crop a rectangle measured on a scaled `<img>` element.
///
/// `display_width`/`display_height` are the rendered size; the rectangle is
/// scaled to the image's own pixels before cropping.
#[wasm_bindgen]
pub fn crop_image_from_display(
    image: &JsPixelBuffer,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    display_width: f64,
    display_height: f64,
) -> Result<JsPixelBuffer, JsValue> {
    let rect = CropRect::scaled_from_display(
        (x, y, width, height),
        (display_width, display_height),
        (image.width(), image.height()),
    );
    apply_crop(image, &rect)
}

fn apply_crop(image: &JsPixelBuffer, rect: &CropRect) -> Result<JsPixelBuffer, JsValue> {
    let src = image.to_buffer().map_err(js_error)?;
    transform::apply_crop(&src, rect)
        .map(JsPixelBuffer::from_buffer)
        .map_err(js_error)
}
