//! WASM bindings for favicon generation.

use crate::types::{js_error, JsPixelBuffer};
use imagekit_core::favicon::{self, FaviconSet, IconSize};
use imagekit_core::ResampleFilter;
use js_sys::{Map, Uint8Array};
use wasm_bindgen::prelude::*;

/// Generate the standard favicon and Apple touch icon set.
///
/// Returns a `Map` from download file name (e.g. `favicon-32x32.ico`,
/// `apple-touch-144x144.png`) to `Uint8Array`. Non-square images are
/// stretched to a square.
#[wasm_bindgen]
pub fn generate_favicons(image: &JsPixelBuffer) -> Result<Map, JsValue> {
    let set = render(image)?;
    let map = Map::new();
    for icon in &set.icons {
        map.set(
            &JsValue::from_str(&icon.file_name()),
            &Uint8Array::from(icon.bytes.as_slice()).into(),
        );
    }
    Ok(map)
}

fn render(image: &JsPixelBuffer) -> Result<FaviconSet, JsValue> {
    let src = image.to_buffer().map_err(js_error)?;
    favicon::generate_favicons(&src, &IconSize::standard_set(), ResampleFilter::Lanczos3)
        .map_err(js_error)
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_generate_favicons_map() {
        let img = JsPixelBuffer::new(40, 40, vec![10u8; 40 * 40 * 4]);
        let map = generate_favicons(&img).unwrap();
        assert_eq!(map.size(), 7);
        assert!(map.has(&JsValue::from_str("favicon-16x16.ico")));
    }
}
