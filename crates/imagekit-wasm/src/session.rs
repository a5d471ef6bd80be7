//! WASM wrapper around the core editing session.
//!
//! # Example (TypeScript)
//!
//! ```typescript
//! const session = new JsEditSession({ resizeFilter: 'lanczos3' });
//!
//! // A newer upload supersedes an older one that is still being read
//! const ticket = session.begin_load();
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! if (session.complete_load(ticket, bytes, file.type)) {
//!   session.resize(400, 0, true, false);
//!   session.rotate_cw();
//!   const outputs = session.export(['jpeg', 'webp'], 80);
//! }
//! ```

use crate::encode::{export_spec, outputs_to_map};
use crate::types::{js_error, JsPixelBuffer};
use imagekit_core::{
    AspectDriver, CropRect, EditSession, LoadOutcome, LoadTicket, PipelineConfig,
    ResizeSpec, SessionState, TransformSpec,
};
use js_sys::Map;
use wasm_bindgen::prelude::*;

/// Handle for one in-flight load.
#[wasm_bindgen]
pub struct JsLoadTicket {
    ticket: LoadTicket,
}

/// Chained editing state for one uploaded image.
#[wasm_bindgen]
pub struct JsEditSession {
    inner: EditSession,
}

#[wasm_bindgen]
impl JsEditSession {
    /// Create a session. `config` is an optional `PipelineConfig`-shaped
    /// object; missing fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsEditSession, JsValue> {
        let config: PipelineConfig = if config.is_undefined() || config.is_null() {
            PipelineConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?
        };
        Ok(Self::with_config(config))
    }

    /// Start reading a file. Tickets issued earlier become stale.
    pub fn begin_load(&mut self) -> JsLoadTicket {
        JsLoadTicket {
            ticket: self.inner.begin_load(),
        }
    }

    /// Finish a load. Returns `false` if a newer load superseded this one.
    pub fn complete_load(
        &mut self,
        ticket: &JsLoadTicket,
        bytes: &[u8],
        mime_type: Option<String>,
    ) -> Result<bool, JsValue> {
        self.inner
            .complete_load(ticket.ticket, bytes, mime_type.as_deref())
            .map(|outcome| outcome == LoadOutcome::Loaded)
            .map_err(js_error)
    }

    /// Load bytes that are already in memory.
    pub fn load(&mut self, bytes: &[u8], mime_type: Option<String>) -> Result<(), JsValue> {
        self.inner.load(bytes, mime_type.as_deref()).map_err(js_error)
    }

    pub fn resize(
        &mut self,
        width: u32,
        height: u32,
        maintain_aspect_ratio: bool,
        driver_is_height: bool,
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
        self.inner.resize(&spec).map(snapshot).map_err(js_error)
    }

    pub fn resize_by_percentage(&mut self, percent: f64) -> Result<JsPixelBuffer, JsValue> {
        self.inner
            .resize(&ResizeSpec::percentage(percent))
            .map(snapshot)
            .map_err(js_error)
    }

    pub fn crop(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<JsPixelBuffer, JsValue> {
        let rect = CropRect::new(
            x.round() as i64,
            y.round() as i64,
            width.round() as i64,
            height.round() as i64,
        );
        self.inner.crop(&rect).map(snapshot).map_err(js_error)
    }

    pub fn rotate_cw(&mut self) -> Result<JsPixelBuffer, JsValue> {
        self.inner.rotate_cw().map(snapshot).map_err(js_error)
    }

    pub fn rotate_ccw(&mut self) -> Result<JsPixelBuffer, JsValue> {
        self.inner.rotate_ccw().map(snapshot).map_err(js_error)
    }

    pub fn flip_horizontal(&mut self) -> Result<JsPixelBuffer, JsValue> {
        self.inner.flip_horizontal().map(snapshot).map_err(js_error)
    }

    pub fn flip_vertical(&mut self) -> Result<JsPixelBuffer, JsValue> {
        self.inner.flip_vertical().map(snapshot).map_err(js_error)
    }

    /// Replace the rotate/flip state in one step.
    pub fn set_transform(
        &mut self,
        rotation_degrees: i32,
        flip_horizontal: bool,
        flip_vertical: bool,
    ) -> Result<JsPixelBuffer, JsValue> {
        let spec = TransformSpec::new(rotation_degrees, flip_horizontal, flip_vertical);
        self.inner.set_transform(spec).map(snapshot).map_err(js_error)
    }

    pub fn reset(&mut self) -> Result<JsPixelBuffer, JsValue> {
        self.inner.reset().map(snapshot).map_err(js_error)
    }

    /// Encode the current image. Returns a `Map` of format name to `Uint8Array`.
    ///
    /// An empty `formats` array or omitted `quality` uses the session config's
    /// defaults.
    pub fn export(&mut self, formats: Vec<String>, quality: Option<u8>) -> Result<Map, JsValue> {
        let spec = export_spec(self.inner.pipeline().config(), &formats, quality);
        let result = self.inner.export(&spec).map_err(js_error)?;
        Ok(outputs_to_map(&result.outputs))
    }

    /// Copy of the image as currently edited.
    pub fn current(&self) -> Result<JsPixelBuffer, JsValue> {
        self.inner.current().map(snapshot).map_err(js_error)
    }

    /// Current clockwise rotation in degrees (0, 90, 180 or 270).
    #[wasm_bindgen(getter)]
    pub fn rotation(&self) -> i32 {
        self.inner
            .transform()
            .map(|t| t.rotation.degrees())
            .unwrap_or_default()
    }

    /// `"empty"`, `"loaded"`, `"transformed"` or `"exported"`.
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        state_name(self.inner.state()).to_string()
    }
}

impl JsEditSession {
    pub(crate) fn with_config(config: PipelineConfig) -> Self {
        Self {
            inner: EditSession::new(config),
        }
    }
}

fn snapshot(image: &imagekit_core::PixelBuffer) -> JsPixelBuffer {
    JsPixelBuffer::from_buffer(image.clone())
}

fn state_name(state: SessionState) -> &'static str {
    match state {
        SessionState::Empty => "empty",
        SessionState::Loaded => "loaded",
        SessionState::Transformed => "transformed",
        SessionState::Exported => "exported",
    }
}
