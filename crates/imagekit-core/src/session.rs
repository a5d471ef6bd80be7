//! Stateful editing session over a single source image.
//!
//! An [`EditSession`] holds the decoded source, the buffer being edited and the
//! accumulated rotate/flip state, and chains operations the way an editor UI
//! does:
//!
//! - `resize` and `crop` apply to the current buffer, which then becomes the
//!   new base
//! - rotate and flip accumulate in a [`TransformSpec`] that is re-applied to
//!   the base on every change
//! - `reset` returns to the decoded source
//!
//! A failed operation leaves the session exactly as it was.
//!
//! # Loading
//!
//! Reading a file is the one asynchronous step on the caller's side. Take a
//! [`LoadTicket`] when the read starts and hand it back with the bytes; if a
//! newer load started in the meantime the older completion is discarded.

use crate::config::PipelineConfig;
use crate::decode::{PixelBuffer, SourceImage};
use crate::encode::ExportSpec;
use crate::error::{PipelineError, Result};
use crate::pipeline::{ImageTransformPipeline, PipelineResult};
use crate::transform::{aspect_linked_dimensions, AspectDriver, CropRect, ResizeSpec, TransformSpec};

/// Identifies one load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

/// What happened to a completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The image replaced the session's previous state.
    Loaded,
    /// A newer load was started; this result was dropped.
    Superseded,
}

/// Coarse lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing loaded yet.
    Empty,
    /// Source loaded, no edits.
    Loaded,
    /// At least one operation applied since load or reset.
    Transformed,
    /// The current buffer was exported and not edited since.
    Exported,
}

#[derive(Debug, Clone)]
struct Loaded {
    source: SourceImage,
    base: PixelBuffer,
    transform: TransformSpec,
    current: PixelBuffer,
    edited: bool,
    exported: bool,
}

impl Loaded {
    fn new(source: SourceImage) -> Self {
        let base = source.image().clone();
        Self {
            current: base.clone(),
            base,
            source,
            transform: TransformSpec::default(),
            edited: false,
            exported: false,
        }
    }

    /// Replace the base with an already-transformed buffer.
    fn rebase(&mut self, image: PixelBuffer) {
        self.base = image.clone();
        self.current = image;
        self.transform = TransformSpec::default();
        self.edited = true;
        self.exported = false;
    }
}

#[derive(Debug, Default)]
pub struct EditSession {
    pipeline: ImageTransformPipeline,
    generation: u64,
    loaded: Option<Loaded>,
}

impl EditSession {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            pipeline: ImageTransformPipeline::new(config),
            generation: 0,
            loaded: None,
        }
    }

    pub fn pipeline(&self) -> &ImageTransformPipeline {
        &self.pipeline
    }

    /// Start a load. Any ticket issued earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    /// Finish a load started with [`begin_load`](Self::begin_load).
    ///
    /// A stale ticket yields `Superseded` without decoding. A decode failure
    /// is returned and the previous image stays loaded.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        bytes: &[u8],
        mime_type: Option<&str>,
    ) -> Result<LoadOutcome> {
        if ticket.0 != self.generation {
            log::warn!(
                "Discarding load {} (superseded by {})",
                ticket.0,
                self.generation
            );
            return Ok(LoadOutcome::Superseded);
        }

        let source = self.pipeline.decode(bytes, mime_type)?;
        self.loaded = Some(Loaded::new(source));
        Ok(LoadOutcome::Loaded)
    }

    /// Load an image that is already in memory.
    pub fn load(&mut self, bytes: &[u8], mime_type: Option<&str>) -> Result<()> {
        let ticket = self.begin_load();
        self.complete_load(ticket, bytes, mime_type).map(|_| ())
    }

    /// Start editing an already decoded image. Loads still in flight become
    /// stale; a malformed buffer is rejected and the previous image stays.
    pub fn load_source(&mut self, source: SourceImage) -> Result<()> {
        source.image().validate()?;
        self.generation += 1;
        self.loaded = Some(Loaded::new(source));
        Ok(())
    }

    pub fn resize(&mut self, spec: &ResizeSpec) -> Result<&PixelBuffer> {
        let loaded = self.loaded.as_mut().ok_or(PipelineError::SourceNotReady)?;
        let resized = self.pipeline.resize(&loaded.current, spec)?;
        loaded.rebase(resized);
        Ok(&loaded.current)
    }

    pub fn crop(&mut self, rect: &CropRect) -> Result<&PixelBuffer> {
        let loaded = self.loaded.as_mut().ok_or(PipelineError::SourceNotReady)?;
        let cropped = self.pipeline.crop(&loaded.current, rect)?;
        loaded.rebase(cropped);
        Ok(&loaded.current)
    }

    pub fn rotate_cw(&mut self) -> Result<&PixelBuffer> {
        let spec = self.transform()?.rotate_cw();
        self.set_transform(spec)
    }

    pub fn rotate_ccw(&mut self) -> Result<&PixelBuffer> {
        let spec = self.transform()?.rotate_ccw();
        self.set_transform(spec)
    }

    pub fn flip_horizontal(&mut self) -> Result<&PixelBuffer> {
        let spec = self.transform()?.toggle_flip_horizontal();
        self.set_transform(spec)
    }

    pub fn flip_vertical(&mut self) -> Result<&PixelBuffer> {
        let spec = self.transform()?.toggle_flip_vertical();
        self.set_transform(spec)
    }

    /// Replace the accumulated rotate/flip state and re-render from the base.
    pub fn set_transform(&mut self, spec: TransformSpec) -> Result<&PixelBuffer> {
        let loaded = self.loaded.as_mut().ok_or(PipelineError::SourceNotReady)?;
        let rendered = self.pipeline.transform(&loaded.base, &spec)?;
        loaded.current = rendered;
        loaded.transform = spec;
        loaded.edited = true;
        loaded.exported = false;
        Ok(&loaded.current)
    }

    /// Drop every edit and return to the decoded source.
    pub fn reset(&mut self) -> Result<&PixelBuffer> {
        let loaded = self.loaded.as_mut().ok_or(PipelineError::SourceNotReady)?;
        *loaded = Loaded::new(loaded.source.clone());
        Ok(&loaded.current)
    }

    /// Encode the current buffer.
    pub fn export(&mut self, spec: &ExportSpec) -> Result<PipelineResult> {
        let loaded = self.loaded.as_mut().ok_or(PipelineError::SourceNotReady)?;
        let outputs = self.pipeline.encode(&loaded.current, spec)?;
        loaded.exported = true;
        Ok(PipelineResult {
            image: loaded.current.clone(),
            outputs,
        })
    }

    /// Both dimensions for a resize form with the aspect lock on, derived
    /// from the current buffer.
    pub fn linked_dimensions(&self, driver: AspectDriver, value: u32) -> Result<(u32, u32)> {
        let current = self.current()?;
        Ok(aspect_linked_dimensions(current.width, current.height, driver, value))
    }

    pub fn current(&self) -> Result<&PixelBuffer> {
        self.loaded
            .as_ref()
            .map(|l| &l.current)
            .ok_or(PipelineError::SourceNotReady)
    }

    pub fn source(&self) -> Result<&SourceImage> {
        self.loaded
            .as_ref()
            .map(|l| &l.source)
            .ok_or(PipelineError::SourceNotReady)
    }

    /// Accumulated rotate/flip state relative to the current base.
    pub fn transform(&self) -> Result<TransformSpec> {
        self.loaded
            .as_ref()
            .map(|l| l.transform)
            .ok_or(PipelineError::SourceNotReady)
    }

    pub fn state(&self) -> SessionState {
        match &self.loaded {
            None => SessionState::Empty,
            Some(l) if l.exported => SessionState::Exported,
            Some(l) if l.edited => SessionState::Transformed,
            Some(_) => SessionState::Loaded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::ExportFormat;
    use crate::transform::Rotation;
    use image::{DynamicImage, ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x % 256) as u8, (y % 256) as u8, 50, 255])
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn loaded_session(width: u32, height: u32) -> EditSession {
        let mut session = EditSession::default();
        session.load(&png_bytes(width, height), Some("image/png")).unwrap();
        session
    }

    #[test]
    fn test_empty_session_not_ready() {
        let mut session = EditSession::default();
        assert_eq!(session.state(), SessionState::Empty);
        assert_eq!(session.current().err(), Some(PipelineError::SourceNotReady));
        assert_eq!(session.rotate_cw().err(), Some(PipelineError::SourceNotReady));
        assert_eq!(
            session.resize(&ResizeSpec::percentage(50.0)).err(),
            Some(PipelineError::SourceNotReady)
        );
        assert_eq!(
            session.export(&ExportSpec::single(ExportFormat::Png, 80)).err(),
            Some(PipelineError::SourceNotReady)
        );
        assert_eq!(session.reset().err(), Some(PipelineError::SourceNotReady));
    }

    #[test]
    fn test_load_sets_state() {
        let session = loaded_session(20, 10);
        assert_eq!(session.state(), SessionState::Loaded);
        assert_eq!(session.current().unwrap().width, 20);
        assert_eq!(session.source().unwrap().metadata().format, Some(ExportFormat::Png));
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut session = EditSession::default();
        let first = session.begin_load();
        let second = session.begin_load();

        let outcome = session.complete_load(second, &png_bytes(8, 8), None).unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded);

        // The earlier read finishes late and must not replace the image
        let outcome = session.complete_load(first, &png_bytes(30, 30), None).unwrap();
        assert_eq!(outcome, LoadOutcome::Superseded);
        assert_eq!(session.current().unwrap().width, 8);
    }

    #[test]
    fn test_stale_ticket_with_garbage_is_not_decoded() {
        let mut session = EditSession::default();
        let first = session.begin_load();
        let _second = session.begin_load();
        let outcome = session.complete_load(first, b"not an image", None).unwrap();
        assert_eq!(outcome, LoadOutcome::Superseded);
        assert_eq!(session.state(), SessionState::Empty);
    }

    #[test]
    fn test_load_source_supersedes_pending_load() {
        let mut session = EditSession::default();
        let pending = session.begin_load();

        let buffer = PixelBuffer::filled(7, 3, [1, 2, 3, 255]);
        session.load_source(SourceImage::from_buffer(buffer.clone())).unwrap();
        assert_eq!(session.state(), SessionState::Loaded);
        assert_eq!(session.current().unwrap(), &buffer);

        let outcome = session.complete_load(pending, &png_bytes(20, 20), None).unwrap();
        assert_eq!(outcome, LoadOutcome::Superseded);
        assert_eq!(session.current().unwrap().width, 7);
    }

    #[test]
    fn test_load_source_rejects_malformed_buffer() {
        let mut session = loaded_session(5, 5);
        let bad = PixelBuffer {
            width: 3,
            height: 3,
            pixels: vec![0; 4],
        };
        let result = session.load_source(SourceImage::from_buffer(bad));
        assert!(matches!(result, Err(PipelineError::InvalidDimension { .. })));
        assert_eq!(session.current().unwrap().width, 5);
    }

    #[test]
    fn test_failed_load_keeps_previous_image() {
        let mut session = loaded_session(12, 6);
        let result = session.load(b"garbage", Some("image/png"));
        assert!(matches!(result, Err(PipelineError::DecodeFailure(_))));
        assert_eq!(session.current().unwrap().width, 12);
    }

    #[test]
    fn test_rotation_accumulates_on_base() {
        let mut session = loaded_session(20, 10);
        let original = session.current().unwrap().clone();

        session.rotate_cw().unwrap();
        assert_eq!(session.transform().unwrap().rotation, Rotation::Deg90);
        assert_eq!(
            (session.current().unwrap().width, session.current().unwrap().height),
            (10, 20)
        );

        session.rotate_ccw().unwrap();
        assert!(session.transform().unwrap().is_identity());
        assert_eq!(session.current().unwrap(), &original);
        assert_eq!(session.state(), SessionState::Transformed);
    }

    #[test]
    fn test_ccw_from_zero_wraps_to_270() {
        let mut session = loaded_session(4, 2);
        session.rotate_ccw().unwrap();
        assert_eq!(session.transform().unwrap().rotation, Rotation::Deg270);
    }

    #[test]
    fn test_double_flip_restores() {
        let mut session = loaded_session(9, 5);
        let original = session.current().unwrap().clone();
        session.flip_horizontal().unwrap();
        assert_ne!(session.current().unwrap(), &original);
        session.flip_horizontal().unwrap();
        assert_eq!(session.current().unwrap(), &original);
    }

    #[test]
    fn test_resize_chains_on_current() {
        let mut session = loaded_session(80, 60);
        session.rotate_cw().unwrap();

        // Resize applies to the rotated 60x80 buffer and becomes the new base
        let resized = session
            .resize(&ResizeSpec::keep_aspect(30, 0, AspectDriver::Width))
            .unwrap();
        assert_eq!((resized.width, resized.height), (30, 40));
        assert!(session.transform().unwrap().is_identity());
    }

    #[test]
    fn test_failed_crop_leaves_state_unchanged() {
        let mut session = loaded_session(10, 10);
        session.rotate_cw().unwrap();
        let before = session.current().unwrap().clone();
        let transform = session.transform().unwrap();

        let result = session.crop(&CropRect::new(50, 50, 5, 5));
        assert!(matches!(result, Err(PipelineError::InvalidCropRegion { .. })));
        assert_eq!(session.current().unwrap(), &before);
        assert_eq!(session.transform().unwrap(), transform);
    }

    #[test]
    fn test_failed_resize_leaves_state_unchanged() {
        let mut session = loaded_session(10, 10);
        let result = session.resize(&ResizeSpec::exact(0, 5));
        assert!(matches!(result, Err(PipelineError::InvalidDimension { .. })));
        assert_eq!(session.state(), SessionState::Loaded);
    }

    #[test]
    fn test_reset_restores_source() {
        let mut session = loaded_session(16, 8);
        let original = session.current().unwrap().clone();

        session.crop(&CropRect::new(0, 0, 4, 4)).unwrap();
        session.flip_vertical().unwrap();
        session.reset().unwrap();

        assert_eq!(session.current().unwrap(), &original);
        assert!(session.transform().unwrap().is_identity());
        assert_eq!(session.state(), SessionState::Loaded);
    }

    #[test]
    fn test_export_marks_state() {
        let mut session = loaded_session(10, 10);
        let result = session
            .export(&ExportSpec::single(ExportFormat::Png, 80))
            .unwrap();
        assert_eq!(result.outputs.len(), 1);
        assert_eq!(session.state(), SessionState::Exported);

        session.rotate_cw().unwrap();
        assert_eq!(session.state(), SessionState::Transformed);
    }

    #[test]
    fn test_linked_dimensions_use_current() {
        let session = loaded_session(800, 600);
        assert_eq!(
            session.linked_dimensions(AspectDriver::Width, 400).unwrap(),
            (400, 300)
        );
        assert_eq!(
            session.linked_dimensions(AspectDriver::Height, 300).unwrap(),
            (400, 300)
        );
    }
}
