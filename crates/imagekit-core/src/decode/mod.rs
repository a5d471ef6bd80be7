//! Image decoding for the transform pipeline.
//!
//! This module turns the raw bytes handed over by the file/drag-drop layer
//! into an upright RGBA [`SourceImage`]:
//! - PNG, JPEG and WebP input (whatever codecs the build enables)
//! - EXIF orientation applied at decode time
//! - Pixel-count limit checked from the header before full decode
//!
//! # Architecture
//!
//! Decoding is the only step that naturally waits on I/O (reading the file in
//! the browser). The byte-level decode itself is synchronous; superseding
//! an in-flight read is handled by load tickets in [`crate::session`].
//!
//! # Examples
//!
//! ```ignore
//! use imagekit_core::decode::decode_image;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let source = decode_image(&bytes, Some("image/jpeg"), u64::MAX).unwrap();
//! println!("Decoded {}x{} image", source.image().width, source.image().height);
//! ```

mod reader;
mod types;

pub use reader::{decode_image, get_orientation};
pub use types::{ImageMetadata, Orientation, PixelBuffer, SourceImage, CHANNELS};
