//! End-to-end runs through the public API.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage};
use imagekit_core::{
    AspectDriver, CropRect, EditSession, ExportFormat, ExportSpec, ImageTransformPipeline,
    Operation, PipelineConfig, ResizeSpec, SessionState, TransformSpec,
};

fn encoded_source(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 251) as u8, (y % 241) as u8, ((x + y) % 239) as u8, 255])
    });
    let img = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).into_rgb8()),
        _ => DynamicImage::ImageRgba8(img),
    };
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
    bytes
}

#[test]
fn resize_rotate_crop_export_jpeg() {
    let pipeline = ImageTransformPipeline::new(PipelineConfig::default());
    let source = pipeline
        .decode(&encoded_source(800, 600, ImageFormat::Png), Some("image/png"))
        .unwrap();
    assert_eq!((source.image().width, source.image().height), (800, 600));

    let resized = pipeline
        .resize(source.image(), &ResizeSpec::keep_aspect(400, 0, AspectDriver::Width))
        .unwrap();
    assert_eq!((resized.width, resized.height), (400, 300));

    let rotated = pipeline
        .transform(&resized, &TransformSpec::default().rotate_cw())
        .unwrap();
    assert_eq!((rotated.width, rotated.height), (300, 400));

    let result = pipeline
        .run(
            &rotated,
            &Operation::Crop(CropRect::new(0, 0, 300, 300)),
            &ExportSpec::single(ExportFormat::Jpeg, 50),
        )
        .unwrap();
    assert_eq!((result.image.width, result.image.height), (300, 300));

    let jpeg = result.outputs.get(ExportFormat::Jpeg).unwrap();
    let decoded = image::load_from_memory_with_format(&jpeg.bytes, ImageFormat::Jpeg).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (300, 300));
}

#[test]
fn same_scenario_through_a_session() {
    let mut session = EditSession::new(PipelineConfig::default());
    session
        .load(&encoded_source(800, 600, ImageFormat::Jpeg), Some("image/jpeg"))
        .unwrap();

    session
        .resize(&ResizeSpec::keep_aspect(400, 0, AspectDriver::Width))
        .unwrap();
    session.rotate_cw().unwrap();
    let cropped = session.crop(&CropRect::new(0, 0, 300, 300)).unwrap();
    assert_eq!((cropped.width, cropped.height), (300, 300));

    let result = session
        .export(&ExportSpec::single(ExportFormat::Jpeg, 50))
        .unwrap();
    assert_eq!(session.state(), SessionState::Exported);

    let jpeg = result.outputs.get(ExportFormat::Jpeg).unwrap();
    assert_eq!(jpeg.file_name("edited-image"), "edited-image.jpg");
    let decoded = image::load_from_memory(&jpeg.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (300, 300));
}

#[test]
fn multi_format_export_is_decodable() {
    let pipeline = ImageTransformPipeline::default();
    let source = pipeline
        .decode(&encoded_source(120, 90, ImageFormat::Png), None)
        .unwrap();

    let outputs = pipeline
        .encode(source.image(), &ExportSpec::multi(ExportFormat::ALL, 40))
        .unwrap();
    assert_eq!(outputs.len(), 3);

    for encoded in outputs.iter() {
        let decoded = image::load_from_memory(&encoded.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (120, 90), "{}", encoded.format);
        assert!(encoded.to_data_uri().starts_with(&format!("data:{};base64,", encoded.mime_type())));
    }

    // PNG round-trips exactly
    let png = outputs.get(ExportFormat::Png).unwrap();
    let decoded = image::load_from_memory(&png.bytes).unwrap().into_rgba8();
    assert_eq!(decoded.into_raw(), source.image().pixels);
}

#[test]
fn percentage_resize_floors() {
    let pipeline = ImageTransformPipeline::default();
    let source = pipeline
        .decode(&encoded_source(101, 51, ImageFormat::Png), Some("image/png"))
        .unwrap();
    let half = pipeline
        .resize(source.image(), &ResizeSpec::percentage(50.0))
        .unwrap();
    assert_eq!((half.width, half.height), (50, 25));
}
