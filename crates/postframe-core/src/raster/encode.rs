use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, RgbaImage};

use crate::config::OutputFormat;
use crate::consts::JPEG_BACKGROUND;
use crate::error::CompositorError;

/// Encode an RGBA buffer. JPEG output is composited onto
/// [`JPEG_BACKGROUND`] first.
pub fn encode_rgba(img: &RgbaImage, format: OutputFormat) -> Result<Vec<u8>, CompositorError> {
    let (w, h) = img.dimensions();
    let mut buf = Vec::new();

    let result = match format {
        OutputFormat::Png => {
            PngEncoder::new(&mut buf).write_image(img.as_raw(), w, h, ExtendedColorType::Rgba8)
        }
        OutputFormat::Jpeg { quality } => {
            let rgb = flatten_onto(img, JPEG_BACKGROUND);
            JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100)).write_image(
                rgb.as_raw(),
                w,
                h,
                ExtendedColorType::Rgb8,
            )
        }
        OutputFormat::WebP => WebPEncoder::new_lossless(&mut buf).write_image(
            img.as_raw(),
            w,
            h,
            ExtendedColorType::Rgba8,
        ),
    };

    result.map_err(|e| CompositorError::EncodeFailed(format!("{format}: {e}")))?;
    Ok(buf)
}

/// Source-over composite of `img` onto an opaque `background`.
fn flatten_onto(img: &RgbaImage, background: [u8; 3]) -> RgbImage {
    RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let px = img.get_pixel(x, y).0;
        let alpha = f64::from(px[3]) / 255.0;
        let mix = |c: u8, bg: u8| {
            (f64::from(c) * alpha + f64::from(bg) * (1.0 - alpha))
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Rgb([
            mix(px[0], background[0]),
            mix(px[1], background[1]),
            mix(px[2], background[2]),
        ])
    })
}
