#![allow(dead_code)]

use image::{Rgba, RgbaImage};

use postframe_core::raster::ImageResource;

/// Opaque image where every pixel encodes its own coordinates:
/// `R = x % 256`, `G = y % 256`, `B = (x / 256) * 16 + y / 256`.
pub fn coordinate_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x % 256) as u8,
            (y % 256) as u8,
            ((x / 256) * 16 + y / 256) as u8,
            255,
        ])
    })
}

pub fn coordinate_resource(width: u32, height: u32) -> ImageResource {
    ImageResource::new(coordinate_image(width, height))
}

/// Expected pixel of [`coordinate_image`] at `(x, y)`.
pub fn coordinate_pixel(x: u32, y: u32) -> Rgba<u8> {
    Rgba([
        (x % 256) as u8,
        (y % 256) as u8,
        ((x / 256) * 16 + y / 256) as u8,
        255,
    ])
}

/// Decode encoded output bytes back to RGBA.
pub fn decode(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes)
        .expect("decode rendered output")
        .to_rgba8()
}
