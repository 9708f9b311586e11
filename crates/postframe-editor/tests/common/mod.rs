#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{ImageFormat, Rgba, RgbaImage};

use postframe_core::config::OutputFormat;
use postframe_core::error::CompositorError;
use postframe_core::geometry::CompletedCrop;
use postframe_core::raster::{
    Affine, CpuRasterizer, ImageResource, ImageSource, Rasterizer, Surface,
};

/// Opaque image where each pixel encodes its coordinates (mod 256).
pub fn coordinate_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| coordinate_pixel(x, y))
}

pub fn coordinate_pixel(x: u32, y: u32) -> Rgba<u8> {
    Rgba([(x % 256) as u8, (y % 256) as u8, ((x / 256) * 16 + y / 256) as u8, 255])
}

/// PNG-encoded coordinate image, as a host would pass after a file pick.
pub fn png_source(width: u32, height: u32) -> ImageSource {
    let mut bytes = Vec::new();
    coordinate_image(width, height)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode fixture");
    ImageSource::Encoded(bytes)
}

pub fn decode(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes)
        .expect("decode rendered output")
        .to_rgba8()
}

/// CPU backend whose first `failures` encodes fail.
#[derive(Default)]
pub struct FlakyRasterizer {
    failures: usize,
    calls: AtomicUsize,
}

impl FlakyRasterizer {
    pub fn failing(failures: usize) -> Self {
        Self {
            failures,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Rasterizer for FlakyRasterizer {
    fn name(&self) -> &str {
        "flaky"
    }

    fn load_image(&self, source: &ImageSource) -> Result<ImageResource, CompositorError> {
        CpuRasterizer.load_image(source)
    }

    fn create_surface(&self, width: u32, height: u32) -> Result<Surface, CompositorError> {
        CpuRasterizer.create_surface(width, height)
    }

    fn draw_region_with_transform(
        &self,
        surface: &mut Surface,
        image: &ImageResource,
        region: &CompletedCrop,
        transform: &Affine,
    ) -> Result<(), CompositorError> {
        CpuRasterizer.draw_region_with_transform(surface, image, region, transform)
    }

    fn encode(&self, surface: &Surface, format: OutputFormat) -> Result<Vec<u8>, CompositorError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
            return Err(CompositorError::EncodeFailed("simulated".into()));
        }
        CpuRasterizer.encode(surface, format)
    }
}
