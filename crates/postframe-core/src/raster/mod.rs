//! Drawing-surface abstraction used by the compositor.
//!
//! The compositor only talks to a [`Rasterizer`]; [`CpuRasterizer`] is the
//! built-in software backend.

pub mod affine;
pub mod cpu;
pub mod encode;
pub mod source;

use std::sync::Arc;

use image::RgbaImage;

use crate::config::OutputFormat;
use crate::error::CompositorError;
use crate::geometry::CompletedCrop;

pub use affine::Affine;
pub use cpu::CpuRasterizer;
pub use source::ImageSource;

/// A decoded source image, immutable once loaded.
///
/// Cloning shares the pixel buffer.
#[derive(Clone, Debug)]
pub struct ImageResource {
    pixels: Arc<RgbaImage>,
}

impl ImageResource {
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    pub fn natural_width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn natural_height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Output canvas, transparent when created.
#[derive(Clone, Debug)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut RgbaImage {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }
}

/// Backend that decodes, draws and encodes images for the compositor.
pub trait Rasterizer: Send + Sync {
    /// Human-readable backend name for logs.
    fn name(&self) -> &str;

    /// Resolve and decode a source image.
    fn load_image(&self, source: &ImageSource) -> Result<ImageResource, CompositorError>;

    /// Allocate a transparent `width` x `height` surface.
    fn create_surface(&self, width: u32, height: u32) -> Result<Surface, CompositorError>;

    /// Draw `region` of `image` at `(0, 0)` with the region's own size,
    /// mapped through `transform` into surface coordinates.
    fn draw_region_with_transform(
        &self,
        surface: &mut Surface,
        image: &ImageResource,
        region: &CompletedCrop,
        transform: &Affine,
    ) -> Result<(), CompositorError>;

    /// Encode the surface in the requested format.
    fn encode(&self, surface: &Surface, format: OutputFormat) -> Result<Vec<u8>, CompositorError>;
}
