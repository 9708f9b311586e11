//! Rasterizes a crop of the source image with rotation, flips and scale.

pub mod result;

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::OutputFormat;
use crate::error::CompositorError;
use crate::geometry::CompletedCrop;
use crate::raster::{Affine, CpuRasterizer, ImageResource, Rasterizer, Surface};
use crate::transform::TransformParams;

pub use result::{EditResult, ResultHandle};

/// Canvas transform for a `width` x `height` output, about the canvas centre.
///
/// Composed canvas-style as translate(c) · rotate · scale(flip·s) ·
/// translate(-c). Applied to a source point, the flip and scale act first and
/// the rotation last: a quarter turn with a horizontal flip equals the
/// flipped-only render turned a quarter clockwise.
pub fn canvas_transform(width: u32, height: u32, params: &TransformParams) -> Affine {
    let cx = f64::from(width) / 2.0;
    let cy = f64::from(height) / 2.0;
    let (sx, sy) = params.axis_scale();
    Affine::identity()
        .translate(cx, cy)
        .rotate_degrees(params.rotation_degrees)
        .scale(sx, sy)
        .translate(-cx, -cy)
}

/// Renders edit results through a [`Rasterizer`] backend.
#[derive(Clone)]
pub struct Compositor {
    rasterizer: Arc<dyn Rasterizer>,
    format: OutputFormat,
}

impl Compositor {
    pub fn new(rasterizer: Arc<dyn Rasterizer>, format: OutputFormat) -> Self {
        Self { rasterizer, format }
    }

    /// Compositor on the built-in software rasterizer.
    pub fn cpu(format: OutputFormat) -> Self {
        Self::new(Arc::new(CpuRasterizer), format)
    }

    pub fn rasterizer(&self) -> &Arc<dyn Rasterizer> {
        &self.rasterizer
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Draw `crop` of `image` onto a surface of the crop's own size with
    /// `transform` applied to the sampled content.
    pub fn compose(
        &self,
        image: &ImageResource,
        crop: &CompletedCrop,
        transform: &TransformParams,
    ) -> Result<Surface, CompositorError> {
        if crop.is_empty() {
            return Err(CompositorError::EmptyCrop);
        }
        let mut surface = self.rasterizer.create_surface(crop.width, crop.height)?;
        let matrix = canvas_transform(crop.width, crop.height, transform);
        debug!(
            backend = self.rasterizer.name(),
            ?crop,
            rotation = transform.rotation_degrees,
            flip_h = transform.flip_horizontal,
            flip_v = transform.flip_vertical,
            scale = transform.scale,
            "Compositing crop"
        );
        self.rasterizer
            .draw_region_with_transform(&mut surface, image, crop, &matrix)?;
        Ok(surface)
    }

    /// Encode a composed surface into an [`EditResult`].
    pub fn finish(&self, surface: &Surface, crop: CompletedCrop) -> Result<EditResult, CompositorError> {
        let bytes = self.rasterizer.encode(surface, self.format)?;
        let result = EditResult::new(bytes, self.format, crop);
        info!(
            handle = %result.handle,
            width = crop.width,
            height = crop.height,
            bytes = result.bytes.len(),
            format = %self.format,
            "Edit rendered"
        );
        Ok(result)
    }

    /// Compose and encode in one step.
    pub fn render(
        &self,
        image: &ImageResource,
        crop: &CompletedCrop,
        transform: &TransformParams,
    ) -> Result<EditResult, CompositorError> {
        let surface = self.compose(image, crop, transform)?;
        self.finish(&surface, *crop)
    }
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("rasterizer", &self.rasterizer.name())
            .field("format", &self.format)
            .finish()
    }
}
