use image::RgbaImage;
use rayon::prelude::*;

use crate::config::OutputFormat;
use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::CompositorError;
use crate::geometry::CompletedCrop;

use super::encode::encode_rgba;
use super::{Affine, ImageResource, ImageSource, Rasterizer, Surface};

const CHANNELS: usize = 4;

/// Software backend on the `image` crate, parallelised with Rayon.
///
/// Each surface pixel centre is mapped back through the inverse transform
/// and sampled bilinearly from the crop region. Pixels that land outside the
/// region stay untouched (transparent on a fresh surface).
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuRasterizer;

impl Rasterizer for CpuRasterizer {
    fn name(&self) -> &str {
        "CPU/Rayon"
    }

    fn load_image(&self, source: &ImageSource) -> Result<ImageResource, CompositorError> {
        let decoded = source.decode()?;
        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(CompositorError::SourceUnavailable(
                "decoded image has no pixels".into(),
            ));
        }
        Ok(ImageResource::new(decoded.to_rgba8()))
    }

    fn create_surface(&self, width: u32, height: u32) -> Result<Surface, CompositorError> {
        if width == 0 || height == 0 {
            return Err(CompositorError::EmptyCrop);
        }
        Ok(Surface::new(RgbaImage::new(width, height)))
    }

    fn draw_region_with_transform(
        &self,
        surface: &mut Surface,
        image: &ImageResource,
        region: &CompletedCrop,
        transform: &Affine,
    ) -> Result<(), CompositorError> {
        if region.is_empty() {
            return Err(CompositorError::EmptyCrop);
        }
        if !region.fits_within(image.natural_width(), image.natural_height()) {
            return Err(CompositorError::SourceUnavailable(format!(
                "crop {}x{} at ({}, {}) exceeds source {}x{}",
                region.width,
                region.height,
                region.x,
                region.y,
                image.natural_width(),
                image.natural_height()
            )));
        }
        // A degenerate transform draws nothing
        let Some(inverse) = transform.invert() else {
            return Ok(());
        };

        let src = image.pixels();
        let w = surface.width() as usize;
        let h = surface.height() as usize;
        let row_len = w * CHANNELS;
        let buf: &mut [u8] = surface.pixels_mut();

        let draw_row = |(row, dst): (usize, &mut [u8])| {
            for col in 0..w {
                let (qx, qy) = inverse.apply(col as f64 + 0.5, row as f64 + 0.5);
                if let Some(px) = sample_region(src, region, qx, qy) {
                    let offset = col * CHANNELS;
                    blend_over(&mut dst[offset..offset + CHANNELS], px);
                }
            }
        };

        if w * h >= PARALLEL_PIXEL_THRESHOLD {
            buf.par_chunks_mut(row_len).enumerate().for_each(draw_row);
        } else {
            buf.chunks_mut(row_len).enumerate().for_each(draw_row);
        }

        Ok(())
    }

    fn encode(&self, surface: &Surface, format: OutputFormat) -> Result<Vec<u8>, CompositorError> {
        encode_rgba(surface.pixels(), format)
    }
}

/// Bilinear sample at `(qx, qy)` in region-local coordinates, or `None` if
/// the point falls outside the region. Taps are clamped to the region so
/// neighbouring source pixels never bleed in.
fn sample_region(src: &RgbaImage, region: &CompletedCrop, qx: f64, qy: f64) -> Option<[f64; 4]> {
    let rw = f64::from(region.width);
    let rh = f64::from(region.height);
    if !(qx >= 0.0 && qx < rw && qy >= 0.0 && qy < rh) {
        return None;
    }

    // Pixel centres sit at half-integers
    let sx = qx - 0.5;
    let sy = qy - 0.5;
    let x0 = sx.floor();
    let y0 = sy.floor();
    let fx = sx - x0;
    let fy = sy - y0;

    let max_x = i64::from(region.width) - 1;
    let max_y = i64::from(region.height) - 1;
    let clamp_x = |x: i64| (x.clamp(0, max_x) as u32) + region.x;
    let clamp_y = |y: i64| (y.clamp(0, max_y) as u32) + region.y;

    let (x0, y0) = (x0 as i64, y0 as i64);
    let p00 = src.get_pixel(clamp_x(x0), clamp_y(y0));
    let p10 = src.get_pixel(clamp_x(x0 + 1), clamp_y(y0));
    let p01 = src.get_pixel(clamp_x(x0), clamp_y(y0 + 1));
    let p11 = src.get_pixel(clamp_x(x0 + 1), clamp_y(y0 + 1));

    let mut out = [0.0f64; 4];
    for (ch, v) in out.iter_mut().enumerate() {
        let top = lerp(f64::from(p00.0[ch]), f64::from(p10.0[ch]), fx);
        let bottom = lerp(f64::from(p01.0[ch]), f64::from(p11.0[ch]), fx);
        *v = lerp(top, bottom, fy);
    }
    Some(out)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Source-over composite of `src` (straight alpha, 0-255) onto `dst`.
fn blend_over(dst: &mut [u8], src: [f64; 4]) {
    let sa = src[3] / 255.0;
    let da = f64::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        dst.copy_from_slice(&[0, 0, 0, 0]);
        return;
    }
    for ch in 0..3 {
        let c = (src[ch] * sa + f64::from(dst[ch]) * da * (1.0 - sa)) / out_a;
        dst[ch] = to_u8(c);
    }
    dst[3] = to_u8(out_a * 255.0);
}

fn to_u8(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| Rgba([x as u8, y as u8, 7, 255]))
    }

    #[test]
    fn test_sample_region_exact_at_centres() {
        let src = gradient(8, 8);
        let region = CompletedCrop::new(2, 3, 4, 4);
        let px = sample_region(&src, &region, 1.5, 0.5).unwrap();
        assert_eq!(px, [3.0, 3.0, 7.0, 255.0]);
    }

    #[test]
    fn test_sample_region_outside_is_none() {
        let src = gradient(8, 8);
        let region = CompletedCrop::new(0, 0, 4, 4);
        assert!(sample_region(&src, &region, 4.0, 1.0).is_none());
        assert!(sample_region(&src, &region, -0.1, 1.0).is_none());
    }

    #[test]
    fn test_sample_region_does_not_bleed_past_edge() {
        let src = gradient(8, 8);
        let region = CompletedCrop::new(0, 0, 4, 4);
        // Near the right edge the tap at x=4 is clamped back to x=3
        let px = sample_region(&src, &region, 3.9, 0.5).unwrap();
        assert_eq!(px[0], 3.0);
    }

    #[test]
    fn test_blend_over_transparent_copies_source() {
        let mut dst = [0u8; 4];
        blend_over(&mut dst, [200.0, 10.0, 30.0, 128.0]);
        assert_eq!(dst, [200, 10, 30, 128]);
    }

    #[test]
    fn test_blend_over_opaque_source_replaces() {
        let mut dst = [9u8, 9, 9, 255];
        blend_over(&mut dst, [1.0, 2.0, 3.0, 255.0]);
        assert_eq!(dst, [1, 2, 3, 255]);
    }
}
