use crate::consts::PERCENT_MAX;
use crate::error::{GeometryError, Result};

use super::rect::{CompletedCrop, CropRect, PixelCrop};

/// Reject display/image sizes that cannot anchor a conversion.
fn ensure_ready(w: f64, h: f64) -> Result<()> {
    if w > 0.0 && h > 0.0 && w.is_finite() && h.is_finite() {
        Ok(())
    } else {
        Err(GeometryError::NotReady)
    }
}

/// Scale a percentage crop onto the displayed image box.
pub fn to_pixel_crop(crop: &CropRect, displayed_w: f64, displayed_h: f64) -> Result<PixelCrop> {
    ensure_ready(displayed_w, displayed_h)?;
    Ok(PixelCrop::new(
        crop.x * displayed_w / PERCENT_MAX,
        crop.y * displayed_h / PERCENT_MAX,
        crop.width * displayed_w / PERCENT_MAX,
        crop.height * displayed_h / PERCENT_MAX,
    ))
}

/// Inverse of [`to_pixel_crop`].
pub fn to_percentage_crop(pixel: &PixelCrop, displayed_w: f64, displayed_h: f64) -> Result<CropRect> {
    ensure_ready(displayed_w, displayed_h)?;
    Ok(CropRect::new(
        pixel.x / displayed_w * PERCENT_MAX,
        pixel.y / displayed_h * PERCENT_MAX,
        pixel.width / displayed_w * PERCENT_MAX,
        pixel.height / displayed_h * PERCENT_MAX,
    ))
}

/// Map an on-screen crop into the source image's natural pixel grid.
///
/// X and Y use independent factors (`natural_w / displayed_w`,
/// `natural_h / displayed_h`); previews may be stretched non-uniformly.
/// Origin and size are rounded separately so equal on-screen sides stay equal
/// after scaling, then the rectangle is pulled back inside the image.
pub fn to_natural_crop(
    pixel: &PixelCrop,
    displayed_w: f64,
    displayed_h: f64,
    natural_w: u32,
    natural_h: u32,
) -> Result<CompletedCrop> {
    ensure_ready(displayed_w, displayed_h)?;
    ensure_ready(f64::from(natural_w), f64::from(natural_h))?;

    let scale_x = f64::from(natural_w) / displayed_w;
    let scale_y = f64::from(natural_h) / displayed_h;

    let (x, width) = scale_span(pixel.x, pixel.width, scale_x, natural_w);
    let (y, height) = scale_span(pixel.y, pixel.height, scale_y, natural_h);

    Ok(CompletedCrop::new(x, y, width, height))
}

/// Scale one axis of a rectangle and fit it into `[0, limit]`. A span with
/// positive scaled length keeps at least one pixel.
fn scale_span(start: f64, len: f64, factor: f64, limit: u32) -> (u32, u32) {
    let limit_f = f64::from(limit);
    let scaled = len * factor;
    let mut len = scaled.round().clamp(0.0, limit_f);
    if scaled > 0.0 && len < 1.0 && limit >= 1 {
        len = 1.0;
    }
    let start = (start * factor).round().clamp(0.0, limit_f - len);
    (start as u32, len as u32)
}
