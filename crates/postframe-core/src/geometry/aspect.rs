use crate::consts::{CENTERED_CROP_FRACTION, PERCENT_MAX};
use crate::error::{GeometryError, Result};

use super::rect::CropRect;

/// Accept only finite, strictly positive width/height ratios.
pub fn validate_aspect(ratio: f64) -> Result<f64> {
    if ratio.is_finite() && ratio > 0.0 {
        Ok(ratio)
    } else {
        Err(GeometryError::InvalidAspect(ratio))
    }
}

/// Initial crop for a freshly loaded image or a newly selected aspect preset.
///
/// Without a ratio the crop covers the central 90% x 90%. With a ratio it is
/// the largest rectangle of that ratio fitting the image, shrunk to 90% and
/// centred. The ratio is honoured in the image's own pixel space, so the
/// percentage sides only match for square images.
pub fn centered_crop(natural_w: u32, natural_h: u32, aspect: Option<f64>) -> Result<CropRect> {
    if natural_w == 0 || natural_h == 0 {
        return Err(GeometryError::NotReady);
    }

    let (width, height) = match aspect {
        None => (
            CENTERED_CROP_FRACTION * PERCENT_MAX,
            CENTERED_CROP_FRACTION * PERCENT_MAX,
        ),
        Some(ratio) => {
            let ratio = validate_aspect(ratio)?;
            let img_w = f64::from(natural_w);
            let img_h = f64::from(natural_h);

            // Largest rect of `ratio` that fits, in pixels
            let (fit_w, fit_h) = if img_w / img_h > ratio {
                (img_h * ratio, img_h)
            } else {
                (img_w, img_w / ratio)
            };

            (
                fit_w * CENTERED_CROP_FRACTION / img_w * PERCENT_MAX,
                fit_h * CENTERED_CROP_FRACTION / img_h * PERCENT_MAX,
            )
        }
    };

    Ok(CropRect::new(
        (PERCENT_MAX - width) / 2.0,
        (PERCENT_MAX - height) / 2.0,
        width,
        height,
    ))
}

/// Force `crop` to `ratio` (measured over an `image_w` x `image_h` image).
///
/// Width is kept and height derived from it; if that overflows the image the
/// height is capped and width derived back. The origin stays put unless the
/// resized rectangle would cross an edge.
pub fn snap_to_aspect(crop: &CropRect, ratio: f64, image_w: f64, image_h: f64) -> Result<CropRect> {
    let ratio = validate_aspect(ratio)?;
    if !(image_w > 0.0 && image_h > 0.0) {
        return Err(GeometryError::NotReady);
    }

    // Work in pixels so the ratio is the visible one
    let mut w = crop.width / PERCENT_MAX * image_w;
    let mut h = w / ratio;

    if h > image_h {
        h = image_h;
        w = h * ratio;
    }
    if w > image_w {
        w = image_w;
        h = w / ratio;
    }

    let width = w / image_w * PERCENT_MAX;
    let height = h / image_h * PERCENT_MAX;
    let x = crop.x.clamp(0.0, (PERCENT_MAX - width).max(0.0));
    let y = crop.y.clamp(0.0, (PERCENT_MAX - height).max(0.0));

    Ok(CropRect::new(x, y, width, height))
}
