use tracing::{debug, warn};

use crate::config::{EditorConfig, MinCropSize, ScaleRange};
use crate::consts::{PERCENT_MAX, QUARTER_TURN_DEGREES};
use crate::error::{GeometryError, Result};
use crate::geometry::{
    centered_crop, snap_to_aspect, to_natural_crop, to_pixel_crop, validate_aspect,
    CompletedCrop, CropRect, PixelCrop,
};

use super::params::TransformParams;

/// Smallest crop side in displayed pixels, regardless of configuration.
const MIN_CROP_FLOOR_PIXELS: f64 = 1.0;

/// Edit parameters of one editor session.
///
/// Mutations either succeed and leave the state valid, or fail with a
/// `GeometryError` and leave it untouched. While set, the crop always lies
/// inside `[0, 100]²` with positive area and, under an aspect constraint,
/// matches the ratio in natural pixels.
#[derive(Clone, Debug)]
pub struct TransformState {
    natural_w: u32,
    natural_h: u32,
    /// On-screen size of the preview, once laid out.
    displayed: Option<(f64, f64)>,
    crop: Option<CropRect>,
    aspect: Option<f64>,
    params: TransformParams,
    scale_range: ScaleRange,
    min_crop: MinCropSize,
}

impl TransformState {
    pub fn new(natural_w: u32, natural_h: u32, config: &EditorConfig) -> Self {
        Self {
            natural_w,
            natural_h,
            displayed: None,
            crop: None,
            aspect: None,
            params: TransformParams::identity(),
            scale_range: config.scale_range,
            min_crop: config.min_crop_pixels,
        }
    }

    pub fn natural_size(&self) -> (u32, u32) {
        (self.natural_w, self.natural_h)
    }

    pub fn displayed_size(&self) -> Option<(f64, f64)> {
        self.displayed
    }

    pub fn crop(&self) -> Option<CropRect> {
        self.crop
    }

    pub fn aspect(&self) -> Option<f64> {
        self.aspect
    }

    pub fn params(&self) -> TransformParams {
        self.params
    }

    pub fn scale_range(&self) -> ScaleRange {
        self.scale_range
    }

    fn displayed_or_not_ready(&self) -> Result<(f64, f64)> {
        self.displayed.ok_or(GeometryError::NotReady)
    }

    /// Record the preview's on-screen size. The first time a size arrives
    /// and no crop exists yet, a centred crop for the current aspect is
    /// derived.
    pub fn set_displayed_size(&mut self, width: f64, height: f64) -> Result<()> {
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            warn!(width, height, "Ignoring unusable display size");
            return Err(GeometryError::NotReady);
        }
        let crop = match self.crop {
            Some(crop) => crop,
            None => centered_crop(self.natural_w, self.natural_h, self.aspect)?,
        };
        self.displayed = Some((width, height));
        self.crop = Some(crop);
        debug!(width, height, "Display size updated");
        Ok(())
    }

    /// Switch the aspect constraint and replace the crop with a fresh
    /// centred one. Rotation, flips and scale are untouched.
    pub fn set_aspect(&mut self, ratio: Option<f64>) -> Result<()> {
        let result = self.try_set_aspect(ratio);
        if let Err(e) = result {
            warn!(error = %e, ?ratio, "Aspect change rejected");
        }
        result
    }

    fn try_set_aspect(&mut self, ratio: Option<f64>) -> Result<()> {
        let ratio = ratio.map(validate_aspect).transpose()?;
        self.displayed_or_not_ready()?;
        let crop = centered_crop(self.natural_w, self.natural_h, ratio)?;
        self.aspect = ratio;
        self.crop = Some(crop);
        debug!(?ratio, ?crop, "Aspect constraint set");
        Ok(())
    }

    /// Replace the crop. The rectangle is clamped into the image, grown to
    /// the minimum crop size, and snapped to the active aspect ratio.
    /// Returns the rectangle actually stored.
    pub fn set_crop(&mut self, rect: CropRect) -> Result<CropRect> {
        let result = self.normalize_crop(rect);
        match result {
            Ok(crop) => {
                self.crop = Some(crop);
                debug!(?crop, "Crop updated");
            }
            Err(e) => warn!(error = %e, ?rect, "Crop change rejected"),
        }
        result
    }

    /// Apply every crop invariant to `rect` without storing it.
    pub fn normalize_crop(&self, rect: CropRect) -> Result<CropRect> {
        let (disp_w, disp_h) = self.displayed_or_not_ready()?;
        let (min_w, min_h) = self.min_crop_percent(disp_w, disp_h);

        let mut crop = rect.clamped();
        crop.width = crop.width.max(min_w).min(PERCENT_MAX);
        crop.height = crop.height.max(min_h).min(PERCENT_MAX);

        if let Some(ratio) = self.aspect {
            crop = snap_to_aspect(
                &crop,
                ratio,
                f64::from(self.natural_w),
                f64::from(self.natural_h),
            )?;
            // Uniform growth keeps the ratio while honouring both minimums
            let grow = (min_w / crop.width)
                .max(min_h / crop.height)
                .max(1.0)
                .min(PERCENT_MAX / crop.width)
                .min(PERCENT_MAX / crop.height);
            crop.width *= grow;
            crop.height *= grow;
        }

        Ok(crop.clamped())
    }

    fn min_crop_percent(&self, disp_w: f64, disp_h: f64) -> (f64, f64) {
        let min_w = self.min_crop.width.max(MIN_CROP_FLOOR_PIXELS);
        let min_h = self.min_crop.height.max(MIN_CROP_FLOOR_PIXELS);
        (
            (min_w / disp_w * PERCENT_MAX).min(PERCENT_MAX),
            (min_h / disp_h * PERCENT_MAX).min(PERCENT_MAX),
        )
    }

    /// The current crop in on-screen pixels.
    pub fn pixel_crop(&self) -> Result<Option<PixelCrop>> {
        let (disp_w, disp_h) = self.displayed_or_not_ready()?;
        self.crop
            .map(|c| to_pixel_crop(&c, disp_w, disp_h))
            .transpose()
    }

    /// The current crop in the source image's natural pixels.
    pub fn completed_crop(&self) -> Result<Option<CompletedCrop>> {
        let (disp_w, disp_h) = self.displayed_or_not_ready()?;
        match self.pixel_crop()? {
            Some(pixel) => Ok(Some(to_natural_crop(
                &pixel,
                disp_w,
                disp_h,
                self.natural_w,
                self.natural_h,
            )?)),
            None => Ok(None),
        }
    }

    /// Add `delta_degrees` to the rotation. No normalisation is applied.
    pub fn rotate(&mut self, delta_degrees: f64) {
        if !delta_degrees.is_finite() {
            warn!(delta_degrees, "Ignoring non-finite rotation");
            return;
        }
        self.params.rotation_degrees += delta_degrees;
        debug!(rotation = self.params.rotation_degrees, "Rotation updated");
    }

    pub fn rotate_left(&mut self) {
        self.rotate(-QUARTER_TURN_DEGREES);
    }

    pub fn rotate_right(&mut self) {
        self.rotate(QUARTER_TURN_DEGREES);
    }

    pub fn toggle_flip_horizontal(&mut self) {
        self.params.flip_horizontal = !self.params.flip_horizontal;
        debug!(flip_horizontal = self.params.flip_horizontal, "Flip toggled");
    }

    pub fn toggle_flip_vertical(&mut self) {
        self.params.flip_vertical = !self.params.flip_vertical;
        debug!(flip_vertical = self.params.flip_vertical, "Flip toggled");
    }

    /// Set the uniform scale, clamped into the configured range. Returns
    /// the value stored.
    pub fn set_scale(&mut self, value: f64) -> f64 {
        let scale = self.scale_range.clamp(value);
        if scale != value {
            debug!(requested = value, scale, "Scale clamped");
        }
        self.params.scale = scale;
        scale
    }

    /// Back to the identity transform with no crop. The aspect constraint
    /// and display size are kept so the caller can re-derive a crop.
    pub fn reset(&mut self) {
        self.params = TransformParams::identity();
        self.crop = None;
        debug!("Transform state reset");
    }
}
