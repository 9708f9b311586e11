use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use postframe_core::compositor::{Compositor, EditResult};
use postframe_core::config::{AspectPreset, EditorConfig};
use postframe_core::error::{CompositorError, GeometryError};
use postframe_core::geometry::{CompletedCrop, CropRect};
use postframe_core::raster::{CpuRasterizer, ImageResource, ImageSource, Rasterizer};
use postframe_core::transform::{TransformParams, TransformState};

use crate::error::{EditorError, Result};
use crate::worker::{spawn_render, CancelToken, RenderTask};

/// Mirror axis for [`EditorSession::on_flip`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlipAxis {
    Horizontal,
    Vertical,
}

/// One open editor: the loaded image, its edit state and the save path.
///
/// Drag events (`on_crop_change`) only touch percentage geometry. The
/// natural-pixel crop used for saving is recomputed in `on_crop_complete`
/// and cached; saving is refused until that has happened once.
///
/// Dropping the session cancels any render still in flight.
#[derive(Debug)]
pub struct EditorSession {
    config: EditorConfig,
    image: ImageResource,
    state: TransformState,
    compositor: Compositor,
    completed: Option<CompletedCrop>,
    in_flight: Option<CancelToken>,
}

impl EditorSession {
    /// Open an editor on the built-in software rasterizer.
    pub fn new(source: &ImageSource, config: EditorConfig) -> Result<Self> {
        Self::with_rasterizer(source, config, Arc::new(CpuRasterizer))
    }

    pub fn with_rasterizer(
        source: &ImageSource,
        config: EditorConfig,
        rasterizer: Arc<dyn Rasterizer>,
    ) -> Result<Self> {
        config.validate()?;
        let image = rasterizer.load_image(source)?;
        let state = TransformState::new(image.natural_width(), image.natural_height(), &config);
        let compositor = Compositor::new(rasterizer, config.output_format);
        info!(
            backend = compositor.rasterizer().name(),
            width = image.natural_width(),
            height = image.natural_height(),
            "Editor opened"
        );
        Ok(Self {
            config,
            image,
            state,
            compositor,
            completed: None,
            in_flight: None,
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn aspect_presets(&self) -> &[AspectPreset] {
        &self.config.aspect_presets
    }

    pub fn image(&self) -> &ImageResource {
        &self.image
    }

    pub fn state(&self) -> &TransformState {
        &self.state
    }

    pub fn params(&self) -> TransformParams {
        self.state.params()
    }

    /// The crop cached by the last completed gesture.
    pub fn completed_crop(&self) -> Option<CompletedCrop> {
        self.completed
    }

    pub fn can_save(&self) -> bool {
        self.completed.is_some_and(|c| !c.is_empty())
    }

    /// The preview has been laid out (or resized) at `width` x `height`.
    /// The first call derives the initial centred crop.
    pub fn on_image_displayed(&mut self, width: f64, height: f64) -> Result<(), GeometryError> {
        self.state.set_displayed_size(width, height)
    }

    /// Lock the crop to `ratio` (`None` for free-form) and re-centre it.
    ///
    /// A crop already cached for saving follows the new rectangle.
    pub fn on_aspect_select(&mut self, ratio: Option<f64>) -> Result<(), GeometryError> {
        self.state.set_aspect(ratio)?;
        if self.completed.is_some() {
            self.completed = self.state.completed_crop()?;
        }
        Ok(())
    }

    /// Select a configured preset by name, ignoring case.
    pub fn on_preset_select(&mut self, name: &str) -> Result<()> {
        let ratio = self
            .config
            .preset(name)
            .map(|p| p.ratio)
            .ok_or_else(|| EditorError::UnknownPreset(name.to_string()))?;
        self.on_aspect_select(ratio)?;
        Ok(())
    }

    /// Continuous drag update. Never fails: rejected rectangles leave the
    /// previous crop in place. Returns the crop now shown.
    pub fn on_crop_change(&mut self, rect: CropRect) -> Option<CropRect> {
        if self.state.crop().is_some_and(|c| c.approx_eq(&rect)) {
            return self.state.crop();
        }
        match self.state.set_crop(rect) {
            Ok(crop) => Some(crop),
            Err(_) => self.state.crop(),
        }
    }

    /// End of a drag gesture: store `rect` and cache its natural-pixel
    /// counterpart for saving.
    pub fn on_crop_complete(&mut self, rect: CropRect) -> Result<CompletedCrop, GeometryError> {
        self.state.set_crop(rect)?;
        let completed = self
            .state
            .completed_crop()?
            .ok_or(GeometryError::NotReady)?;
        debug!(?completed, "Crop completed");
        self.completed = Some(completed);
        Ok(completed)
    }

    pub fn on_rotate(&mut self, delta_degrees: f64) {
        self.state.rotate(delta_degrees);
    }

    pub fn on_rotate_left(&mut self) {
        self.state.rotate_left();
    }

    pub fn on_rotate_right(&mut self) {
        self.state.rotate_right();
    }

    pub fn on_flip(&mut self, axis: FlipAxis) {
        match axis {
            FlipAxis::Horizontal => self.state.toggle_flip_horizontal(),
            FlipAxis::Vertical => self.state.toggle_flip_vertical(),
        }
    }

    /// Returns the scale actually applied after clamping.
    pub fn on_scale(&mut self, value: f64) -> f64 {
        self.state.set_scale(value)
    }

    /// Identity transform and a fresh centred crop for the current aspect.
    /// Saving is disabled again until the next completed gesture.
    pub fn on_reset(&mut self) {
        self.state.reset();
        self.completed = None;
        if let Some((w, h)) = self.state.displayed_size() {
            if let Err(e) = self.state.set_displayed_size(w, h) {
                warn!(error = %e, "Could not re-derive crop after reset");
            }
        }
    }

    fn save_crop(&self) -> Result<CompletedCrop> {
        match self.completed {
            Some(crop) if !crop.is_empty() => Ok(crop),
            _ => Err(CompositorError::EmptyCrop.into()),
        }
    }

    /// Render the edit on the calling thread.
    pub fn on_save(&self) -> Result<EditResult> {
        let crop = self.save_crop()?;
        let result = self.compositor.render(&self.image, &crop, &self.state.params());
        if let Err(e) = &result {
            warn!(error = %e, "Save failed");
        }
        Ok(result?)
    }

    /// Render the edit on a background thread. A previous render still in
    /// flight is cancelled first.
    pub fn on_save_async(&mut self) -> Result<RenderTask> {
        let crop = self.save_crop()?;
        self.cancel_in_flight();
        let task = spawn_render(
            self.compositor.clone(),
            self.image.clone(),
            crop,
            self.state.params(),
        )?;
        self.in_flight = Some(task.cancel_token());
        Ok(task)
    }

    /// Render and write the result to `target`. A directory receives the
    /// result's suggested file name. Returns the path written.
    pub fn on_download(&self, target: &Path) -> Result<PathBuf> {
        let result = self.on_save()?;
        let path = if target.is_dir() {
            target.join(result.file_name())
        } else {
            target.to_path_buf()
        };
        std::fs::write(&path, &result.bytes)?;
        info!(path = %path.display(), bytes = result.bytes.len(), "Edit downloaded");
        Ok(path)
    }

    /// Close the editor, discarding the edit and any render in flight.
    pub fn on_cancel(mut self) {
        self.cancel_in_flight();
        debug!("Editor cancelled");
    }

    fn cancel_in_flight(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        self.cancel_in_flight();
    }
}
