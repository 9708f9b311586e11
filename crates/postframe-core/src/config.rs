use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_JPEG_QUALITY, DEFAULT_MIN_CROP_PIXELS, DEFAULT_SCALE_MAX, DEFAULT_SCALE_MIN,
    SCALE_HARD_MAX, SCALE_HARD_MIN,
};
use crate::error::ConfigError;

/// Options recognised when an editor session is constructed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default = "default_aspect_presets")]
    pub aspect_presets: Vec<AspectPreset>,
    #[serde(default)]
    pub min_crop_pixels: MinCropSize,
    #[serde(default)]
    pub scale_range: ScaleRange,
    #[serde(default)]
    pub output_format: OutputFormat,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            aspect_presets: default_aspect_presets(),
            min_crop_pixels: MinCropSize::default(),
            scale_range: ScaleRange::default(),
            output_format: OutputFormat::default(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scale_range.validate()?;
        self.min_crop_pixels.validate()?;
        for preset in &self.aspect_presets {
            preset.validate()?;
        }
        Ok(())
    }

    /// Find a preset by name, ignoring ASCII case.
    pub fn preset(&self, name: &str) -> Option<&AspectPreset> {
        self.aspect_presets
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

/// A named crop aspect ratio; `ratio` is width/height, `None` for free-form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AspectPreset {
    pub name: String,
    #[serde(default)]
    pub ratio: Option<f64>,
}

impl AspectPreset {
    pub fn new(name: impl Into<String>, ratio: Option<f64>) -> Self {
        Self {
            name: name.into(),
            ratio,
        }
    }

    /// Preset from a `w:h` pair, e.g. `(9, 16)` for stories.
    pub fn from_sides(name: impl Into<String>, w: u32, h: u32) -> Self {
        Self::new(name, Some(f64::from(w) / f64::from(h)))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::InvalidPreset {
                name: self.name.clone(),
                reason: "name must not be empty".into(),
            });
        }
        match self.ratio {
            Some(r) if !(r.is_finite() && r > 0.0) => Err(ConfigError::InvalidPreset {
                name: self.name.clone(),
                reason: format!("ratio must be positive, got {r}"),
            }),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for AspectPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ratio {
            None => write!(f, "{}", self.name),
            Some(r) => match ratio_sides(r) {
                Some((w, h)) => write!(f, "{} ({w}:{h})", self.name),
                None => write!(f, "{} ({r:.3})", self.name),
            },
        }
    }
}

/// Recover small integer sides for common ratios (1:1, 9:16, 16:9, ...).
fn ratio_sides(ratio: f64) -> Option<(u32, u32)> {
    (1..=32u32).find_map(|h| {
        let w = ratio * f64::from(h);
        let rounded = w.round();
        ((w - rounded).abs() < 1e-6 && rounded >= 1.0).then_some((rounded as u32, h))
    })
}

pub fn default_aspect_presets() -> Vec<AspectPreset> {
    vec![
        AspectPreset::new("Free", None),
        AspectPreset::from_sides("Square", 1, 1),
        AspectPreset::from_sides("Story", 9, 16),
        AspectPreset::from_sides("Post", 4, 5),
        AspectPreset::from_sides("Banner", 16, 9),
    ]
}

/// Smallest crop the user may draw, in displayed pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinCropSize {
    pub width: f64,
    pub height: f64,
}

impl Default for MinCropSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_MIN_CROP_PIXELS,
            height: DEFAULT_MIN_CROP_PIXELS,
        }
    }
}

impl MinCropSize {
    fn validate(&self) -> Result<(), ConfigError> {
        let ok = |v: f64| v.is_finite() && v >= 0.0;
        if ok(self.width) && ok(self.height) {
            Ok(())
        } else {
            Err(ConfigError::InvalidMinCrop {
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// Inclusive bounds for the uniform scale factor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub min: f64,
    pub max: f64,
}

impl Default for ScaleRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_SCALE_MIN,
            max: DEFAULT_SCALE_MAX,
        }
    }
}

impl ScaleRange {
    /// Clamp `value` into the range. NaN maps to the identity scale. An
    /// inverted range (not yet validated) resolves to `max`.
    pub fn clamp(&self, value: f64) -> f64 {
        let value = if value.is_nan() { 1.0 } else { value };
        value.max(self.min).min(self.max)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let in_hard_limits = |v: f64| (SCALE_HARD_MIN..=SCALE_HARD_MAX).contains(&v);
        if in_hard_limits(self.min) && in_hard_limits(self.max) && self.min <= self.max {
            Ok(())
        } else {
            Err(ConfigError::InvalidScaleRange {
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Encoding of the rendered output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless PNG.
    #[default]
    Png,
    /// JPEG at the given quality (1-100). Transparency is flattened onto white.
    Jpeg { quality: u8 },
    /// Lossless WebP.
    WebP,
}

impl OutputFormat {
    pub fn jpeg() -> Self {
        Self::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg { .. } => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpg",
            Self::WebP => "webp",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Png => write!(f, "PNG"),
            Self::Jpeg { quality } => write!(f, "JPEG (q={quality})"),
            Self::WebP => write!(f, "WebP"),
        }
    }
}
