use thiserror::Error;

/// Failures of the pure crop geometry conversions.
///
/// These are recovered locally by `TransformState`: the offending mutation is
/// rejected and the previous valid state is kept.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum GeometryError {
    #[error("Image is not laid out yet (displayed size is zero)")]
    NotReady,

    #[error("Invalid aspect ratio: {0}")]
    InvalidAspect(f64),
}

/// Failures while rasterizing or encoding an edited image.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompositorError {
    #[error("Source image unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Crop rectangle has zero area")]
    EmptyCrop,

    #[error("Failed to encode output image: {0}")]
    EncodeFailed(String),
}

/// Failures while loading or validating an `EditorConfig`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid scale range: {min}..{max}")]
    InvalidScaleRange { min: f64, max: f64 },

    #[error("Invalid minimum crop size: {width}x{height}")]
    InvalidMinCrop { width: f64, height: f64 },

    #[error("Invalid aspect preset '{name}': {reason}")]
    InvalidPreset { name: String, reason: String },
}

pub type Result<T, E = GeometryError> = std::result::Result<T, E>;
