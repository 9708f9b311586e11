use postframe_core::error::{CompositorError, ConfigError, GeometryError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Compositor(#[from] CompositorError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown aspect preset: {0}")]
    UnknownPreset(String),

    #[error("Render cancelled")]
    Cancelled,

    #[error("Render worker exited without a result")]
    WorkerUnavailable,
}

pub type Result<T, E = EditorError> = std::result::Result<T, E>;
