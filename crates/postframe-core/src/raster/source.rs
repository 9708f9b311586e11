use std::path::PathBuf;

use image::DynamicImage;

use crate::error::CompositorError;

/// Where the pixels of the image being edited come from.
#[derive(Clone, Debug)]
pub enum ImageSource {
    /// A file on the local filesystem.
    Path(PathBuf),
    /// A URL. Only `file://` URLs are resolved here; fetching remote
    /// resources is the host's job.
    Url(String),
    /// Encoded image bytes (PNG, JPEG, ...).
    Encoded(Vec<u8>),
    /// An already decoded bitmap.
    Decoded(DynamicImage),
}

impl ImageSource {
    /// Decode the source into a `DynamicImage`.
    pub fn decode(&self) -> Result<DynamicImage, CompositorError> {
        match self {
            Self::Path(path) => image::open(path).map_err(|e| {
                CompositorError::SourceUnavailable(format!("{}: {e}", path.display()))
            }),
            Self::Url(url) => match url.strip_prefix("file://") {
                Some(path) => Self::Path(PathBuf::from(path)).decode(),
                None => Err(CompositorError::SourceUnavailable(format!(
                    "unsupported URL (only file:// is resolved locally): {url}"
                ))),
            },
            Self::Encoded(bytes) => image::load_from_memory(bytes)
                .map_err(|e| CompositorError::SourceUnavailable(e.to_string())),
            Self::Decoded(img) => Ok(img.clone()),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<DynamicImage> for ImageSource {
    fn from(img: DynamicImage) -> Self {
        Self::Decoded(img)
    }
}
