use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::config::OutputFormat;
use crate::geometry::CompletedCrop;

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier for one rendered result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ResultHandle(u64);

impl ResultHandle {
    fn next() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResultHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edit-{}", self.0)
    }
}

/// Encoded output of a save together with the crop that produced it.
///
/// Serializing yields the metadata only; the bytes travel separately.
#[derive(Clone, Debug, Serialize)]
pub struct EditResult {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub crop: CompletedCrop,
    pub handle: ResultHandle,
    #[serde(skip)]
    format: OutputFormat,
}

impl EditResult {
    pub fn new(bytes: Vec<u8>, format: OutputFormat, crop: CompletedCrop) -> Self {
        Self {
            bytes,
            mime_type: format.mime_type().to_string(),
            crop,
            handle: ResultHandle::next(),
            format,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Suggested file name, e.g. `edit_720x720_3.png`.
    pub fn file_name(&self) -> String {
        format!(
            "edit_{}x{}_{}.{}",
            self.crop.width,
            self.crop.height,
            self.handle.id(),
            self.format.extension()
        )
    }
}
