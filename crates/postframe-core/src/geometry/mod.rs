//! Pure crop geometry.
//!
//! Three coordinate frames are involved when a user crops a displayed image:
//!
//! - percentage space: `CropRect`, relative to the displayed image box, `[0, 100]` per axis
//! - on-screen pixels: `PixelCrop`, the same rectangle in the preview's pixels
//! - natural pixels: `CompletedCrop`, integer rectangle in the source bitmap
//!
//! Everything here is a deterministic function of its inputs.

pub mod aspect;
pub mod convert;
pub mod rect;

pub use aspect::{centered_crop, snap_to_aspect, validate_aspect};
pub use convert::{to_natural_crop, to_percentage_crop, to_pixel_crop};
pub use rect::{CompletedCrop, CropRect, PixelCrop};
