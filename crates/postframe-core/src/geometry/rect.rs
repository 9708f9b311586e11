use serde::{Deserialize, Serialize};

use crate::consts::{GEOMETRY_EPSILON, PERCENT_MAX};

/// Crop rectangle in percentages of the displayed image box.
///
/// Invariant once clamped: all fields in `[0, 100]`, `x + width <= 100`,
/// `y + height <= 100`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole image.
    pub fn full() -> Self {
        Self::new(0.0, 0.0, PERCENT_MAX, PERCENT_MAX)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True if the rectangle has positive area and lies inside `[0, 100]²`
    /// (with `tolerance` slack on the far edges).
    pub fn is_within_bounds(&self, tolerance: f64) -> bool {
        self.x >= -tolerance
            && self.y >= -tolerance
            && self.width > 0.0
            && self.height > 0.0
            && self.right() <= PERCENT_MAX + tolerance
            && self.bottom() <= PERCENT_MAX + tolerance
    }

    /// Width/height ratio of this rectangle once laid over an image of
    /// `image_w` x `image_h` pixels.
    pub fn aspect_in(&self, image_w: f64, image_h: f64) -> f64 {
        (self.width * image_w) / (self.height * image_h)
    }

    /// Clamp into the percentage space. Size is clamped first, then the
    /// origin is pulled back so the far edges stay inside. Non-finite fields
    /// collapse to zero.
    pub fn clamped(&self) -> Self {
        let width = finite_or_zero(self.width).clamp(0.0, PERCENT_MAX);
        let height = finite_or_zero(self.height).clamp(0.0, PERCENT_MAX);
        let x = finite_or_zero(self.x).clamp(0.0, PERCENT_MAX - width);
        let y = finite_or_zero(self.y).clamp(0.0, PERCENT_MAX - height);
        Self::new(x, y, width, height)
    }

    /// Move the rectangle by `(dx, dy)` percent, keeping its size and
    /// stopping at the image edges.
    pub fn translate_clamped(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height).clamped()
    }

    /// Field-wise equality within [`GEOMETRY_EPSILON`].
    pub fn approx_eq(&self, other: &CropRect) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() <= GEOMETRY_EPSILON;
        close(self.x, other.x)
            && close(self.y, other.y)
            && close(self.width, other.width)
            && close(self.height, other.height)
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Crop rectangle in on-screen pixels of the displayed preview.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PixelCrop {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelCrop {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Crop rectangle in the source image's natural pixel coordinates.
///
/// This is the rectangle handed to the compositor and reported alongside
/// the encoded output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletedCrop {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CompletedCrop {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// True if the rectangle lies inside an image of the given size.
    pub fn fits_within(&self, image_w: u32, image_h: u32) -> bool {
        u64::from(self.x) + u64::from(self.width) <= u64::from(image_w)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(image_h)
    }
}
