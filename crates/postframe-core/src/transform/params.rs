use serde::{Deserialize, Serialize};

/// Geometric edit applied to the cropped content when rendering.
///
/// Rotation is stored unnormalised in degrees; any real value is valid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformParams {
    pub rotation_degrees: f64,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    pub scale: f64,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self::identity()
    }
}

impl TransformParams {
    pub const fn identity() -> Self {
        Self {
            rotation_degrees: 0.0,
            flip_horizontal: false,
            flip_vertical: false,
            scale: 1.0,
        }
    }

    /// Rotation reduced to `[0, 360)`.
    pub fn normalized_rotation(&self) -> f64 {
        let r = self.rotation_degrees.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative inputs
        if r >= 360.0 {
            0.0
        } else {
            r
        }
    }

    /// True when rendering with these params reproduces the crop verbatim.
    pub fn is_identity(&self) -> bool {
        self.normalized_rotation() == 0.0
            && !self.flip_horizontal
            && !self.flip_vertical
            && self.scale == 1.0
    }

    /// Combined flip/scale factors for the X and Y axes.
    pub fn axis_scale(&self) -> (f64, f64) {
        let sx = if self.flip_horizontal { -1.0 } else { 1.0 };
        let sy = if self.flip_vertical { -1.0 } else { 1.0 };
        (sx * self.scale, sy * self.scale)
    }
}
