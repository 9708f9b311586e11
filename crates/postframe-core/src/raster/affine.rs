/// 2-D affine transform in canvas convention:
///
/// ```text
/// | a c e |
/// | b d f |
/// | 0 0 1 |
/// ```
///
/// `translate`, `rotate_degrees` and `scale` post-multiply, so the step
/// written last is applied to points first (like a 2-D canvas context).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine {
    pub const fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    /// `self * other`: apply `other` first, then `self`.
    pub fn then(&self, other: &Affine) -> Affine {
        Affine {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn translate(&self, tx: f64, ty: f64) -> Affine {
        self.then(&Affine {
            e: tx,
            f: ty,
            ..Affine::identity()
        })
    }

    pub fn scale(&self, sx: f64, sy: f64) -> Affine {
        self.then(&Affine {
            a: sx,
            d: sy,
            ..Affine::identity()
        })
    }

    /// Rotate clockwise on screen (y grows downward). The angle is reduced
    /// modulo 360 first; quarter turns use exact sine/cosine.
    pub fn rotate_degrees(&self, degrees: f64) -> Affine {
        let (sin, cos) = sin_cos_degrees(degrees);
        self.then(&Affine {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        })
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Inverse transform, or `None` if the matrix is singular.
    pub fn invert(&self) -> Option<Affine> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        Some(Affine {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }
}

fn sin_cos_degrees(degrees: f64) -> (f64, f64) {
    let turn = degrees.rem_euclid(360.0);
    match turn {
        t if t == 0.0 || t == 360.0 => (0.0, 1.0),
        t if t == 90.0 => (1.0, 0.0),
        t if t == 180.0 => (0.0, -1.0),
        t if t == 270.0 => (-1.0, 0.0),
        t => t.to_radians().sin_cos(),
    }
}
