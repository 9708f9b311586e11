/// Minimum pixel count (w*h) to rasterize rows in parallel with Rayon.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Fraction of the largest fitting rectangle covered by a freshly centred crop.
pub const CENTERED_CROP_FRACTION: f64 = 0.9;

/// Upper bound of the percentage coordinate space.
pub const PERCENT_MAX: f64 = 100.0;

/// Tolerance for comparing aspect ratios and percentage coordinates.
pub const GEOMETRY_EPSILON: f64 = 1e-9;

/// Hard lower bound for any configured scale range.
pub const SCALE_HARD_MIN: f64 = 0.1;

/// Hard upper bound for any configured scale range.
pub const SCALE_HARD_MAX: f64 = 10.0;

/// Default lower bound of the user-facing scale slider.
pub const DEFAULT_SCALE_MIN: f64 = 0.5;

/// Default upper bound of the user-facing scale slider.
pub const DEFAULT_SCALE_MAX: f64 = 3.0;

/// Default minimum crop size in displayed pixels, per axis.
pub const DEFAULT_MIN_CROP_PIXELS: f64 = 50.0;

/// Default JPEG quality when JPEG output is selected without a quality.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Background that transparent pixels are composited onto for JPEG output.
pub const JPEG_BACKGROUND: [u8; 3] = [255, 255, 255];

/// Rotation increment applied by the rotate-left/right controls.
pub const QUARTER_TURN_DEGREES: f64 = 90.0;
