//! Scalar helpers
//!
//! Tolerance-based comparisons used by drag integration, plus a couple of
//! point-to-point helpers that avoid building temporary vectors.

/// Small value added to separation distances so bodies end up strictly apart
pub const EPSILON: f32 = 1.0e-6;

/// `a` and `b` are within `epsilon` of each other
#[inline]
pub fn fuzzy_equal(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() < epsilon
}

/// `a` is greater than `b - epsilon`
#[inline]
pub fn fuzzy_greater_than(a: f32, b: f32, epsilon: f32) -> bool {
    a > b - epsilon
}

/// `a` is less than `b + epsilon`
#[inline]
pub fn fuzzy_less_than(a: f32, b: f32, epsilon: f32) -> bool {
    a < b + epsilon
}

/// Angle in radians of the line from (x1, y1) to (x2, y2)
#[inline]
pub fn angle_between(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    (y2 - y1).atan2(x2 - x1)
}

/// Euclidean distance between (x1, y1) and (x2, y2)
#[inline]
pub fn distance_between(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let dx = x1 - x2;
    let dy = y1 - y2;
    (dx * dx + dy * dy).sqrt()
}
