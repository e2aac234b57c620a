use super::{Point2d, Vector2d};
use std::f64::consts::TAU;

/// Wraps an angle into the half-open interval `[0, 2π)`.
pub fn wrap_angle(angle: f64) -> f64 {
    let angle = angle.rem_euclid(TAU);
    // `rem_euclid` rounds up to exactly 2π for tiny negative inputs
    if angle >= TAU {
        0.0
    } else {
        angle
    }
}

/// Computes the angle travelled going forwards from `from` to `to`, in `[0, 2π)`.
pub fn arc_gap(from: f64, to: f64) -> f64 {
    wrap_angle(to - from)
}

/// Converts an angle on a circle of the given radius to world coordinates.
///
/// # Parameters
/// * `angle` - The angle in rad, measured from the positive x-axis
/// * `radius` - The radius of the circle
pub fn polar(angle: f64, radius: f64) -> Point2d {
    Point2d::new(radius * angle.cos(), radius * angle.sin())
}

/// The unit tangent to a circle at the given angle, pointing in the direction of increasing angle.
pub fn tangent(angle: f64) -> Vector2d {
    Vector2d::new(-angle.sin(), angle.cos())
}
