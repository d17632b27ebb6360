//! Scalar and 2D vector helpers shared by every stage of the offset pipeline.

use super::{Point2, Vector2};

/// Returns `true` if `a` and `b` differ by less than `eps`.
#[must_use]
pub fn fuzzy_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() < eps
}

/// Returns `true` if `value` lies in `[min - eps, max + eps]`.
#[must_use]
pub fn fuzzy_in_range(min: f64, value: f64, max: f64, eps: f64) -> bool {
    value > min - eps && value < max + eps
}

/// Returns `true` if both coordinates of `p1` and `p2` are within `eps`.
#[must_use]
pub fn points_fuzzy_eq(p1: Point2, p2: Point2, eps: f64) -> bool {
    fuzzy_eq(p1.x, p2.x, eps) && fuzzy_eq(p1.y, p2.y, eps)
}

/// Squared Euclidean distance between two points.
#[must_use]
pub fn dist_squared(p1: Point2, p2: Point2) -> f64 {
    nalgebra::distance_squared(&p1, &p2)
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(p1: Point2, p2: Point2) -> f64 {
    nalgebra::distance(&p1, &p2)
}

/// Angle of the direction from `p1` to `p2`, in `(-π, π]`.
#[must_use]
pub fn angle(p1: Point2, p2: Point2) -> f64 {
    (p2.y - p1.y).atan2(p2.x - p1.x)
}

/// Left perpendicular `(-y, x)` of `v`.
#[must_use]
pub fn perp(v: Vector2) -> Vector2 {
    Vector2::new(-v.y, v.x)
}

/// Normalized left perpendicular of `v`.
///
/// Returns the zero vector when `v` has zero length.
#[must_use]
pub fn unit_perp(v: Vector2) -> Vector2 {
    let len = v.norm();
    if len == 0.0 {
        return Vector2::zeros();
    }
    perp(v) / len
}

/// 2D cross product (`a.x * b.y - a.y * b.x`).
#[must_use]
pub fn perp_dot(a: Vector2, b: Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Point at parameter `t` along `p1 -> p2`.
#[must_use]
pub fn lerp(p1: Point2, p2: Point2, t: f64) -> Point2 {
    p1 + (p2 - p1) * t
}

/// Midpoint of two points.
#[must_use]
pub fn midpoint(p1: Point2, p2: Point2) -> Point2 {
    lerp(p1, p2, 0.5)
}

/// Point on the circle at `center` with `radius` at `angle`.
#[must_use]
pub fn point_on_circle(radius: f64, center: Point2, angle: f64) -> Point2 {
    Point2::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
}

/// Returns `true` if `point` is left of, or within `eps` of, the line `p0 -> p1`.
#[must_use]
pub fn is_left_or_equal(p0: Point2, p1: Point2, point: Point2, eps: f64) -> bool {
    perp_dot(p1 - p0, point - p0) > -eps
}

/// Returns the parameter of the closest point to `point` on the infinite line `p0 -> p1`.
///
/// Returns `0.0` for a zero-length line.
#[must_use]
pub fn project_param(p0: Point2, p1: Point2, point: Point2) -> f64 {
    let v = p1 - p0;
    let len_sq = v.norm_squared();
    if len_sq == 0.0 {
        return 0.0;
    }
    (point - p0).dot(&v) / len_sq
}
