/// 2D arc/bulge math utilities.
///
/// Bulge convention: `bulge = tan(sweep_angle / 4)`.
/// - `bulge = 0`: straight line
/// - `bulge > 0`: counter-clockwise arc
/// - `bulge < 0`: clockwise arc
/// - `|bulge| = 1`: semicircle
use std::f64::consts::{PI, TAU};

use super::vector_2d::{angle, distance, perp_dot, points_fuzzy_eq};
use super::{Point2, TOLERANCE};
use crate::error::{GeometryError, Result};

/// Sweep angle encoded by `bulge`.
#[must_use]
pub fn angle_from_bulge(bulge: f64) -> f64 {
    4.0 * bulge.atan()
}

/// Bulge encoding a sweep of `angle` radians.
#[must_use]
pub fn bulge_from_angle(angle: f64) -> f64 {
    (angle / 4.0).tan()
}

/// Normalizes `angle` into `[0, 2π)`.
#[must_use]
pub fn normalize_radians(angle: f64) -> f64 {
    let r = angle.rem_euclid(TAU);
    if r >= TAU {
        0.0
    } else {
        r
    }
}

/// Shortest signed angle from `angle1` to `angle2`, in `(-π, π]`.
#[must_use]
pub fn delta_angle(angle1: f64, angle2: f64) -> f64 {
    let diff = normalize_radians(angle2 - angle1);
    if diff > PI {
        diff - TAU
    } else {
        diff
    }
}

/// Angle from `angle1` to `angle2` travelling in a fixed direction.
///
/// The result is in `[0, 2π)` when `negative` is false and in `(-2π, 0]`
/// otherwise.
#[must_use]
pub fn delta_angle_signed(angle1: f64, angle2: f64, negative: bool) -> f64 {
    let diff = normalize_radians(angle2 - angle1);
    if negative && diff > 0.0 {
        diff - TAU
    } else {
        diff
    }
}

/// Radius and center of the arc from `start` to `end` with `bulge`.
///
/// # Errors
///
/// Returns [`GeometryError::ZeroBulge`] if `bulge` is zero and
/// [`GeometryError::CoincidentVertices`] if `start` and `end` coincide.
pub fn arc_from_vertices(start: Point2, end: Point2, bulge: f64) -> Result<(f64, Point2)> {
    if bulge.abs() < TOLERANCE {
        return Err(GeometryError::ZeroBulge.into());
    }
    let chord = end - start;
    let chord_len = chord.norm();
    if chord_len < TOLERANCE {
        return Err(GeometryError::CoincidentVertices {
            x: start.x,
            y: start.y,
        }
        .into());
    }

    let abs_bulge = bulge.abs();
    let radius = chord_len * (bulge * bulge + 1.0) / (4.0 * abs_bulge);
    let sagitta = abs_bulge * chord_len / 2.0;
    // Signed distance from the chord midpoint to the center, along the left normal.
    let m = if bulge < 0.0 {
        sagitta - radius
    } else {
        radius - sagitta
    };
    let center = Point2::new(
        start.x + chord.x / 2.0 - m * chord.y / chord_len,
        start.y + chord.y / 2.0 + m * chord.x / chord_len,
    );

    Ok((radius, center))
}

/// Bulge of the arc that starts at `p1`, passes through `p2`, and ends at `p3`.
///
/// Returns `0.0` for collinear points and for `p1 == p3`, where the quarter
/// sweep angle reaches 90° and its tangent is unbounded.
#[must_use]
pub fn bulge_through_three_points(p1: Point2, p2: Point2, p3: Point2) -> f64 {
    let a = p1 - p2;
    let c = p3 - p2;
    let cross = perp_dot(a, c);
    if cross.abs() < TOLERANCE * a.norm() * c.norm() || cross == 0.0 {
        return 0.0;
    }
    // Inscribed angle α at p2 gives a sweep of 2(π - α), so the bulge is cot(α / 2).
    let magnitude = (a.norm() * c.norm() + a.dot(&c)) / cross.abs();
    // CCW arcs bulge to the right of the chord p1 -> p3.
    if perp_dot(p3 - p1, p2 - p1) < 0.0 {
        magnitude
    } else {
        -magnitude
    }
}

/// Bulge of the minor counter-clockwise arc of `radius` between two points.
///
/// Returns `0.0` exactly when `radius` is not larger than half the chord.
#[must_use]
pub fn bulge_for_radius(p1: Point2, p2: Point2, radius: f64) -> f64 {
    let half_chord = distance(p1, p2) / 2.0;
    if radius <= half_chord {
        return 0.0;
    }
    ((half_chord / radius).asin() / 2.0).tan()
}

/// Returns `true` if the direction from `center` to `point` lies within the
/// sweep of the arc from `arc_start` to `arc_end`.
///
/// Points within `eps` of either arc endpoint are always inside.
#[must_use]
pub fn point_within_arc_sweep(
    center: Point2,
    arc_start: Point2,
    arc_end: Point2,
    is_clockwise: bool,
    point: Point2,
    eps: f64,
) -> bool {
    if points_fuzzy_eq(point, arc_start, eps) || points_fuzzy_eq(point, arc_end, eps) {
        return true;
    }

    let start_angle = angle(center, arc_start);
    let end_angle = angle(center, arc_end);
    let point_angle = angle(center, point);
    let radius = distance(center, arc_start);
    let angle_eps = if radius > 0.0 { eps / radius } else { eps };

    let (sweep, offset) = if is_clockwise {
        (
            normalize_radians(start_angle - end_angle),
            normalize_radians(start_angle - point_angle),
        )
    } else {
        (
            normalize_radians(end_angle - start_angle),
            normalize_radians(point_angle - start_angle),
        )
    };

    offset <= sweep + angle_eps || offset >= TAU - angle_eps
}
