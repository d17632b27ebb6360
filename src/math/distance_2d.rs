use super::arc_2d::point_within_arc_sweep;
use super::vector_2d::{dist_squared, lerp, project_param};
use super::Point2;

/// Returns the closest point to `point` on the segment from `p0` to `p1`.
#[must_use]
pub fn closest_point_on_line_seg(p0: Point2, p1: Point2, point: Point2) -> Point2 {
    let t = project_param(p0, p1, point).clamp(0.0, 1.0);
    lerp(p0, p1, t)
}

/// Returns the closest point to `point` on a circular arc.
///
/// If the direction from `center` to `point` falls within the arc's sweep the
/// closest point is the radial projection; otherwise it is the nearer endpoint.
/// A point at the exact center resolves to `arc_start`.
#[must_use]
pub fn closest_point_on_arc(
    center: Point2,
    radius: f64,
    arc_start: Point2,
    arc_end: Point2,
    is_clockwise: bool,
    point: Point2,
) -> Point2 {
    let to_point = point - center;
    let dist_to_center = to_point.norm();
    if dist_to_center == 0.0 {
        return arc_start;
    }

    if point_within_arc_sweep(center, arc_start, arc_end, is_clockwise, point, 0.0) {
        return center + to_point * (radius / dist_to_center);
    }

    if dist_squared(point, arc_start) <= dist_squared(point, arc_end) {
        arc_start
    } else {
        arc_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vector_2d::points_fuzzy_eq;

    const TOL: f64 = 1e-10;

    // ── closest_point_on_line_seg tests ──

    #[test]
    fn line_perpendicular_projection() {
        let p = closest_point_on_line_seg(
            Point2::origin(),
            Point2::new(2.0, 0.0),
            Point2::new(1.0, 1.0),
        );
        assert!(points_fuzzy_eq(p, Point2::new(1.0, 0.0), TOL), "p={p:?}");
    }

    #[test]
    fn line_endpoint_closest() {
        let p = closest_point_on_line_seg(
            Point2::origin(),
            Point2::new(2.0, 0.0),
            Point2::new(-1.0, 0.5),
        );
        assert!(points_fuzzy_eq(p, Point2::origin(), TOL), "p={p:?}");
    }

    #[test]
    fn line_degenerate() {
        let p = closest_point_on_line_seg(
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(4.0, 5.0),
        );
        assert!(points_fuzzy_eq(p, Point2::new(1.0, 1.0), TOL), "p={p:?}");
    }

    // ── closest_point_on_arc tests ──

    #[test]
    fn arc_radial_projection() {
        // CCW quarter arc from (1,0) to (0,1) around the origin.
        let p = closest_point_on_arc(
            Point2::origin(),
            1.0,
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            false,
            Point2::new(2.0, 2.0),
        );
        let h = std::f64::consts::FRAC_1_SQRT_2;
        assert!(points_fuzzy_eq(p, Point2::new(h, h), TOL), "p={p:?}");
    }

    #[test]
    fn arc_outside_sweep_uses_endpoint() {
        let p = closest_point_on_arc(
            Point2::origin(),
            1.0,
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            false,
            Point2::new(3.0, -0.5),
        );
        assert!(points_fuzzy_eq(p, Point2::new(1.0, 0.0), TOL), "p={p:?}");
    }

    #[test]
    fn arc_center_maps_to_start() {
        let p = closest_point_on_arc(
            Point2::origin(),
            1.0,
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            false,
            Point2::origin(),
        );
        assert!(points_fuzzy_eq(p, Point2::new(1.0, 0.0), TOL), "p={p:?}");
    }
}
