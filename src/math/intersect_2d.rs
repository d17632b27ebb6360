use super::vector_2d::{fuzzy_in_range, lerp, perp_dot, points_fuzzy_eq, project_param};
use super::Point2;

/// Outcome of intersecting two line segments `p0 -> p1` and `q0 -> q1`.
///
/// Parametric values are along each segment, `0` at its start and `1` at its end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineLineIntr {
    /// Parallel lines that do not overlap, or degenerate segments that do not touch.
    Parallel,
    /// The infinite lines cross, but outside of at least one segment.
    NoIntersect { seg1_t: f64, seg2_t: f64 },
    /// The segments cross at a single point.
    OneIntersect { seg1_t: f64, seg2_t: f64 },
    /// The segments are collinear and overlap over `[seg2_t0, seg2_t1]` of the second segment.
    Coincident { seg2_t0: f64, seg2_t1: f64 },
}

/// Intersects two line segments.
///
/// `eps` is a length tolerance: it decides parallelism, collinearity and
/// whether a crossing lies within a segment's extent.
#[must_use]
pub fn line_line_intr(p0: Point2, p1: Point2, q0: Point2, q1: Point2, eps: f64) -> LineLineIntr {
    let v = p1 - p0;
    let u = q1 - q0;
    let v_len = v.norm();
    let u_len = u.norm();

    if v_len < eps || u_len < eps {
        return degenerate_line_line(p0, p1, q0, q1, v_len < eps, u_len < eps, eps);
    }

    let w = p0 - q0;
    let denom = perp_dot(v, u);
    if denom.abs() > eps * v_len * u_len / v_len.max(u_len) {
        let seg1_t = perp_dot(u, w) / denom;
        let seg2_t = perp_dot(v, w) / denom;
        if fuzzy_in_range(0.0, seg1_t, 1.0, eps / v_len)
            && fuzzy_in_range(0.0, seg2_t, 1.0, eps / u_len)
        {
            return LineLineIntr::OneIntersect { seg1_t, seg2_t };
        }
        return LineLineIntr::NoIntersect { seg1_t, seg2_t };
    }

    // Parallel: collinear only if p0 sits on the second line.
    if (perp_dot(u, w) / u_len).abs() > eps {
        return LineLineIntr::Parallel;
    }

    let t_a = project_param(q0, q1, p0);
    let t_b = project_param(q0, q1, p1);
    let (t_min, t_max) = if t_a < t_b { (t_a, t_b) } else { (t_b, t_a) };
    let t_eps = eps / u_len;
    if t_min > 1.0 + t_eps || t_max < -t_eps {
        return LineLineIntr::Parallel;
    }

    let seg2_t0 = t_min.max(0.0);
    let seg2_t1 = t_max.min(1.0);
    if (seg2_t1 - seg2_t0) * u_len < eps {
        // Collinear segments touching end to end.
        let point = lerp(q0, q1, seg2_t0);
        return LineLineIntr::OneIntersect {
            seg1_t: project_param(p0, p1, point),
            seg2_t: seg2_t0,
        };
    }

    LineLineIntr::Coincident { seg2_t0, seg2_t1 }
}

fn degenerate_line_line(
    p0: Point2,
    p1: Point2,
    q0: Point2,
    q1: Point2,
    seg1_is_point: bool,
    seg2_is_point: bool,
    eps: f64,
) -> LineLineIntr {
    match (seg1_is_point, seg2_is_point) {
        (true, true) => {
            if points_fuzzy_eq(p0, q0, eps) {
                LineLineIntr::OneIntersect {
                    seg1_t: 0.0,
                    seg2_t: 0.0,
                }
            } else {
                LineLineIntr::Parallel
            }
        }
        (true, false) => match point_on_line_seg(q0, q1, p0, eps) {
            Some(seg2_t) => LineLineIntr::OneIntersect { seg1_t: 0.0, seg2_t },
            None => LineLineIntr::Parallel,
        },
        _ => match point_on_line_seg(p0, p1, q0, eps) {
            Some(seg1_t) => LineLineIntr::OneIntersect { seg1_t, seg2_t: 0.0 },
            None => LineLineIntr::Parallel,
        },
    }
}

fn point_on_line_seg(p0: Point2, p1: Point2, point: Point2, eps: f64) -> Option<f64> {
    let t = project_param(p0, p1, point).clamp(0.0, 1.0);
    points_fuzzy_eq(lerp(p0, p1, t), point, eps).then_some(t)
}

/// Outcome of intersecting the infinite line through `p0 -> p1` with a circle.
///
/// Parametric values are along `p0 -> p1` and may fall outside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineCircleIntr {
    NoIntersect,
    /// The line touches the circle, or passes within `eps` of touching it.
    TangentIntersect { t0: f64 },
    TwoIntersects { t0: f64, t1: f64 },
}

/// Intersects the line through `p0 -> p1` with the circle at `center`.
#[must_use]
pub fn line_circle_intr(
    p0: Point2,
    p1: Point2,
    radius: f64,
    center: Point2,
    eps: f64,
) -> LineCircleIntr {
    let d = p1 - p0;
    let len_sq = d.norm_squared();
    if len_sq < eps * eps {
        // Zero-length line: only the point itself can lie on the circle.
        let dist = (p0 - center).norm();
        return if (dist - radius).abs() < eps {
            LineCircleIntr::TangentIntersect { t0: 0.0 }
        } else {
            LineCircleIntr::NoIntersect
        };
    }

    let t_closest = project_param(p0, p1, center);
    let closest = lerp(p0, p1, t_closest);
    let dist = (closest - center).norm();
    if (dist - radius).abs() < eps {
        return LineCircleIntr::TangentIntersect { t0: t_closest };
    }
    if dist > radius {
        return LineCircleIntr::NoIntersect;
    }

    let half_chord = (radius * radius - dist * dist).sqrt();
    let dt = half_chord / len_sq.sqrt();
    LineCircleIntr::TwoIntersects {
        t0: t_closest - dt,
        t1: t_closest + dt,
    }
}

/// Outcome of intersecting two circles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircleCircleIntr {
    /// Circles are apart and do not touch.
    Separate,
    /// One circle lies inside the other without touching.
    Contained,
    TangentIntersect { point: Point2 },
    TwoIntersects { point1: Point2, point2: Point2 },
    /// Same center and radius.
    Coincident,
}

/// Intersects two circles.
#[must_use]
pub fn circle_circle_intr(
    radius1: f64,
    center1: Point2,
    radius2: f64,
    center2: Point2,
    eps: f64,
) -> CircleCircleIntr {
    let cv = center2 - center1;
    let d_sq = cv.norm_squared();
    let d = d_sq.sqrt();

    if d < eps {
        return if (radius1 - radius2).abs() < eps {
            CircleCircleIntr::Coincident
        } else {
            CircleCircleIntr::Contained
        };
    }
    if d > radius1 + radius2 + eps {
        return CircleCircleIntr::Separate;
    }
    if d < (radius1 - radius2).abs() - eps {
        return CircleCircleIntr::Contained;
    }

    // Distance from center1 to the radical line.
    let a = (radius1 * radius1 - radius2 * radius2 + d_sq) / (2.0 * d);
    let mid = center1 + cv * (a / d);
    let h_sq = radius1 * radius1 - a * a;
    let h = if h_sq > 0.0 { h_sq.sqrt() } else { 0.0 };
    if h < eps {
        return CircleCircleIntr::TangentIntersect { point: mid };
    }

    let offs_x = h * cv.y / d;
    let offs_y = h * cv.x / d;
    CircleCircleIntr::TwoIntersects {
        point1: Point2::new(mid.x + offs_x, mid.y - offs_y),
        point2: Point2::new(mid.x - offs_x, mid.y + offs_y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-8;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    // ── line_line_intr tests ──

    #[test]
    fn lines_cross() {
        let r = line_line_intr(p(0.0, 0.0), p(2.0, 2.0), p(0.0, 2.0), p(2.0, 0.0), EPS);
        let LineLineIntr::OneIntersect { seg1_t, seg2_t } = r else {
            panic!("expected one intersect, got {r:?}");
        };
        assert!((seg1_t - 0.5).abs() < 1e-12 && (seg2_t - 0.5).abs() < 1e-12);
    }

    #[test]
    fn lines_cross_outside_extent() {
        let r = line_line_intr(p(0.0, 0.0), p(1.0, 0.0), p(2.0, -1.0), p(2.0, 1.0), EPS);
        let LineLineIntr::NoIntersect { seg1_t, seg2_t } = r else {
            panic!("expected false intersect, got {r:?}");
        };
        assert!((seg1_t - 2.0).abs() < 1e-12 && (seg2_t - 0.5).abs() < 1e-12);
    }

    #[test]
    fn lines_parallel() {
        let r = line_line_intr(p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0), p(1.0, 1.0), EPS);
        assert_eq!(r, LineLineIntr::Parallel);
        // Collinear but disjoint.
        let r = line_line_intr(p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(3.0, 0.0), EPS);
        assert_eq!(r, LineLineIntr::Parallel);
    }

    #[test]
    fn lines_coincident_overlap() {
        let r = line_line_intr(p(0.0, 0.0), p(2.0, 0.0), p(3.0, 0.0), p(1.0, 0.0), EPS);
        let LineLineIntr::Coincident { seg2_t0, seg2_t1 } = r else {
            panic!("expected coincident, got {r:?}");
        };
        assert!((seg2_t0 - 0.5).abs() < 1e-12 && (seg2_t1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn collinear_lines_touching_end_to_end() {
        let r = line_line_intr(p(0.0, 0.0), p(1.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), EPS);
        let LineLineIntr::OneIntersect { seg1_t, seg2_t } = r else {
            panic!("expected one intersect, got {r:?}");
        };
        assert!((seg1_t - 1.0).abs() < 1e-12 && seg2_t.abs() < 1e-12);
    }

    #[test]
    fn degenerate_point_on_segment() {
        let r = line_line_intr(p(1.0, 0.0), p(1.0, 0.0), p(0.0, 0.0), p(2.0, 0.0), EPS);
        assert_eq!(
            r,
            LineLineIntr::OneIntersect {
                seg1_t: 0.0,
                seg2_t: 0.5
            }
        );
    }

    // ── line_circle_intr tests ──

    #[test]
    fn line_through_circle() {
        let r = line_circle_intr(p(-2.0, 0.0), p(2.0, 0.0), 1.0, p(0.0, 0.0), EPS);
        let LineCircleIntr::TwoIntersects { t0, t1 } = r else {
            panic!("expected two intersects, got {r:?}");
        };
        assert!((t0 - 0.25).abs() < 1e-12 && (t1 - 0.75).abs() < 1e-12);
    }

    #[test]
    fn line_tangent_to_circle_is_sticky() {
        let r = line_circle_intr(p(-2.0, 1.0 + 1e-10), p(2.0, 1.0 + 1e-10), 1.0, p(0.0, 0.0), EPS);
        let LineCircleIntr::TangentIntersect { t0 } = r else {
            panic!("expected tangent, got {r:?}");
        };
        assert!((t0 - 0.5).abs() < 1e-9);
    }

    #[test]
    fn line_misses_circle() {
        let r = line_circle_intr(p(-2.0, 2.0), p(2.0, 2.0), 1.0, p(0.0, 0.0), EPS);
        assert_eq!(r, LineCircleIntr::NoIntersect);
    }

    // ── circle_circle_intr tests ──

    #[test]
    fn circles_two_points() {
        let r = circle_circle_intr(1.0, p(0.0, 0.0), 1.0, p(1.0, 0.0), EPS);
        let CircleCircleIntr::TwoIntersects { point1, point2 } = r else {
            panic!("expected two intersects, got {r:?}");
        };
        let h = 3.0_f64.sqrt() / 2.0;
        assert!(points_fuzzy_eq(point1, p(0.5, -h), 1e-12), "p1={point1:?}");
        assert!(points_fuzzy_eq(point2, p(0.5, h), 1e-12), "p2={point2:?}");
    }

    #[test]
    fn circles_tangent_and_apart() {
        let r = circle_circle_intr(1.0, p(0.0, 0.0), 1.0, p(2.0, 0.0), EPS);
        let CircleCircleIntr::TangentIntersect { point } = r else {
            panic!("expected tangent, got {r:?}");
        };
        assert!(points_fuzzy_eq(point, p(1.0, 0.0), 1e-12));
        assert_eq!(
            circle_circle_intr(1.0, p(0.0, 0.0), 1.0, p(3.0, 0.0), EPS),
            CircleCircleIntr::Separate
        );
        assert_eq!(
            circle_circle_intr(3.0, p(0.0, 0.0), 1.0, p(0.5, 0.0), EPS),
            CircleCircleIntr::Contained
        );
        assert_eq!(
            circle_circle_intr(2.0, p(1.0, 1.0), 2.0, p(1.0, 1.0), EPS),
            CircleCircleIntr::Coincident
        );
    }
}
