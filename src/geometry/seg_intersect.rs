use std::f64::consts::TAU;

use super::pline::PlineVertex;
use super::segment::Segment;
use crate::math::arc_2d::{angle_from_bulge, normalize_radians, point_within_arc_sweep};
use crate::math::intersect_2d::{
    circle_circle_intr, line_circle_intr, line_line_intr, CircleCircleIntr, LineCircleIntr,
    LineLineIntr,
};
use crate::math::vector_2d::{
    angle, distance, fuzzy_in_range, lerp, point_on_circle, points_fuzzy_eq,
};
use crate::math::Point2;

/// Outcome of intersecting two polyline segments.
///
/// `seg1_t` and `seg2_t` locate a single crossing on each segment as a
/// fraction of its length (of its sweep for arcs), from `0` at the start to
/// `1` at the end. For overlaps, `point1` is the end of the shared stretch
/// closer to the start of the second segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegIntr {
    NoIntersect,
    TangentIntersect { point: Point2 },
    OneIntersect { point: Point2, seg1_t: f64, seg2_t: f64 },
    TwoIntersects { point1: Point2, point2: Point2 },
    OverlappingLines { point1: Point2, point2: Point2 },
    OverlappingArcs { point1: Point2, point2: Point2 },
}

#[derive(Debug, Clone, Copy)]
struct ArcParts {
    start: Point2,
    end: Point2,
    bulge: f64,
    radius: f64,
    center: Point2,
}

impl ArcParts {
    fn contains_in_sweep(&self, point: Point2, eps: f64) -> bool {
        point_within_arc_sweep(self.center, self.start, self.end, self.bulge < 0.0, point, eps)
    }

    fn has_endpoint(&self, point: Point2, eps: f64) -> bool {
        points_fuzzy_eq(point, self.start, eps) || points_fuzzy_eq(point, self.end, eps)
    }

    /// Start angle and positive sweep of the arc walked counter-clockwise.
    fn ccw_span(&self) -> (f64, f64) {
        let sweep = angle_from_bulge(self.bulge);
        if sweep < 0.0 {
            (angle(self.center, self.end), -sweep)
        } else {
            (angle(self.center, self.start), sweep)
        }
    }
}

/// The two segments being intersected, in caller order.
#[derive(Debug, Clone, Copy)]
struct SegPair {
    seg1: Segment,
    seg2: Segment,
}

impl SegPair {
    fn one_intersect(&self, point: Point2) -> SegIntr {
        SegIntr::OneIntersect {
            point,
            seg1_t: param_on(&self.seg1, point),
            seg2_t: param_on(&self.seg2, point),
        }
    }
}

/// Fraction of the path along `seg` from its start to `point`.
fn param_on(seg: &Segment, point: Point2) -> f64 {
    let length = seg.length();
    if length > 0.0 {
        (seg.distance_along(point) / length).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Intersects the segment `v1 -> v2` with the segment `u1 -> u2`.
///
/// Points are only reported where they lie on both segments (within
/// `pos_equal_eps`). A tangent touch exactly at an endpoint shared by both
/// segments is not reported.
#[must_use]
pub fn segments_intersect(
    v1: &PlineVertex,
    v2: &PlineVertex,
    u1: &PlineVertex,
    u2: &PlineVertex,
    pos_equal_eps: f64,
) -> SegIntr {
    let pair = SegPair {
        seg1: Segment::from_vertices(v1, v2),
        seg2: Segment::from_vertices(u1, u2),
    };
    match (pair.seg1, pair.seg2) {
        (Segment::Line { start: p0, end: p1 }, Segment::Line { start: q0, end: q1 }) => {
            line_line_seg_intr(p0, p1, q0, q1, pos_equal_eps)
        }
        (
            Segment::Line { start: p0, end: p1 },
            Segment::Arc {
                start,
                end,
                bulge,
                radius,
                center,
            },
        )
        | (
            Segment::Arc {
                start,
                end,
                bulge,
                radius,
                center,
            },
            Segment::Line { start: p0, end: p1 },
        ) => {
            let arc = ArcParts {
                start,
                end,
                bulge,
                radius,
                center,
            };
            line_arc_intr(p0, p1, &arc, &pair, pos_equal_eps)
        }
        (
            Segment::Arc {
                start: start1,
                end: end1,
                bulge: bulge1,
                radius: radius1,
                center: center1,
            },
            Segment::Arc {
                start: start2,
                end: end2,
                bulge: bulge2,
                radius: radius2,
                center: center2,
            },
        ) => {
            let arc1 = ArcParts {
                start: start1,
                end: end1,
                bulge: bulge1,
                radius: radius1,
                center: center1,
            };
            let arc2 = ArcParts {
                start: start2,
                end: end2,
                bulge: bulge2,
                radius: radius2,
                center: center2,
            };
            arc_arc_intr(&arc1, &arc2, &pair, pos_equal_eps)
        }
    }
}

fn line_line_seg_intr(p0: Point2, p1: Point2, q0: Point2, q1: Point2, eps: f64) -> SegIntr {
    match line_line_intr(p0, p1, q0, q1, eps) {
        LineLineIntr::Parallel | LineLineIntr::NoIntersect { .. } => SegIntr::NoIntersect,
        LineLineIntr::OneIntersect { seg1_t, seg2_t } => {
            let (seg1_t, seg2_t) = (seg1_t.clamp(0.0, 1.0), seg2_t.clamp(0.0, 1.0));
            SegIntr::OneIntersect {
                point: lerp(p0, p1, seg1_t),
                seg1_t,
                seg2_t,
            }
        }
        LineLineIntr::Coincident { seg2_t0, seg2_t1 } => SegIntr::OverlappingLines {
            point1: lerp(q0, q1, seg2_t0),
            point2: lerp(q0, q1, seg2_t1),
        },
    }
}

/// Collapses up to two candidate points into a result.
fn collect_points(
    first: Option<Point2>,
    second: Option<Point2>,
    pair: &SegPair,
    eps: f64,
) -> SegIntr {
    match (first, second) {
        (None, None) => SegIntr::NoIntersect,
        (Some(point), None) | (None, Some(point)) => pair.one_intersect(point),
        (Some(point1), Some(point2)) => {
            if points_fuzzy_eq(point1, point2, eps) {
                pair.one_intersect(point1)
            } else {
                SegIntr::TwoIntersects { point1, point2 }
            }
        }
    }
}

fn line_arc_intr(p0: Point2, p1: Point2, arc: &ArcParts, pair: &SegPair, eps: f64) -> SegIntr {
    let line_len = distance(p0, p1);
    let t_eps = if line_len > eps { eps / line_len } else { eps };
    let on_both = |t: f64| -> Option<Point2> {
        if !fuzzy_in_range(0.0, t, 1.0, t_eps) {
            return None;
        }
        let point = lerp(p0, p1, t.clamp(0.0, 1.0));
        arc.contains_in_sweep(point, eps).then_some(point)
    };

    match line_circle_intr(p0, p1, arc.radius, arc.center, eps) {
        LineCircleIntr::NoIntersect => SegIntr::NoIntersect,
        LineCircleIntr::TangentIntersect { t0 } => match on_both(t0) {
            Some(point)
                if !(arc.has_endpoint(point, eps)
                    && (points_fuzzy_eq(point, p0, eps) || points_fuzzy_eq(point, p1, eps))) =>
            {
                SegIntr::TangentIntersect { point }
            }
            _ => SegIntr::NoIntersect,
        },
        LineCircleIntr::TwoIntersects { t0, t1 } => {
            collect_points(on_both(t0), on_both(t1), pair, eps)
        }
    }
}

fn arc_arc_intr(arc1: &ArcParts, arc2: &ArcParts, pair: &SegPair, eps: f64) -> SegIntr {
    let on_both = |point: Point2| -> Option<Point2> {
        (arc1.contains_in_sweep(point, eps) && arc2.contains_in_sweep(point, eps)).then_some(point)
    };

    match circle_circle_intr(arc1.radius, arc1.center, arc2.radius, arc2.center, eps) {
        CircleCircleIntr::Separate | CircleCircleIntr::Contained => SegIntr::NoIntersect,
        CircleCircleIntr::TangentIntersect { point } => match on_both(point) {
            Some(point) if !(arc1.has_endpoint(point, eps) && arc2.has_endpoint(point, eps)) => {
                SegIntr::TangentIntersect { point }
            }
            _ => SegIntr::NoIntersect,
        },
        CircleCircleIntr::TwoIntersects { point1, point2 } => {
            collect_points(on_both(point1), on_both(point2), pair, eps)
        }
        CircleCircleIntr::Coincident => coincident_arcs_intr(arc1, arc2, eps),
    }
}

/// Classifies two arcs on the same circle: disjoint, touching at an
/// endpoint, or overlapping along a shared stretch.
fn coincident_arcs_intr(arc1: &ArcParts, arc2: &ArcParts, eps: f64) -> SegIntr {
    let (start1, sweep1) = arc1.ccw_span();
    let (start2, sweep2) = arc2.ccw_span();
    let angle_eps = if arc1.radius > 0.0 { eps / arc1.radius } else { eps };

    // Arc 2 measured from arc 1's start; its span may wrap past 2π.
    let rel_start2 = normalize_radians(start2 - start1);
    let mut overlap: Option<(f64, f64)> = None;
    let mut touch: Option<f64> = None;
    for shift in [rel_start2, rel_start2 - TAU] {
        let lo = shift.max(0.0);
        let hi = (shift + sweep2).min(sweep1);
        if hi - lo > angle_eps {
            let longer = overlap.map_or(true, |(a, b)| hi - lo > b - a);
            if longer {
                overlap = Some((lo, hi));
            }
        } else if hi - lo > -angle_eps {
            touch = Some((lo + hi) / 2.0);
        }
    }

    let endpoints = [arc1.start, arc1.end, arc2.start, arc2.end];
    let point_at = |rel_angle: f64| -> Point2 {
        let point = point_on_circle(arc1.radius, arc1.center, start1 + rel_angle);
        endpoints
            .iter()
            .copied()
            .find(|e| points_fuzzy_eq(*e, point, eps))
            .unwrap_or(point)
    };

    if let Some((lo, hi)) = overlap {
        let (low_point, high_point) = (point_at(lo), point_at(hi));
        let (point1, point2) = if arc2.bulge < 0.0 {
            (high_point, low_point)
        } else {
            (low_point, high_point)
        };
        return SegIntr::OverlappingArcs { point1, point2 };
    }

    match touch {
        Some(rel_angle) => SegIntr::TangentIntersect {
            point: point_at(rel_angle),
        },
        None => SegIntr::NoIntersect,
    }
}
