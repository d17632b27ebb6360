use std::f64::consts::FRAC_PI_2;

use super::pline::PlineVertex;
use crate::math::arc_2d::{
    angle_from_bulge, arc_from_vertices, bulge_from_angle, delta_angle_signed,
    point_within_arc_sweep,
};
use crate::math::distance_2d::{closest_point_on_arc, closest_point_on_line_seg};
use crate::math::vector_2d::{angle, distance, midpoint, point_on_circle, points_fuzzy_eq};
use crate::math::Point2;
use crate::spatial_index::Aabb;

/// One polyline segment, resolved into its geometric kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line {
        start: Point2,
        end: Point2,
    },
    Arc {
        start: Point2,
        end: Point2,
        bulge: f64,
        radius: f64,
        center: Point2,
    },
}

impl Segment {
    /// Resolves the segment from `v1` to `v2`.
    ///
    /// Zero bulges and coincident endpoints both resolve to a line.
    #[must_use]
    pub fn from_vertices(v1: &PlineVertex, v2: &PlineVertex) -> Self {
        let start = v1.pos();
        let end = v2.pos();
        if v1.bulge_is_zero() {
            return Self::Line { start, end };
        }
        match arc_from_vertices(start, end, v1.bulge) {
            Ok((radius, center)) => Self::Arc {
                start,
                end,
                bulge: v1.bulge,
                radius,
                center,
            },
            Err(_) => Self::Line { start, end },
        }
    }

    #[must_use]
    pub fn start(&self) -> Point2 {
        match self {
            Self::Line { start, .. } | Self::Arc { start, .. } => *start,
        }
    }

    #[must_use]
    pub fn end(&self) -> Point2 {
        match self {
            Self::Line { end, .. } | Self::Arc { end, .. } => *end,
        }
    }

    /// Path length of the segment.
    #[must_use]
    pub fn length(&self) -> f64 {
        match *self {
            Self::Line { start, end } => distance(start, end),
            Self::Arc { bulge, radius, .. } => radius * angle_from_bulge(bulge).abs(),
        }
    }

    /// Point halfway along the segment's path.
    #[must_use]
    pub fn midpoint(&self) -> Point2 {
        match *self {
            Self::Line { start, end } => midpoint(start, end),
            Self::Arc {
                start,
                bulge,
                radius,
                center,
                ..
            } => {
                let mid_angle = angle(center, start) + angle_from_bulge(bulge) / 2.0;
                point_on_circle(radius, center, mid_angle)
            }
        }
    }

    /// Path distance from the segment start to `point`, which must lie on
    /// the segment.
    #[must_use]
    pub fn distance_along(&self, point: Point2) -> f64 {
        match *self {
            Self::Line { start, .. } => distance(start, point),
            Self::Arc {
                start,
                bulge,
                radius,
                center,
                ..
            } => {
                let swept =
                    delta_angle_signed(angle(center, start), angle(center, point), bulge < 0.0);
                radius * swept.abs()
            }
        }
    }

    /// Closest point on the segment to `point`.
    #[must_use]
    pub fn closest_point(&self, point: Point2) -> Point2 {
        match *self {
            Self::Line { start, end } => closest_point_on_line_seg(start, end, point),
            Self::Arc {
                start,
                end,
                bulge,
                radius,
                center,
            } => closest_point_on_arc(center, radius, start, end, bulge < 0.0, point),
        }
    }

    /// Exact bounding box of the segment.
    #[must_use]
    pub fn bounding_box(&self) -> Aabb {
        let (start, end) = (self.start(), self.end());
        let chord_box = Aabb::new(
            start.x.min(end.x),
            start.y.min(end.y),
            start.x.max(end.x),
            start.y.max(end.y),
        );
        let Self::Arc {
            bulge,
            radius,
            center,
            ..
        } = *self
        else {
            return chord_box;
        };

        // Grow by every axis extreme of the circle that falls inside the sweep.
        let mut bbox = chord_box;
        for quadrant in 0..4 {
            let extreme = point_on_circle(radius, center, f64::from(quadrant) * FRAC_PI_2);
            if point_within_arc_sweep(center, start, end, bulge < 0.0, extreme, 0.0) {
                bbox = bbox.union(&Aabb::new(extreme.x, extreme.y, extreme.x, extreme.y));
            }
        }
        bbox
    }
}

/// Cheap bounding box of the segment from `v1` to `v2` that always contains the
/// exact one.
///
/// Arcs up to a semicircle use the chord rectangle extended by the sagitta;
/// larger arcs use the full circle's box.
#[must_use]
pub fn seg_fast_approx_bbox(v1: &PlineVertex, v2: &PlineVertex) -> Aabb {
    let chord_box = Aabb::new(v1.x.min(v2.x), v1.y.min(v2.y), v1.x.max(v2.x), v1.y.max(v2.y));
    if v1.bulge_is_zero() {
        return chord_box;
    }

    if v1.bulge.abs() > 1.0 {
        if let Segment::Arc { radius, center, .. } = Segment::from_vertices(v1, v2) {
            return Aabb::new(
                center.x - radius,
                center.y - radius,
                center.x + radius,
                center.y + radius,
            );
        }
        return chord_box;
    }

    let b = v1.bulge;
    let offs_x = b * (v2.y - v1.y) / 2.0;
    let offs_y = -b * (v2.x - v1.x) / 2.0;
    let sagitta_box = Aabb::new(
        (v1.x + offs_x).min(v2.x + offs_x),
        (v1.y + offs_y).min(v2.y + offs_y),
        (v1.x + offs_x).max(v2.x + offs_x),
        (v1.y + offs_y).max(v2.y + offs_y),
    );
    chord_box.union(&sagitta_box)
}

/// The two vertices produced by splitting a segment at a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitResult {
    /// Start vertex of the segment with its bulge trimmed to end at the split point.
    pub updated_start: PlineVertex,
    /// Vertex at the split point, carrying the bulge of the remaining piece.
    pub split_vertex: PlineVertex,
}

/// Splits the segment `v1 -> v2` at `point`, which must lie on the segment.
#[must_use]
pub fn seg_split_at_point(
    v1: &PlineVertex,
    v2: &PlineVertex,
    point: Point2,
    pos_equal_eps: f64,
) -> SplitResult {
    let Segment::Arc { center, bulge, .. } = Segment::from_vertices(v1, v2) else {
        return SplitResult {
            updated_start: *v1,
            split_vertex: PlineVertex::from_point(point, 0.0),
        };
    };

    if points_fuzzy_eq(v1.pos(), point, pos_equal_eps) {
        return SplitResult {
            updated_start: PlineVertex::from_point(point, 0.0),
            split_vertex: PlineVertex::from_point(point, bulge),
        };
    }
    if points_fuzzy_eq(v2.pos(), point, pos_equal_eps) {
        return SplitResult {
            updated_start: *v1,
            split_vertex: PlineVertex::from_point(v2.pos(), 0.0),
        };
    }

    let sweep = angle_from_bulge(bulge);
    let start_angle = angle(center, v1.pos());
    let point_angle = angle(center, point);
    let first_sweep = delta_angle_signed(start_angle, point_angle, bulge < 0.0);
    let first_sweep = if bulge < 0.0 {
        first_sweep.max(sweep)
    } else {
        first_sweep.min(sweep)
    };

    SplitResult {
        updated_start: PlineVertex::new(v1.x, v1.y, bulge_from_angle(first_sweep)),
        split_vertex: PlineVertex::from_point(point, bulge_from_angle(sweep - first_sweep)),
    }
}
