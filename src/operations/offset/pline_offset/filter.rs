use std::ops::ControlFlow;

use crate::config::OffsetOptions;
use crate::geometry::pline::{Pline, PlineVertex};
use crate::geometry::seg_intersect::{segments_intersect, SegIntr};
use crate::geometry::segment::{seg_fast_approx_bbox, Segment};
use crate::math::vector_2d::dist_squared;
use crate::math::Point2;
use crate::spatial_index::{Aabb, StaticSpatialIndex};

/// Tests raw offset geometry against the polyline it was offset from.
///
/// A point belongs to the offset only if no part of the original polyline is
/// closer to it than the offset distance (less `offset_dist_eps`).
pub(crate) struct OffsetValidator<'a> {
    original: &'a Pline,
    index: &'a StaticSpatialIndex,
    min_dist: f64,
    opts: &'a OffsetOptions,
}

impl<'a> OffsetValidator<'a> {
    /// `index` must be the approximate spatial index of `original`.
    pub(crate) fn new(
        original: &'a Pline,
        index: &'a StaticSpatialIndex,
        offset: f64,
        opts: &'a OffsetOptions,
    ) -> Self {
        Self {
            original,
            index,
            min_dist: offset.abs() - opts.offset_dist_eps,
            opts,
        }
    }

    fn segment_at(&self, start_index: usize) -> (PlineVertex, PlineVertex) {
        let next = self.original.next_wrapping_index(start_index);
        (self.original.vertices[start_index], self.original.vertices[next])
    }

    /// Returns `true` if `point` is at least the offset distance away from
    /// every segment of the original polyline.
    pub(crate) fn point_valid(&self, point: Point2) -> bool {
        if self.min_dist <= 0.0 {
            return true;
        }
        let min_dist_sq = self.min_dist * self.min_dist;
        let query = Aabb::around_point(point, self.min_dist);
        let flow = self.index.visit_query(&query, |i| {
            let (v1, v2) = self.segment_at(i);
            let closest = Segment::from_vertices(&v1, &v2).closest_point(point);
            if dist_squared(point, closest) < min_dist_sq {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        flow.is_continue()
    }

    /// Returns `true` if the segment `v1 -> v2` touches or crosses the
    /// original polyline anywhere.
    pub(crate) fn intersects_original(&self, v1: &PlineVertex, v2: &PlineVertex) -> bool {
        let eps = self.opts.pos_equal_eps;
        let query = seg_fast_approx_bbox(v1, v2).expanded(eps);
        let flow = self.index.visit_query(&query, |i| {
            let (u1, u2) = self.segment_at(i);
            if segments_intersect(v1, v2, &u1, &u2, eps) == SegIntr::NoIntersect {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        });
        flow.is_break()
    }

    /// Returns `true` if any segment of `pline` touches or crosses the
    /// original polyline.
    pub(crate) fn pline_intersects_original(&self, pline: &Pline) -> bool {
        pline
            .iter_segments()
            .any(|(v1, v2)| self.intersects_original(&v1, &v2))
    }
}
