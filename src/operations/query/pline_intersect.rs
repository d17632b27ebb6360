use std::collections::HashSet;

use crate::geometry::pline::Pline;
use crate::geometry::seg_intersect::{segments_intersect, SegIntr};
use crate::geometry::segment::seg_fast_approx_bbox;
use crate::math::vector_2d::points_fuzzy_eq;
use crate::math::Point2;
use crate::spatial_index::StaticSpatialIndex;

/// A single crossing or touching point between two segments.
///
/// `start_index1` and `start_index2` are the start vertex indexes of the
/// segments involved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasicIntersect {
    pub start_index1: usize,
    pub start_index2: usize,
    pub point: Point2,
}

/// A stretch where two segments lie on top of each other.
///
/// `point1` is the end of the stretch closer to the start of the second segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlappingIntersect {
    pub start_index1: usize,
    pub start_index2: usize,
    pub point1: Point2,
    pub point2: Point2,
}

/// Intersections found by a polyline intersection search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntersectsCollection {
    pub basic: Vec<BasicIntersect>,
    pub overlapping: Vec<OverlappingIntersect>,
}

impl IntersectsCollection {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.basic.is_empty() && self.overlapping.is_empty()
    }

    fn push(&mut self, start_index1: usize, start_index2: usize, intr: SegIntr) {
        match intr {
            SegIntr::NoIntersect => {}
            SegIntr::TangentIntersect { point } | SegIntr::OneIntersect { point, .. } => {
                self.push_point(start_index1, start_index2, point);
            }
            SegIntr::TwoIntersects { point1, point2 } => {
                self.push_point(start_index1, start_index2, point1);
                self.push_point(start_index1, start_index2, point2);
            }
            SegIntr::OverlappingLines { point1, point2 }
            | SegIntr::OverlappingArcs { point1, point2 } => {
                self.overlapping.push(OverlappingIntersect {
                    start_index1,
                    start_index2,
                    point1,
                    point2,
                });
            }
        }
    }

    fn push_point(&mut self, start_index1: usize, start_index2: usize, point: Point2) {
        self.basic.push(BasicIntersect {
            start_index1,
            start_index2,
            point,
        });
    }

    /// Drops every basic point found by the filter `keep`.
    fn retain_basic<F: FnMut(&BasicIntersect) -> bool>(&mut self, keep: F) {
        self.basic.retain(keep);
    }
}

/// Returns `true` if `index` is the start of a segment (every vertex of a
/// closed polyline, all but the last of an open one).
fn starts_segment(pline: &Pline, index: usize) -> bool {
    pline.closed || index + 1 < pline.len()
}

/// Moves an intersect recorded at the very end of segment `index` onto the
/// segment that starts there.
///
/// The final vertex of an open polyline starts no segment, so intersects there
/// stay on the last segment.
#[must_use]
pub fn normalize_intersect_index(
    pline: &Pline,
    index: usize,
    point: Point2,
    pos_equal_eps: f64,
) -> usize {
    let next = pline.next_wrapping_index(index);
    if points_fuzzy_eq(pline.vertices[next].pos(), point, pos_equal_eps)
        && starts_segment(pline, next)
    {
        next
    } else {
        index
    }
}

/// Finds intersections between each pair of consecutive segments.
///
/// Points at the shared vertex are ignored. A repeated vertex (zero-length
/// segment) is reported as a basic intersect at that position. A closed
/// two-vertex polyline that doubles back on itself is reported as overlapping.
#[must_use]
pub fn local_self_intersects(pline: &Pline, pos_equal_eps: f64) -> IntersectsCollection {
    let mut result = IntersectsCollection::default();
    let vc = pline.len();
    if vc < 2 {
        return result;
    }

    if vc == 2 {
        let (v0, v1) = (pline.vertices[0], pline.vertices[1]);
        if points_fuzzy_eq(v0.pos(), v1.pos(), pos_equal_eps) {
            result.push_point(0, 1, v0.pos());
        } else if pline.closed && (v0.bulge + v1.bulge).abs() < pos_equal_eps {
            // Second segment retraces the first.
            result.push(
                0,
                1,
                SegIntr::OverlappingLines {
                    point1: v0.pos(),
                    point2: v1.pos(),
                },
            );
        }
        return result;
    }

    let mut visit = |i: usize, j: usize, k: usize| {
        let (v1, v2, v3) = (pline.vertices[i], pline.vertices[j], pline.vertices[k]);
        if points_fuzzy_eq(v1.pos(), v2.pos(), pos_equal_eps) {
            result.push_point(i, j, v1.pos());
            return;
        }
        let shared = v2.pos();
        let away_from_shared = |p: Point2| !points_fuzzy_eq(p, shared, pos_equal_eps);
        match segments_intersect(&v1, &v2, &v2, &v3, pos_equal_eps) {
            SegIntr::NoIntersect => {}
            SegIntr::TangentIntersect { point } | SegIntr::OneIntersect { point, .. } => {
                if away_from_shared(point) {
                    result.push_point(i, j, point);
                }
            }
            SegIntr::TwoIntersects { point1, point2 } => {
                for point in [point1, point2] {
                    if away_from_shared(point) {
                        result.push_point(i, j, point);
                    }
                }
            }
            overlap @ (SegIntr::OverlappingLines { .. } | SegIntr::OverlappingArcs { .. }) => {
                result.push(i, j, overlap);
            }
        }
    };

    for i in 2..vc {
        visit(i - 2, i - 1, i);
    }

    if pline.closed {
        visit(vc - 2, vc - 1, 0);
        visit(vc - 1, 0, 1);
    } else if points_fuzzy_eq(
        pline.vertices[vc - 2].pos(),
        pline.vertices[vc - 1].pos(),
        pos_equal_eps,
    ) {
        let point = pline.vertices[vc - 1].pos();
        result.push_point(vc - 2, vc - 1, point);
    }

    result
}

/// Finds intersections between non-adjacent segments, using `index` (built by
/// [`Pline::create_approx_spatial_index`]) to prune pairs.
///
/// Each segment pair is tested once. Intersects at a segment's end vertex are
/// skipped when that vertex starts another segment, since the pair starting
/// there reports them.
#[must_use]
pub fn global_self_intersects(
    pline: &Pline,
    index: &StaticSpatialIndex,
    pos_equal_eps: f64,
) -> IntersectsCollection {
    let mut result = IntersectsCollection::default();
    if pline.len() < 3 {
        return result;
    }

    let mut visited_pairs: HashSet<(usize, usize)> = HashSet::new();
    for i in 0..pline.segment_count() {
        let j = pline.next_wrapping_index(i);
        let (v1, v2) = (pline.vertices[i], pline.vertices[j]);
        let query = seg_fast_approx_bbox(&v1, &v2).expanded(pos_equal_eps);

        for hi in index.query(&query) {
            let hj = pline.next_wrapping_index(hi);
            if i == hi || i == hj || j == hi {
                continue;
            }
            if !visited_pairs.insert((i.min(hi), i.max(hi))) {
                continue;
            }

            let (u1, u2) = (pline.vertices[hi], pline.vertices[hj]);
            let at_reported_end = |p: Point2| {
                (points_fuzzy_eq(p, v2.pos(), pos_equal_eps) && starts_segment(pline, j))
                    || (points_fuzzy_eq(p, u2.pos(), pos_equal_eps) && starts_segment(pline, hj))
            };

            match segments_intersect(&v1, &v2, &u1, &u2, pos_equal_eps) {
                SegIntr::TangentIntersect { point } | SegIntr::OneIntersect { point, .. } => {
                    if !at_reported_end(point) {
                        result.push_point(i, hi, point);
                    }
                }
                SegIntr::TwoIntersects { point1, point2 } => {
                    for point in [point1, point2] {
                        if !at_reported_end(point) {
                            result.push_point(i, hi, point);
                        }
                    }
                }
                other => result.push(i, hi, other),
            }
        }
    }

    result
}

/// Local and global self-intersects of `pline` in one collection.
fn collect_self_intersects(
    pline: &Pline,
    index: &StaticSpatialIndex,
    pos_equal_eps: f64,
) -> IntersectsCollection {
    let mut result = local_self_intersects(pline, pos_equal_eps);
    let global = global_self_intersects(pline, index, pos_equal_eps);
    result.basic.extend(global.basic);
    result.overlapping.extend(global.overlapping);
    result
}

/// Finds every self-intersection of `pline`: local ones between consecutive
/// segments and global ones between all other pairs.
#[must_use]
pub fn find_self_intersects(pline: &Pline, pos_equal_eps: f64) -> IntersectsCollection {
    let index = pline.create_approx_spatial_index();
    collect_self_intersects(pline, &index, pos_equal_eps)
}

/// All self-intersections flattened to basic intersects, with each
/// overlapping stretch contributing both of its end points.
///
/// Indexes are normalized so a point never sits at the end of the segment it
/// is recorded on when a following segment exists.
#[must_use]
pub fn all_self_intersects_as_basic(
    pline: &Pline,
    index: &StaticSpatialIndex,
    pos_equal_eps: f64,
) -> Vec<BasicIntersect> {
    let all = collect_self_intersects(pline, index, pos_equal_eps);
    let mut result = all.basic;
    for o in all.overlapping {
        for point in [o.point1, o.point2] {
            result.push(BasicIntersect {
                start_index1: o.start_index1,
                start_index2: o.start_index2,
                point,
            });
        }
    }
    for intr in &mut result {
        intr.start_index1 =
            normalize_intersect_index(pline, intr.start_index1, intr.point, pos_equal_eps);
        intr.start_index2 =
            normalize_intersect_index(pline, intr.start_index2, intr.point, pos_equal_eps);
    }
    result
}

/// Finds intersections between two different polylines.
///
/// `pline1_index` must be the spatial index of `pline1`. Basic intersects that
/// coincide with an end point of an overlapping stretch are dropped in favor
/// of the overlap.
#[must_use]
pub fn find_intersects(
    pline1: &Pline,
    pline2: &Pline,
    pline1_index: &StaticSpatialIndex,
    pos_equal_eps: f64,
) -> IntersectsCollection {
    let mut result = IntersectsCollection::default();
    if pline1.len() < 2 || pline2.len() < 2 {
        return result;
    }

    for i2 in 0..pline2.segment_count() {
        let j2 = pline2.next_wrapping_index(i2);
        let (u1, u2) = (pline2.vertices[i2], pline2.vertices[j2]);
        let query = seg_fast_approx_bbox(&u1, &u2).expanded(pos_equal_eps);

        for i1 in pline1_index.query(&query) {
            let j1 = pline1.next_wrapping_index(i1);
            let (v1, v2) = (pline1.vertices[i1], pline1.vertices[j1]);
            let at_reported_end = |p: Point2| {
                (points_fuzzy_eq(p, v2.pos(), pos_equal_eps) && starts_segment(pline1, j1))
                    || (points_fuzzy_eq(p, u2.pos(), pos_equal_eps) && starts_segment(pline2, j2))
            };

            match segments_intersect(&v1, &v2, &u1, &u2, pos_equal_eps) {
                SegIntr::TangentIntersect { point } | SegIntr::OneIntersect { point, .. } => {
                    if !at_reported_end(point) {
                        result.push_point(i1, i2, point);
                    }
                }
                SegIntr::TwoIntersects { point1, point2 } => {
                    for point in [point1, point2] {
                        if !at_reported_end(point) {
                            result.push_point(i1, i2, point);
                        }
                    }
                }
                other => result.push(i1, i2, other),
            }
        }
    }

    if !result.overlapping.is_empty() {
        let overlaps = result.overlapping.clone();
        result.retain_basic(|b| {
            !overlaps.iter().any(|o| {
                points_fuzzy_eq(b.point, o.point1, pos_equal_eps)
                    || points_fuzzy_eq(b.point, o.point2, pos_equal_eps)
            })
        });
    }

    result
}
