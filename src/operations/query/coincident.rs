use std::cmp::Ordering;

use super::pline_intersect::{normalize_intersect_index, BasicIntersect, OverlappingIntersect};
use crate::geometry::pline::{Pline, PlineVertex};
use crate::geometry::segment::{seg_split_at_point, Segment};
use crate::math::vector_2d::points_fuzzy_eq;
use crate::math::Point2;

/// A maximal stretch along which two polylines coincide.
///
/// The stretch geometry follows the first polyline's direction.
#[derive(Debug, Clone, PartialEq)]
pub struct CoincidentSlice {
    /// Open polyline tracing the shared stretch.
    pub pline: Pline,
    pub start_index1: usize,
    pub start_index2: usize,
    pub end_index1: usize,
    pub end_index2: usize,
    /// The second polyline runs the stretch in the opposite direction.
    pub opposing_directions: bool,
}

impl CoincidentSlice {
    #[must_use]
    pub fn start_point(&self) -> Point2 {
        self.pline.vertices.first().map_or_else(Point2::origin, PlineVertex::pos)
    }

    #[must_use]
    pub fn end_point(&self) -> Point2 {
        self.pline.last().map_or_else(Point2::origin, PlineVertex::pos)
    }

    /// The stretch's start and end recorded as intersects between the two
    /// polylines, with indexes normalized onto the segments the points start.
    #[must_use]
    pub fn pseudo_intersects(
        &self,
        pline1: &Pline,
        pline2: &Pline,
        pos_equal_eps: f64,
    ) -> [BasicIntersect; 2] {
        let make = |index1: usize, index2: usize, point: Point2| BasicIntersect {
            start_index1: normalize_intersect_index(pline1, index1, point, pos_equal_eps),
            start_index2: normalize_intersect_index(pline2, index2, point, pos_equal_eps),
            point,
        };
        [
            make(self.start_index1, self.start_index2, self.start_point()),
            make(self.end_index1, self.end_index2, self.end_point()),
        ]
    }
}

/// One overlapping intersect, oriented along the first polyline.
struct Piece {
    index1: usize,
    index2: usize,
    start: PlineVertex,
    end: Point2,
    dist_from_seg_start: f64,
    opposing: bool,
}

fn piece_from(intr: &OverlappingIntersect, pline1: &Pline, pos_equal_eps: f64) -> Piece {
    let v1 = pline1.vertices[intr.start_index1];
    let v2 = pline1.vertices[pline1.next_wrapping_index(intr.start_index1)];
    let seg = Segment::from_vertices(&v1, &v2);
    let d1 = seg.distance_along(intr.point1);
    let d2 = seg.distance_along(intr.point2);
    let opposing = d2 < d1;
    let (near, far, near_dist) = if opposing {
        (intr.point2, intr.point1, d2)
    } else {
        (intr.point1, intr.point2, d1)
    };

    // Trim the segment to [near, far] to carry the right bulge.
    let from_near = seg_split_at_point(&v1, &v2, near, pos_equal_eps).split_vertex;
    let start = seg_split_at_point(&from_near, &v2, far, pos_equal_eps).updated_start;

    Piece {
        index1: intr.start_index1,
        index2: intr.start_index2,
        start,
        end: far,
        dist_from_seg_start: near_dist,
        opposing,
    }
}

/// Merges overlapping intersects of `pline1` with another polyline into
/// maximal coincident stretches.
///
/// Pieces are sorted by `pline1` segment index and distance from the segment
/// start, then chained while each piece starts where the previous ended. On a
/// closed `pline1`, a stretch running across the seam is joined into one.
#[must_use]
pub fn join_coincident_intersects(
    overlapping: &[OverlappingIntersect],
    pline1: &Pline,
    pos_equal_eps: f64,
) -> Vec<CoincidentSlice> {
    let mut pieces: Vec<Piece> = overlapping
        .iter()
        .map(|intr| piece_from(intr, pline1, pos_equal_eps))
        .collect();
    pieces.sort_by(|a, b| match a.index1.cmp(&b.index1) {
        Ordering::Equal => a.dist_from_seg_start.total_cmp(&b.dist_from_seg_start),
        other => other,
    });

    let mut slices: Vec<CoincidentSlice> = Vec::new();
    for piece in pieces {
        if let Some(current) = slices.last_mut() {
            if points_fuzzy_eq(current.end_point(), piece.start.pos(), pos_equal_eps) {
                current.pline.add_or_replace_vertex(piece.start, pos_equal_eps);
                current.pline.add_vertex(PlineVertex::from_point(piece.end, 0.0));
                current.end_index1 = piece.index1;
                current.end_index2 = piece.index2;
                continue;
            }
        }
        let mut pline = Pline::with_capacity(2, false);
        pline.add_vertex(piece.start);
        pline.add_vertex(PlineVertex::from_point(piece.end, 0.0));
        slices.push(CoincidentSlice {
            pline,
            start_index1: piece.index1,
            start_index2: piece.index2,
            end_index1: piece.index1,
            end_index2: piece.index2,
            opposing_directions: piece.opposing,
        });
    }

    if pline1.closed && slices.len() > 1 {
        let first_start = slices[0].start_point();
        let wraps = slices
            .last()
            .is_some_and(|last| points_fuzzy_eq(last.end_point(), first_start, pos_equal_eps));
        if wraps {
            if let Some(mut last) = slices.pop() {
                let first = &slices[0];
                for v in &first.pline.vertices {
                    last.pline.add_or_replace_vertex(*v, pos_equal_eps);
                }
                last.end_index1 = first.end_index1;
                last.end_index2 = first.end_index2;
                slices[0] = last;
            }
        }
    }

    slices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::query::pline_intersect::find_intersects;

    const EPS: f64 = 1e-5;

    fn assert_point(actual: Point2, x: f64, y: f64) {
        assert!(
            points_fuzzy_eq(actual, Point2::new(x, y), 1e-9),
            "expected ({x}, {y}), got {actual:?}"
        );
    }

    #[test]
    fn merges_runs_across_vertices() {
        let a = Pline::from_points(
            &[
                Point2::new(0.0, 0.0),
                Point2::new(2.0, 0.0),
                Point2::new(4.0, 0.0),
                Point2::new(6.0, 0.0),
            ],
            false,
        );
        let b = Pline::from_points(&[Point2::new(1.0, 0.0), Point2::new(5.0, 0.0)], false);
        let found = find_intersects(&a, &b, &a.create_approx_spatial_index(), EPS);
        assert_eq!(found.overlapping.len(), 3);

        let slices = join_coincident_intersects(&found.overlapping, &a, EPS);
        assert_eq!(slices.len(), 1);
        let s = &slices[0];
        assert_point(s.start_point(), 1.0, 0.0);
        assert_point(s.end_point(), 5.0, 0.0);
        assert_eq!((s.start_index1, s.end_index1), (0, 2));
        assert!(!s.opposing_directions);

        let [start, end] = s.pseudo_intersects(&a, &b, EPS);
        assert_eq!(start.start_index1, 0);
        assert_eq!(end.start_index1, 2);
        assert_eq!(end.start_index2, 0);
    }

    #[test]
    fn opposing_direction_is_flagged() {
        let a = Pline::from_points(&[Point2::new(0.0, 0.0), Point2::new(4.0, 0.0)], false);
        let b = Pline::from_points(&[Point2::new(3.0, 0.0), Point2::new(1.0, 0.0)], false);
        let found = find_intersects(&a, &b, &a.create_approx_spatial_index(), EPS);
        let slices = join_coincident_intersects(&found.overlapping, &a, EPS);
        assert_eq!(slices.len(), 1);
        assert!(slices[0].opposing_directions);
        assert_point(slices[0].start_point(), 1.0, 0.0);
        assert_point(slices[0].end_point(), 3.0, 0.0);
    }

    #[test]
    fn separate_runs_stay_separate() {
        let a = Pline::from_points(&[Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)], false);
        let b = Pline::from_points(
            &[
                Point2::new(1.0, 0.0),
                Point2::new(2.0, 0.0),
                Point2::new(2.0, 1.0),
                Point2::new(5.0, 1.0),
                Point2::new(5.0, 0.0),
                Point2::new(7.0, 0.0),
            ],
            false,
        );
        let found = find_intersects(&a, &b, &a.create_approx_spatial_index(), EPS);
        let slices = join_coincident_intersects(&found.overlapping, &a, EPS);
        assert_eq!(slices.len(), 2);
        assert_point(slices[0].end_point(), 2.0, 0.0);
        assert_point(slices[1].start_point(), 5.0, 0.0);
    }

    #[test]
    fn closed_seam_is_joined() {
        // Square whose seam vertex (0,0) sits inside an overlapping stretch along y = 0.
        let square = Pline::from_points(
            &[
                Point2::new(0.0, 0.0),
                Point2::new(4.0, 0.0),
                Point2::new(4.0, 4.0),
                Point2::new(-4.0, 4.0),
                Point2::new(-4.0, 0.0),
            ],
            true,
        );
        let line = Pline::from_points(&[Point2::new(-2.0, 0.0), Point2::new(2.0, 0.0)], false);
        let found = find_intersects(&square, &line, &square.create_approx_spatial_index(), EPS);
        assert_eq!(found.overlapping.len(), 2);
        let slices = join_coincident_intersects(&found.overlapping, &square, EPS);
        assert_eq!(slices.len(), 1);
        assert_point(slices[0].start_point(), -2.0, 0.0);
        assert_point(slices[0].end_point(), 2.0, 0.0);
        assert_eq!(slices[0].start_index1, 4);
        assert_eq!(slices[0].end_index1, 0);
    }

    #[test]
    fn arc_piece_keeps_sub_bulge() {
        // Upper unit semicircle against a quarter arc on the same circle.
        let half = Pline::from_vertices(
            vec![PlineVertex::new(1.0, 0.0, 1.0), PlineVertex::line(-1.0, 0.0)],
            false,
        );
        let quarter_bulge = (std::f64::consts::FRAC_PI_2 / 4.0).tan();
        let quarter = Pline::from_vertices(
            vec![PlineVertex::new(0.0, 1.0, quarter_bulge), PlineVertex::line(-1.0, 0.0)],
            false,
        );
        let found = find_intersects(&half, &quarter, &half.create_approx_spatial_index(), EPS);
        assert_eq!(found.overlapping.len(), 1);
        let slices = join_coincident_intersects(&found.overlapping, &half, EPS);
        assert_eq!(slices.len(), 1);
        let v0 = slices[0].pline.vertices[0];
        assert!((v0.bulge - quarter_bulge).abs() < 1e-9, "bulge={}", v0.bulge);
    }
}
