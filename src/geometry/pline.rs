use super::segment::{seg_fast_approx_bbox, Segment};
use crate::error::{GeometryError, Result};
use crate::math::arc_2d::angle_from_bulge;
use crate::math::vector_2d::points_fuzzy_eq;
use crate::math::{Point2, TOLERANCE};
use crate::spatial_index::{Aabb, StaticSpatialIndex};

/// Bulge-encoded polyline vertex for mixed line/arc segments.
///
/// `bulge = tan(sweep_angle / 4)`:
/// - `0` = straight line to next vertex
/// - `> 0` = counter-clockwise arc to next vertex
/// - `< 0` = clockwise arc to next vertex
/// - `|bulge| = 1` = semicircle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlineVertex {
    pub x: f64,
    pub y: f64,
    pub bulge: f64,
}

impl PlineVertex {
    /// Creates a new vertex with the given coordinates and bulge.
    #[must_use]
    pub fn new(x: f64, y: f64, bulge: f64) -> Self {
        Self { x, y, bulge }
    }

    /// Creates a line vertex (bulge = 0).
    #[must_use]
    pub fn line(x: f64, y: f64) -> Self {
        Self { x, y, bulge: 0.0 }
    }

    #[must_use]
    pub fn from_point(point: Point2, bulge: f64) -> Self {
        Self::new(point.x, point.y, bulge)
    }

    /// Position of the vertex.
    #[must_use]
    pub fn pos(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    #[must_use]
    pub fn with_bulge(&self, bulge: f64) -> Self {
        Self::new(self.x, self.y, bulge)
    }

    #[must_use]
    pub fn bulge_is_zero(&self) -> bool {
        self.bulge.abs() < TOLERANCE
    }

    #[must_use]
    pub fn bulge_is_neg(&self) -> bool {
        self.bulge < 0.0
    }
}

/// Forward steps from `start` to `end` over `len` indexes, wrapping past the end.
pub(crate) fn fwd_wrapping_dist(start: usize, end: usize, len: usize) -> usize {
    if start <= end {
        end - start
    } else {
        len - start + end
    }
}

/// A polyline with mixed straight-line and circular-arc segments.
///
/// Each segment between consecutive vertices is either a line (bulge=0)
/// or a circular arc (bulge≠0). For closed polylines, the last vertex
/// connects back to the first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pline {
    pub vertices: Vec<PlineVertex>,
    pub closed: bool,
}

impl Pline {
    /// Creates an empty open polyline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty polyline with room for `capacity` vertices.
    #[must_use]
    pub fn with_capacity(capacity: usize, closed: bool) -> Self {
        Self {
            vertices: Vec::with_capacity(capacity),
            closed,
        }
    }

    #[must_use]
    pub fn from_vertices(vertices: Vec<PlineVertex>, closed: bool) -> Self {
        Self { vertices, closed }
    }

    /// Creates a `Pline` from points with all-zero bulges (line segments only).
    #[must_use]
    pub fn from_points(points: &[Point2], closed: bool) -> Self {
        let vertices = points
            .iter()
            .map(|p| PlineVertex::line(p.x, p.y))
            .collect();
        Self { vertices, closed }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn add(&mut self, x: f64, y: f64, bulge: f64) {
        self.vertices.push(PlineVertex::new(x, y, bulge));
    }

    pub fn add_vertex(&mut self, vertex: PlineVertex) {
        self.vertices.push(vertex);
    }

    /// Appends a vertex, or only overwrites the last vertex's bulge when the
    /// positions are within `pos_equal_eps`.
    pub fn add_or_replace(&mut self, x: f64, y: f64, bulge: f64, pos_equal_eps: f64) {
        self.add_or_replace_vertex(PlineVertex::new(x, y, bulge), pos_equal_eps);
    }

    /// Vertex form of [`Pline::add_or_replace`].
    pub fn add_or_replace_vertex(&mut self, vertex: PlineVertex, pos_equal_eps: f64) {
        if let Some(last) = self.vertices.last_mut() {
            if points_fuzzy_eq(last.pos(), vertex.pos(), pos_equal_eps) {
                last.bulge = vertex.bulge;
                return;
            }
        }
        self.vertices.push(vertex);
    }

    #[must_use]
    pub fn last(&self) -> Option<&PlineVertex> {
        self.vertices.last()
    }

    pub fn last_mut(&mut self) -> Option<&mut PlineVertex> {
        self.vertices.last_mut()
    }

    pub fn remove_last(&mut self) -> Option<PlineVertex> {
        self.vertices.pop()
    }

    /// Index after `index`, wrapping to `0` past the last vertex.
    #[must_use]
    pub fn next_wrapping_index(&self, index: usize) -> usize {
        if index + 1 >= self.vertices.len() {
            0
        } else {
            index + 1
        }
    }

    /// Index before `index`, wrapping to the last vertex before `0`.
    #[must_use]
    pub fn prev_wrapping_index(&self, index: usize) -> usize {
        if index == 0 {
            self.vertices.len().saturating_sub(1)
        } else {
            index - 1
        }
    }

    /// Number of forward steps from `start` to `end`, wrapping around the
    /// end of the vertex list.
    #[must_use]
    pub fn fwd_wrapping_dist(&self, start: usize, end: usize) -> usize {
        fwd_wrapping_dist(start, end, self.vertices.len())
    }

    /// Returns the number of segments in this polyline.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        let n = self.vertices.len();
        if n < 2 {
            return 0;
        }
        if self.closed {
            n
        } else {
            n - 1
        }
    }

    /// Iterates over `(start, end)` vertex pairs of every segment, including
    /// the closing segment of a closed polyline.
    pub fn iter_segments(&self) -> impl Iterator<Item = (PlineVertex, PlineVertex)> + '_ {
        (0..self.segment_count()).map(move |i| {
            (
                self.vertices[i],
                self.vertices[self.next_wrapping_index(i)],
            )
        })
    }

    /// Returns a new polyline with vertices in reverse order and negated bulges.
    ///
    /// For a segment `v[i] → v[i+1]` with bulge `b`, the reversed segment
    /// `v[i+1] → v[i]` has bulge `-b` (arc direction flips).
    #[must_use]
    pub fn reversed(&self) -> Self {
        let m = self.vertices.len();
        if m == 0 {
            return self.clone();
        }
        let mut new_verts = Vec::with_capacity(m);
        for j in 0..m {
            let orig_idx = m - 1 - j;
            let bulge = if j < m - 1 {
                -self.vertices[m - 2 - j].bulge
            } else if self.closed {
                // Closing segment runs v[0] -> v[m-1] after reversal.
                -self.vertices[m - 1].bulge
            } else {
                0.0
            };
            new_verts.push(PlineVertex::new(
                self.vertices[orig_idx].x,
                self.vertices[orig_idx].y,
                bulge,
            ));
        }
        Self {
            vertices: new_verts,
            closed: self.closed,
        }
    }

    /// Returns a copy with consecutive repeated positions collapsed.
    ///
    /// The later vertex's bulge wins, since the zero-length segment between
    /// the repeats carries no geometry. For closed polylines a last vertex
    /// repeating the first is dropped.
    #[must_use]
    pub fn remove_repeat_pos(&self, pos_equal_eps: f64) -> Self {
        let mut result = Self::with_capacity(self.vertices.len(), self.closed);
        for v in &self.vertices {
            result.add_or_replace_vertex(*v, pos_equal_eps);
        }
        if self.closed && result.vertices.len() > 1 {
            let first = result.vertices[0].pos();
            if let Some(last) = result.last() {
                if points_fuzzy_eq(first, last.pos(), pos_equal_eps) {
                    result.remove_last();
                }
            }
        }
        result
    }

    /// Total length of all segments.
    #[must_use]
    pub fn path_length(&self) -> f64 {
        self.iter_segments()
            .map(|(v1, v2)| Segment::from_vertices(&v1, &v2).length())
            .sum()
    }

    /// Signed enclosed area: positive for counter-clockwise, `0.0` for open
    /// polylines.
    #[must_use]
    pub fn area(&self) -> f64 {
        if !self.closed {
            return 0.0;
        }
        self.iter_segments()
            .map(|(v1, v2)| {
                let chord_term = (v1.x * v2.y - v2.x * v1.y) / 2.0;
                match Segment::from_vertices(&v1, &v2) {
                    Segment::Line { .. } => chord_term,
                    Segment::Arc { bulge, radius, .. } => {
                        // Circular segment between the chord and the arc.
                        let sweep = angle_from_bulge(bulge);
                        chord_term + radius * radius * (sweep - sweep.sin()) / 2.0
                    }
                }
            })
            .sum()
    }

    /// Exact bounding box, or `None` for an empty polyline.
    #[must_use]
    pub fn extents(&self) -> Option<Aabb> {
        let first = self.vertices.first()?;
        let point_box = Aabb::new(first.x, first.y, first.x, first.y);
        Some(
            self.iter_segments()
                .map(|(v1, v2)| Segment::from_vertices(&v1, &v2).bounding_box())
                .fold(point_box, |acc, b| acc.union(&b)),
        )
    }

    /// Checks that every coordinate and bulge is finite.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NonFinite`] on the first NaN or infinite value.
    pub fn validate(&self) -> Result<()> {
        let all_finite = self
            .vertices
            .iter()
            .all(|v| v.x.is_finite() && v.y.is_finite() && v.bulge.is_finite());
        if all_finite {
            Ok(())
        } else {
            Err(GeometryError::NonFinite("polyline vertex").into())
        }
    }

    /// Builds a spatial index over conservative bounding boxes of every
    /// segment; index `i` refers to the segment starting at vertex `i`.
    #[must_use]
    pub fn create_approx_spatial_index(&self) -> StaticSpatialIndex {
        let boxes = self
            .iter_segments()
            .map(|(v1, v2)| seg_fast_approx_bbox(&v1, &v2))
            .collect();
        StaticSpatialIndex::build(boxes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn square(closed: bool) -> Pline {
        Pline::from_points(
            &[
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 1.0),
            ],
            closed,
        )
    }

    fn circle(radius: f64) -> Pline {
        Pline::from_vertices(
            vec![
                PlineVertex::new(-radius, 0.0, 1.0),
                PlineVertex::new(radius, 0.0, 1.0),
            ],
            true,
        )
    }

    #[test]
    fn from_points_creates_line_only() {
        let pline = square(false);
        assert_eq!(pline.len(), 4);
        assert_eq!(pline.segment_count(), 3);
        for v in &pline.vertices {
            assert!(v.bulge_is_zero());
        }
    }

    #[test]
    fn segment_count_closed_and_degenerate() {
        assert_eq!(square(true).segment_count(), 4);
        assert_eq!(Pline::new().segment_count(), 0);
        let single = Pline::from_vertices(vec![PlineVertex::line(0.0, 0.0)], true);
        assert_eq!(single.segment_count(), 0);
    }

    #[test]
    fn add_or_replace_merges_repeats() {
        let mut pline = Pline::new();
        pline.add(0.0, 0.0, 0.0);
        pline.add_or_replace(1.0, 0.0, 0.0, 1e-5);
        pline.add_or_replace(1.0 + 1e-7, 0.0, 0.5, 1e-5);
        assert_eq!(pline.len(), 2);
        assert!((pline.vertices[1].bulge - 0.5).abs() < 1e-12);
        assert!((pline.vertices[1].x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn wrapping_indexes() {
        let pline = square(true);
        assert_eq!(pline.next_wrapping_index(3), 0);
        assert_eq!(pline.next_wrapping_index(1), 2);
        assert_eq!(pline.prev_wrapping_index(0), 3);
        assert_eq!(pline.fwd_wrapping_dist(1, 3), 2);
        assert_eq!(pline.fwd_wrapping_dist(3, 1), 2);
        assert_eq!(pline.fwd_wrapping_dist(2, 2), 0);
    }

    #[test]
    fn reversed_line_only() {
        let rev = square(false).reversed();
        assert_eq!(rev.len(), 4);
        assert!((rev.vertices[0].x).abs() < 1e-12);
        assert!((rev.vertices[0].y - 1.0).abs() < 1e-12);
        assert!((rev.vertices[3].x).abs() < 1e-12);
        assert!((rev.vertices[3].y).abs() < 1e-12);
        for v in &rev.vertices {
            assert!(v.bulge.abs() < 1e-12);
        }
    }

    #[test]
    fn reversed_with_arc() {
        let pline = Pline::from_vertices(
            vec![
                PlineVertex::line(0.0, 0.0),
                PlineVertex::new(2.0, 0.0, 1.0),
                PlineVertex::line(4.0, 0.0),
            ],
            false,
        );
        let rev = pline.reversed();
        // Reversed: (4,0) → (2,0) → (0,0)
        assert!((rev.vertices[0].bulge + 1.0).abs() < 1e-12);
        assert!(rev.vertices[1].bulge.abs() < 1e-12);
    }

    #[test]
    fn reversed_closed_keeps_area_magnitude() {
        let c = circle(2.0);
        let rev = c.reversed();
        assert!((rev.area() + c.area()).abs() < 1e-9, "area={}", rev.area());
        assert!(rev.vertices.iter().all(|v| (v.bulge + 1.0).abs() < 1e-12));
    }

    #[test]
    fn remove_repeat_pos_keeps_later_bulge() {
        let pline = Pline::from_vertices(
            vec![
                PlineVertex::line(0.0, 0.0),
                PlineVertex::line(1.0, 0.0),
                PlineVertex::new(1.0, 0.0, 0.5),
                PlineVertex::line(2.0, 0.0),
                PlineVertex::line(0.0, 0.0),
            ],
            true,
        );
        let cleaned = pline.remove_repeat_pos(1e-5);
        assert_eq!(cleaned.len(), 3);
        assert!((cleaned.vertices[1].bulge - 0.5).abs() < 1e-12);
        assert!(cleaned.closed);
    }

    #[test]
    fn area_and_length() {
        let sq = square(true);
        assert!((sq.area() - 1.0).abs() < 1e-12);
        assert!((sq.path_length() - 4.0).abs() < 1e-12);
        assert!(square(false).area().abs() < 1e-12);
        assert!((square(false).path_length() - 3.0).abs() < 1e-12);

        let c = circle(5.0);
        assert!((c.area() - 25.0 * PI).abs() < 1e-9, "area={}", c.area());
        assert!((c.path_length() - 10.0 * PI).abs() < 1e-9);
        assert!((c.reversed().area() + 25.0 * PI).abs() < 1e-9);
    }

    #[test]
    fn extents_include_arc_bulge() {
        let ext = circle(5.0).extents().unwrap();
        assert!((ext.min_x + 5.0).abs() < 1e-9 && (ext.max_x - 5.0).abs() < 1e-9);
        assert!((ext.min_y + 5.0).abs() < 1e-9 && (ext.max_y - 5.0).abs() < 1e-9);
        assert!(Pline::new().extents().is_none());
    }

    #[test]
    fn validate_rejects_nan() {
        let mut pline = square(true);
        assert!(pline.validate().is_ok());
        pline.vertices[2].y = f64::NAN;
        assert!(pline.validate().is_err());
    }

    #[test]
    fn spatial_index_covers_segments() {
        let pline = square(true);
        let index = pline.create_approx_spatial_index();
        assert_eq!(index.len(), 4);
        let hits = index.query(&Aabb::around_point(Point2::new(1.0, 0.5), 0.1));
        assert_eq!(hits, vec![1]);
        for (i, aabb) in index.item_boxes().iter().enumerate() {
            assert!(aabb.overlaps(&Aabb::around_point(pline.vertices[i].pos(), 0.0)));
        }
    }
}
