use std::collections::BTreeMap;

use tracing::{trace, warn};

use super::filter::OffsetValidator;
use crate::config::OffsetOptions;
use crate::error::{OperationError, Result};
use crate::geometry::pline::{Pline, PlineVertex};
use crate::geometry::segment::{seg_split_at_point, Segment};
use crate::math::vector_2d::points_fuzzy_eq;
use crate::math::Point2;
use crate::operations::query::coincident::join_coincident_intersects;
use crate::operations::query::pline_intersect::{
    all_self_intersects_as_basic, find_intersects, normalize_intersect_index, IntersectsCollection,
};

/// An open piece of the raw offset that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlineSlice {
    /// Raw offset segment the slice starts on.
    pub start_index: usize,
    pub pline: Pline,
}

/// Intersect points keyed by the raw offset segment they lie on, ordered by
/// distance along the segment.
#[derive(Debug, Default)]
struct IntersectLookup {
    points: BTreeMap<usize, Vec<Point2>>,
}

impl IntersectLookup {
    fn insert(&mut self, index: usize, point: Point2) {
        self.points.entry(index).or_default().push(point);
    }

    fn insert_collection(&mut self, raw: &Pline, intrs: &IntersectsCollection, eps: f64) {
        for intr in &intrs.basic {
            let index = normalize_intersect_index(raw, intr.start_index1, intr.point, eps);
            self.insert(index, intr.point);
        }
        for intr in &intrs.overlapping {
            for point in [intr.point1, intr.point2] {
                self.insert(normalize_intersect_index(raw, intr.start_index1, point, eps), point);
            }
        }
    }

    /// Orders each segment's points from the segment start and drops repeats.
    fn sort(&mut self, raw: &Pline, eps: f64) {
        for (&index, points) in &mut self.points {
            let v1 = raw.vertices[index];
            let v2 = raw.vertices[raw.next_wrapping_index(index)];
            let seg = Segment::from_vertices(&v1, &v2);
            points.sort_by(|a, b| seg.distance_along(*a).total_cmp(&seg.distance_along(*b)));
            points.dedup_by(|a, b| points_fuzzy_eq(*a, *b, eps));
        }
    }

    fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn first_on(&self, index: usize) -> Option<Point2> {
        self.points.get(&index).and_then(|points| points.first().copied())
    }
}

/// Cuts a raw offset at its intersects and keeps the valid pieces.
struct Slicer<'a> {
    raw: &'a Pline,
    lookup: IntersectLookup,
    validator: OffsetValidator<'a>,
    opts: &'a OffsetOptions,
    walk_limit: usize,
}

impl Slicer<'_> {
    fn segment(&self, index: usize) -> (PlineVertex, PlineVertex) {
        (
            self.raw.vertices[index],
            self.raw.vertices[self.raw.next_wrapping_index(index)],
        )
    }

    /// Extends `slice` along the raw offset from vertex `index` up to the
    /// next intersect, or to the end of an open raw offset.
    fn walk(&self, mut slice: Pline, mut index: usize) -> Result<Pline> {
        let eps = self.opts.pos_equal_eps;
        let last_index = self.raw.len() - 1;
        for _ in 0..self.walk_limit {
            if !self.raw.closed && index == last_index {
                slice.add_or_replace_vertex(self.raw.vertices[index].with_bulge(0.0), eps);
                return Ok(slice);
            }

            let (v1, v2) = self.segment(index);
            if let Some(point) = self.lookup.first_on(index) {
                let split = seg_split_at_point(&v1, &v2, point, eps);
                slice.add_or_replace_vertex(split.updated_start, eps);
                slice.add_or_replace_vertex(PlineVertex::from_point(point, 0.0), eps);
                return Ok(slice);
            }

            slice.add_or_replace_vertex(v1, eps);
            index = self.raw.next_wrapping_index(index);
        }

        warn!(limit = self.walk_limit, "slice walk did not reach an intersect");
        Err(OperationError::LoopGuardExceeded {
            stage: "slice",
            limit: self.walk_limit,
        }
        .into())
    }

    fn is_valid(&self, slice: &Pline) -> bool {
        let (Some(first), Some(last)) = (slice.vertices.first(), slice.last()) else {
            return false;
        };
        if slice.len() < 2 {
            return false;
        }
        let (start, end) = (first.pos(), last.pos());
        if points_fuzzy_eq(start, end, self.opts.pos_equal_eps)
            && slice.path_length() < self.opts.min_loop_length
        {
            trace!(length = slice.path_length(), "discarding short loop");
            return false;
        }
        if !self.validator.point_valid(start) || !self.validator.point_valid(end) {
            return false;
        }
        let midpoints_valid = slice.iter_segments().all(|(v1, v2)| {
            self.validator
                .point_valid(Segment::from_vertices(&v1, &v2).midpoint())
        });
        midpoints_valid && !self.validator.pline_intersects_original(slice)
    }

    fn push_if_valid(&self, start_index: usize, pline: Pline, out: &mut Vec<PlineSlice>) {
        if self.is_valid(&pline) {
            trace!(start_index, vertices = pline.len(), "slice kept");
            out.push(PlineSlice { start_index, pline });
        } else {
            trace!(start_index, vertices = pline.len(), "slice rejected");
        }
    }

    fn slice_all(&self) -> Result<Vec<PlineSlice>> {
        let eps = self.opts.pos_equal_eps;
        let mut result = Vec::new();

        if self.lookup.is_empty() && self.raw.closed {
            if self.validator.point_valid(self.raw.vertices[0].pos()) {
                let mut pline = self.raw.clone();
                pline.closed = false;
                pline.add_vertex(self.raw.vertices[0].with_bulge(0.0));
                result.push(PlineSlice { start_index: 0, pline });
            }
            return Ok(result);
        }

        if !self.raw.closed {
            let leading = self.walk(Pline::with_capacity(self.raw.len(), false), 0)?;
            self.push_if_valid(0, leading, &mut result);
        }

        for (&index, points) in &self.lookup.points {
            let (v1, v2) = self.segment(index);
            for pair in points.windows(2) {
                let from_first = seg_split_at_point(&v1, &v2, pair[0], eps).split_vertex;
                let start = seg_split_at_point(&from_first, &v2, pair[1], eps).updated_start;
                let mut slice = Pline::with_capacity(2, false);
                slice.add_vertex(start);
                slice.add_or_replace_vertex(PlineVertex::from_point(pair[1], 0.0), eps);
                self.push_if_valid(index, slice, &mut result);
            }

            let Some(&last_point) = points.last() else {
                continue;
            };
            let mut slice = Pline::new();
            slice.add_vertex(seg_split_at_point(&v1, &v2, last_point, eps).split_vertex);
            let slice = self.walk(slice, self.raw.next_wrapping_index(index))?;
            self.push_if_valid(index, slice, &mut result);
        }

        Ok(result)
    }
}

fn new_slicer<'a>(
    raw: &'a Pline,
    validator: OffsetValidator<'a>,
    opts: &'a OffsetOptions,
) -> Slicer<'a> {
    Slicer {
        raw,
        lookup: IntersectLookup::default(),
        validator,
        opts,
        walk_limit: raw.len() + 1,
    }
}

fn self_intersect_lookup(raw: &Pline, eps: f64) -> IntersectLookup {
    let mut lookup = IntersectLookup::default();
    let raw_index = raw.create_approx_spatial_index();
    for intr in all_self_intersects_as_basic(raw, &raw_index, eps) {
        lookup.insert(intr.start_index1, intr.point);
        lookup.insert(intr.start_index2, intr.point);
    }
    lookup
}

/// Closed polyline made of two half circles.
fn circle_pline(center: Point2, radius: f64) -> Pline {
    Pline::from_vertices(
        vec![
            PlineVertex::new(center.x - radius, center.y, 1.0),
            PlineVertex::new(center.x + radius, center.y, 1.0),
        ],
        true,
    )
}

/// Slices a raw offset at its own self-intersects.
///
/// Suited to closed input whose offset cannot cross the opposite side. A raw
/// offset without self-intersects is returned whole, as one open slice whose
/// last vertex repeats the first, provided its start point is valid.
///
/// # Errors
///
/// Returns [`OperationError::LoopGuardExceeded`] if walking the raw offset
/// fails to reach an intersect.
pub(crate) fn slices_from_raw_offset(
    original: &Pline,
    raw: &Pline,
    offset: f64,
    opts: &OffsetOptions,
) -> Result<Vec<PlineSlice>> {
    if raw.len() < 2 {
        return Ok(Vec::new());
    }
    let orig_index = original.create_approx_spatial_index();
    let validator = OffsetValidator::new(original, &orig_index, offset, opts);
    let mut slicer = new_slicer(raw, validator, opts);
    slicer.lookup = self_intersect_lookup(raw, opts.pos_equal_eps);
    slicer.lookup.sort(raw, opts.pos_equal_eps);
    trace!(segments = slicer.lookup.points.len(), "self intersects collected");
    slicer.slice_all()
}

/// Slices a raw offset at its self-intersects, its intersects with the raw
/// offset for the opposite distance, and (for open input) circles of radius
/// `|offset|` around the original end points.
///
/// Coincident stretches shared with the opposite raw offset contribute their
/// end points as intersects.
///
/// # Errors
///
/// Returns [`OperationError::LoopGuardExceeded`] if walking the raw offset
/// fails to reach an intersect.
pub(crate) fn slices_from_dual_raw_offsets(
    original: &Pline,
    raw: &Pline,
    dual_raw: &Pline,
    offset: f64,
    opts: &OffsetOptions,
) -> Result<Vec<PlineSlice>> {
    if raw.len() < 2 {
        return Ok(Vec::new());
    }
    let eps = opts.pos_equal_eps;
    let orig_index = original.create_approx_spatial_index();
    let raw_index = raw.create_approx_spatial_index();
    let validator = OffsetValidator::new(original, &orig_index, offset, opts);
    let mut slicer = new_slicer(raw, validator, opts);
    slicer.lookup = self_intersect_lookup(raw, eps);

    if dual_raw.len() > 1 {
        let dual_intrs = find_intersects(raw, dual_raw, &raw_index, eps);
        for coincident in join_coincident_intersects(&dual_intrs.overlapping, raw, eps) {
            for intr in coincident.pseudo_intersects(raw, dual_raw, eps) {
                slicer.lookup.insert(intr.start_index1, intr.point);
            }
        }
        for intr in &dual_intrs.basic {
            let index = normalize_intersect_index(raw, intr.start_index1, intr.point, eps);
            slicer.lookup.insert(index, intr.point);
        }
    }

    if !original.closed {
        let ends = [original.vertices.first(), original.last()];
        for end in ends.into_iter().flatten() {
            let circle = circle_pline(end.pos(), offset.abs());
            let intrs = find_intersects(raw, &circle, &raw_index, eps);
            slicer.lookup.insert_collection(raw, &intrs, eps);
        }
    }

    slicer.lookup.sort(raw, eps);
    trace!(segments = slicer.lookup.points.len(), "dual intersects collected");
    slicer.slice_all()
}
