use tracing::trace;

use crate::config::OffsetOptions;
use crate::geometry::pline::{Pline, PlineVertex};
use crate::geometry::segment::Segment;
use crate::math::arc_2d::{
    angle_from_bulge, bulge_from_angle, delta_angle_signed, point_within_arc_sweep,
};
use crate::math::intersect_2d::{
    circle_circle_intr, line_circle_intr, line_line_intr, CircleCircleIntr, LineCircleIntr,
    LineLineIntr,
};
use crate::math::vector_2d::{angle, dist_squared, fuzzy_in_range, lerp, points_fuzzy_eq, unit_perp};
use crate::math::Point2;

/// A segment of the original polyline moved sideways by the offset distance,
/// before neighbouring segments are joined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RawOffsetSeg {
    pub v1: PlineVertex,
    pub v2: PlineVertex,
    /// End point of the original segment; center of any connecting arc.
    pub orig_v2_pos: Point2,
    /// The offset arc's radius collapsed to zero or below; the segment was
    /// turned into a line.
    pub collapsed_arc: bool,
}

/// Offsets every non-degenerate segment of `pline` independently.
///
/// Lines move along their left normal by `offset`. Arcs keep their center and
/// change radius: a counter-clockwise arc shrinks for a positive offset, a
/// clockwise one grows.
pub(crate) fn create_untrimmed_raw_offset_segs(
    pline: &Pline,
    offset: f64,
    opts: &OffsetOptions,
) -> Vec<RawOffsetSeg> {
    let mut result = Vec::with_capacity(pline.segment_count());
    for (v1, v2) in pline.iter_segments() {
        if points_fuzzy_eq(v1.pos(), v2.pos(), opts.pos_equal_eps) {
            continue;
        }

        match Segment::from_vertices(&v1, &v2) {
            Segment::Line { start, end } => {
                let shift = unit_perp(end - start) * offset;
                result.push(RawOffsetSeg {
                    v1: PlineVertex::from_point(start + shift, 0.0),
                    v2: PlineVertex::from_point(end + shift, 0.0),
                    orig_v2_pos: end,
                    collapsed_arc: false,
                });
            }
            Segment::Arc {
                start,
                end,
                bulge,
                radius,
                center,
            } => {
                let offs = if bulge < 0.0 { offset } else { -offset };
                let radius_after = radius + offs;
                let new_start = start + (start - center) * (offs / radius);
                let new_end = end + (end - center) * (offs / radius);
                let collapsed_arc = radius_after <= opts.fuzzy_eps;
                result.push(RawOffsetSeg {
                    v1: PlineVertex::from_point(new_start, if collapsed_arc { 0.0 } else { bulge }),
                    v2: PlineVertex::from_point(new_end, v2.bulge),
                    orig_v2_pos: end,
                    collapsed_arc,
                });
            }
        }
    }
    result
}

/// Vertices of the arc joining the end of `s1` to the start of `s2`, centered
/// on the original vertex between them.
fn connect_using_arc(
    s1: &RawOffsetSeg,
    s2: &RawOffsetSeg,
    connection_arcs_ccw: bool,
) -> [PlineVertex; 2] {
    let center = s1.orig_v2_pos;
    let sp = s1.v2.pos();
    let ep = s2.v1.pos();
    let sweep = delta_angle_signed(angle(center, sp), angle(center, ep), !connection_arcs_ccw);
    [
        PlineVertex::from_point(sp, bulge_from_angle(sweep)),
        PlineVertex::from_point(ep, s2.v1.bulge),
    ]
}

struct JoinContext {
    connection_arcs_ccw: bool,
    pos_equal_eps: f64,
}

impl JoinContext {
    fn connect(&self, s1: &RawOffsetSeg, s2: &RawOffsetSeg, result: &mut Pline) {
        for v in connect_using_arc(s1, s2, self.connection_arcs_ccw) {
            result.add_or_replace_vertex(v, self.pos_equal_eps);
        }
    }

    fn in_unit_range(&self, t: f64, p0: Point2, p1: Point2) -> bool {
        let len = (p1 - p0).norm();
        let t_eps = if len > 0.0 { self.pos_equal_eps / len } else { self.pos_equal_eps };
        fuzzy_in_range(0.0, t, 1.0, t_eps)
    }
}

/// Bulge of the part of arc `v1 -> v2` (around `center`) that remains after
/// trimming its start to `point`; falls back to the full bulge when `point`
/// is outside the sweep.
fn remaining_arc_bulge(v1: &PlineVertex, v2: &PlineVertex, center: Point2, point: Point2) -> f64 {
    let sweep = angle_from_bulge(v1.bulge);
    let remaining =
        delta_angle_signed(angle(center, point), angle(center, v2.pos()), v1.bulge < 0.0);
    if remaining.abs() <= sweep.abs() {
        bulge_from_angle(remaining)
    } else {
        v1.bulge
    }
}

/// Shortens the arc ending the result polyline so it stops at `point`.
fn trim_last_arc_to(result: &mut Pline, center: Point2, arc_end: Point2, point: Point2) {
    let Some(prev) = result.last_mut() else {
        return;
    };
    if prev.bulge_is_zero() {
        return;
    }
    let start_angle = angle(center, prev.pos());
    let full_sweep = delta_angle_signed(start_angle, angle(center, arc_end), prev.bulge < 0.0);
    let trimmed = delta_angle_signed(start_angle, angle(center, point), prev.bulge < 0.0);
    if trimmed.abs() <= full_sweep.abs() {
        prev.bulge = bulge_from_angle(trimmed);
    }
}

fn line_line_join(s1: &RawOffsetSeg, s2: &RawOffsetSeg, ctx: &JoinContext, result: &mut Pline) {
    if s1.collapsed_arc || s2.collapsed_arc {
        ctx.connect(s1, s2, result);
        return;
    }

    let (v1, v2, u1, u2) = (s1.v1.pos(), s1.v2.pos(), s2.v1.pos(), s2.v2.pos());
    match line_line_intr(v1, v2, u1, u2, ctx.pos_equal_eps) {
        LineLineIntr::OneIntersect { seg1_t, .. } => {
            let point = lerp(v1, v2, seg1_t);
            result.add_or_replace_vertex(PlineVertex::from_point(point, 0.0), ctx.pos_equal_eps);
        }
        LineLineIntr::Coincident { .. } => {
            result.add_or_replace_vertex(PlineVertex::from_point(v2, 0.0), ctx.pos_equal_eps);
        }
        LineLineIntr::Parallel | LineLineIntr::NoIntersect { .. } => ctx.connect(s1, s2, result),
    }
}

fn line_arc_join(
    s1: &RawOffsetSeg,
    s2: &RawOffsetSeg,
    arc_radius: f64,
    arc_center: Point2,
    ctx: &JoinContext,
    result: &mut Pline,
) {
    let (v1, v2) = (s1.v1.pos(), s1.v2.pos());
    let (u1, u2) = (s2.v1, s2.v2);
    let process_intersect = |t: f64, intersect: Point2, result: &mut Pline| {
        let on_line = ctx.in_unit_range(t, v1, v2);
        let on_arc = point_within_arc_sweep(
            arc_center,
            u1.pos(),
            u2.pos(),
            u1.bulge_is_neg(),
            intersect,
            ctx.pos_equal_eps,
        );
        if on_line && on_arc {
            let bulge = remaining_arc_bulge(&u1, &u2, arc_center, intersect);
            result.add_or_replace_vertex(
                PlineVertex::from_point(intersect, bulge),
                ctx.pos_equal_eps,
            );
        } else {
            ctx.connect(s1, s2, result);
        }
    };

    match line_circle_intr(v1, v2, arc_radius, arc_center, ctx.pos_equal_eps) {
        LineCircleIntr::NoIntersect => ctx.connect(s1, s2, result),
        LineCircleIntr::TangentIntersect { t0 } => process_intersect(t0, lerp(v1, v2, t0), result),
        LineCircleIntr::TwoIntersects { t0, t1 } => {
            let (p0, p1) = (lerp(v1, v2, t0), lerp(v1, v2, t1));
            if dist_squared(p0, s1.orig_v2_pos) < dist_squared(p1, s1.orig_v2_pos) {
                process_intersect(t0, p0, result);
            } else {
                process_intersect(t1, p1, result);
            }
        }
    }
}

fn arc_line_join(
    s1: &RawOffsetSeg,
    s2: &RawOffsetSeg,
    arc_radius: f64,
    arc_center: Point2,
    ctx: &JoinContext,
    result: &mut Pline,
) {
    let (v1, v2) = (s1.v1, s1.v2);
    let (u1, u2) = (s2.v1.pos(), s2.v2.pos());
    let process_intersect = |t: f64, intersect: Point2, result: &mut Pline| {
        let on_line = ctx.in_unit_range(t, u1, u2);
        let on_arc = point_within_arc_sweep(
            arc_center,
            v1.pos(),
            v2.pos(),
            v1.bulge_is_neg(),
            intersect,
            ctx.pos_equal_eps,
        );
        if on_line && on_arc {
            trim_last_arc_to(result, arc_center, v2.pos(), intersect);
            result.add_or_replace_vertex(
                PlineVertex::from_point(intersect, 0.0),
                ctx.pos_equal_eps,
            );
        } else {
            ctx.connect(s1, s2, result);
        }
    };

    match line_circle_intr(u1, u2, arc_radius, arc_center, ctx.pos_equal_eps) {
        LineCircleIntr::NoIntersect => ctx.connect(s1, s2, result),
        LineCircleIntr::TangentIntersect { t0 } => process_intersect(t0, lerp(u1, u2, t0), result),
        LineCircleIntr::TwoIntersects { t0, t1 } => {
            let (p0, p1) = (lerp(u1, u2, t0), lerp(u1, u2, t1));
            if dist_squared(p0, s1.orig_v2_pos) < dist_squared(p1, s1.orig_v2_pos) {
                process_intersect(t0, p0, result);
            } else {
                process_intersect(t1, p1, result);
            }
        }
    }
}

fn arc_arc_join(
    s1: &RawOffsetSeg,
    s2: &RawOffsetSeg,
    (arc1_radius, arc1_center): (f64, Point2),
    (arc2_radius, arc2_center): (f64, Point2),
    ctx: &JoinContext,
    result: &mut Pline,
) {
    let (v1, v2) = (s1.v1, s1.v2);
    let (u1, u2) = (s2.v1, s2.v2);
    let eps = ctx.pos_equal_eps;
    let on_both_arcs = |p: Point2| {
        point_within_arc_sweep(arc1_center, v1.pos(), v2.pos(), v1.bulge_is_neg(), p, eps)
            && point_within_arc_sweep(arc2_center, u1.pos(), u2.pos(), u1.bulge_is_neg(), p, eps)
    };
    let process_intersect = |intersect: Point2, result: &mut Pline| {
        if !on_both_arcs(intersect) {
            ctx.connect(s1, s2, result);
            return;
        }
        trim_last_arc_to(result, arc1_center, v2.pos(), intersect);
        let bulge = remaining_arc_bulge(&u1, &u2, arc2_center, intersect);
        result.add_or_replace_vertex(PlineVertex::from_point(intersect, bulge), ctx.pos_equal_eps);
    };

    match circle_circle_intr(arc1_radius, arc1_center, arc2_radius, arc2_center, eps) {
        CircleCircleIntr::Separate | CircleCircleIntr::Contained => ctx.connect(s1, s2, result),
        CircleCircleIntr::TangentIntersect { point } => process_intersect(point, result),
        CircleCircleIntr::TwoIntersects { point1, point2 } => {
            if dist_squared(point1, s1.orig_v2_pos) < dist_squared(point2, s1.orig_v2_pos) {
                process_intersect(point1, result);
            } else {
                process_intersect(point2, result);
            }
        }
        // Same circle: the arcs continue each other, nothing to trim.
        CircleCircleIntr::Coincident => result.add_or_replace_vertex(u1, ctx.pos_equal_eps),
    }
}

/// Joins `s1` to `s2` at their shared original vertex, appending to `result`.
fn join_seg_pair(s1: &RawOffsetSeg, s2: &RawOffsetSeg, ctx: &JoinContext, result: &mut Pline) {
    let seg1 = Segment::from_vertices(&s1.v1, &s1.v2);
    let seg2 = Segment::from_vertices(&s2.v1, &s2.v2);
    match (seg1, seg2) {
        (Segment::Line { .. }, Segment::Line { .. }) => {
            trace!(kind = "line-line", "joining raw offset segments");
            line_line_join(s1, s2, ctx, result);
        }
        (Segment::Line { .. }, Segment::Arc { radius, center, .. }) => {
            trace!(kind = "line-arc", "joining raw offset segments");
            line_arc_join(s1, s2, radius, center, ctx, result);
        }
        (Segment::Arc { radius, center, .. }, Segment::Line { .. }) => {
            trace!(kind = "arc-line", "joining raw offset segments");
            arc_line_join(s1, s2, radius, center, ctx, result);
        }
        (
            Segment::Arc {
                radius: r1,
                center: c1,
                ..
            },
            Segment::Arc {
                radius: r2,
                center: c2,
                ..
            },
        ) => {
            trace!(kind = "arc-arc", "joining raw offset segments");
            arc_arc_join(s1, s2, (r1, c1), (r2, c2), ctx, result);
        }
    }
}

/// Builds the raw offset polyline: every segment offset and joined to its
/// neighbours, without removing any self-intersections.
///
/// Returns an empty polyline when fewer than two vertices survive joining.
pub(crate) fn create_raw_offset_polyline(
    pline: &Pline,
    offset: f64,
    opts: &OffsetOptions,
) -> Pline {
    if pline.len() < 2 {
        return Pline::new();
    }
    let segs = create_untrimmed_raw_offset_segs(pline, offset, opts);
    let Some(first_seg) = segs.first() else {
        return Pline::new();
    };
    if segs.len() == 1 && first_seg.collapsed_arc {
        return Pline::new();
    }

    let ctx = JoinContext {
        connection_arcs_ccw: offset < 0.0,
        pos_equal_eps: opts.pos_equal_eps,
    };
    let eps = opts.pos_equal_eps;
    let mut result = Pline::with_capacity(pline.len() * 2, pline.closed);
    result.add_vertex(first_seg.v1);

    if segs.len() > 1 {
        join_seg_pair(&segs[0], &segs[1], &ctx, &mut result);
    }
    let first_vertex_replaced = result.len() == 1;

    for pair in segs.windows(2).skip(1) {
        join_seg_pair(&pair[0], &pair[1], &ctx, &mut result);
    }

    if pline.closed && result.len() > 1 {
        close_raw_offset(&segs, &ctx, first_vertex_replaced, &mut result);
    } else if let Some(last_seg) = segs.last() {
        result.add_or_replace_vertex(last_seg.v2, eps);
    }

    if result.len() == 1 {
        result.vertices.clear();
    }
    result
}

/// Joins the last segment back to the first on a closed polyline.
///
/// The join is built in a scratch polyline seeded with the current last
/// vertex, then spliced in; the first vertex is moved to where the closing
/// join ends unless the first join already replaced it.
fn close_raw_offset(
    segs: &[RawOffsetSeg],
    ctx: &JoinContext,
    first_vertex_replaced: bool,
    result: &mut Pline,
) {
    let (Some(s1), Some(s2), Some(last)) = (segs.last(), segs.first(), result.last().copied())
    else {
        return;
    };
    let eps = ctx.pos_equal_eps;

    let mut closing = Pline::new();
    closing.add_vertex(last);
    join_seg_pair(s1, s2, ctx, &mut closing);

    if let Some(l) = result.last_mut() {
        *l = closing.vertices[0];
    }
    for v in closing.vertices.iter().skip(1) {
        result.add_vertex(*v);
    }

    if !first_vertex_replaced {
        if let Some(updated_first) = closing.last().map(PlineVertex::pos) {
            update_first_vertex(result, updated_first);
        }
    }

    // Final singularity prune across the seam.
    let last_index = result.len() - 1;
    if result.len() > 1
        && points_fuzzy_eq(result.vertices[0].pos(), result.vertices[last_index].pos(), eps)
    {
        result.remove_last();
    }
    if result.len() > 1
        && points_fuzzy_eq(result.vertices[0].pos(), result.vertices[1].pos(), eps)
    {
        result.vertices.remove(0);
    }
}

fn update_first_vertex(result: &mut Pline, updated_first: Point2) {
    let first = result.vertices[0];
    if first.bulge_is_zero() || result.len() < 2 {
        result.vertices[0].x = updated_first.x;
        result.vertices[0].y = updated_first.y;
        return;
    }

    let second = result.vertices[1];
    let Segment::Arc { center, .. } = Segment::from_vertices(&first, &second) else {
        result.vertices[0].x = updated_first.x;
        result.vertices[0].y = updated_first.y;
        return;
    };
    let sweep = angle_from_bulge(first.bulge);
    let updated = delta_angle_signed(
        angle(center, updated_first),
        angle(center, second.pos()),
        first.bulge < 0.0,
    );
    if updated.abs() <= sweep.abs() {
        result.vertices[0] = PlineVertex::from_point(updated_first, bulge_from_angle(updated));
    } else {
        // Moved outside its own arc: only the position changes, and the
        // seam prune drops it.
        result.vertices[0].x = updated_first.x;
        result.vertices[0].y = updated_first.y;
    }
}
