use tracing::{trace, warn};

use crate::config::OffsetOptions;
use crate::error::{OperationError, Result};
use crate::geometry::pline::{fwd_wrapping_dist, Pline};
use crate::math::vector_2d::points_fuzzy_eq;
use crate::math::Point2;
use crate::spatial_index::{Aabb, StaticSpatialIndex};

use super::slice::PlineSlice;

fn slice_start(slice: &PlineSlice) -> Point2 {
    slice.pline.vertices.first().map_or_else(Point2::origin, |v| v.pos())
}

fn slice_end(slice: &PlineSlice) -> Point2 {
    slice.pline.last().map_or_else(Point2::origin, |v| v.pos())
}

/// Joins slices end to start into the final offset polylines.
///
/// Each chain grows from the first unvisited slice. The next slice is picked
/// among those starting within `slice_join_eps` of the chain end, nearest by
/// forward raw-offset index from the current slice; on a tie a slice that
/// closes the chain wins. A chain whose ends meet becomes a closed polyline.
///
/// Slices shorter than `slice_join_eps` are skipped, joined vertices closer
/// than `pos_equal_eps` are merged, and closed results enclosing no area are
/// dropped.
///
/// # Errors
///
/// Returns [`OperationError::LoopGuardExceeded`] if a chain keeps growing
/// past the number of slices.
pub(crate) fn stitch_slices_together(
    slices: &[PlineSlice],
    raw_len: usize,
    opts: &OffsetOptions,
) -> Result<Vec<Pline>> {
    if slices.is_empty() {
        return Ok(Vec::new());
    }
    let join_eps = opts.slice_join_eps;
    let index = StaticSpatialIndex::build(
        slices
            .iter()
            .map(|s| Aabb::around_point(slice_start(s), join_eps))
            .collect(),
    );

    let mut visited: Vec<bool> = slices
        .iter()
        .map(|s| s.pline.path_length() < join_eps)
        .collect();
    let mut result = Vec::new();
    let limit = slices.len();

    for first in 0..slices.len() {
        if visited[first] {
            continue;
        }
        visited[first] = true;

        let initial_start = slice_start(&slices[first]);
        let mut current = first;
        let mut chain = slices[first].pline.clone();
        let mut steps = 0;

        loop {
            steps += 1;
            if steps > limit {
                warn!(limit, "slice stitching did not terminate");
                return Err(OperationError::LoopGuardExceeded {
                    stage: "stitch",
                    limit,
                }
                .into());
            }

            let origin = slices[current].start_index;
            let end = chain.last().map_or(initial_start, |v| v.pos());
            let mut candidates: Vec<(usize, usize, bool)> = index
                .query(&Aabb::around_point(end, join_eps))
                .into_iter()
                .filter(|&i| !visited[i])
                .map(|i| {
                    let dist = fwd_wrapping_dist(origin, slices[i].start_index, raw_len);
                    let closes =
                        points_fuzzy_eq(slice_end(&slices[i]), initial_start, opts.pos_equal_eps);
                    (i, dist, closes)
                })
                .collect();
            candidates.sort_by(|a, b| a.1.cmp(&b.1).then(b.2.cmp(&a.2)));

            let Some(&(next, dist, closes)) = candidates.first() else {
                break;
            };
            trace!(from = current, to = next, dist, closes, "stitching slice");
            chain.remove_last();
            for v in &slices[next].pline.vertices {
                chain.add_or_replace_vertex(*v, opts.pos_equal_eps);
            }
            visited[next] = true;
            current = next;
        }

        if chain.len() > 1 {
            let closes = chain
                .last()
                .is_some_and(|last| points_fuzzy_eq(last.pos(), initial_start, join_eps));
            if closes {
                chain.remove_last();
                chain.closed = true;
            }
        }
        if chain.closed && chain.area().abs() < opts.pos_equal_eps {
            trace!(vertices = chain.len(), "dropping loop without area");
            continue;
        }
        if chain.len() > 1 {
            result.push(chain);
        }
    }

    Ok(result)
}
