use crate::error::{GeometryError, Result};
use crate::math::TOLERANCE;

/// Tolerances and switches for parallel offsetting.
///
/// Every stage of the pipeline reads its thresholds from here; the defaults
/// suit drawings with coordinates in the range of roughly `1e-2` to `1e5`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetOptions {
    /// Distance below which two positions are the same point.
    pub pos_equal_eps: f64,
    /// Slack subtracted from the offset when testing whether a point is too
    /// close to the original polyline.
    pub offset_dist_eps: f64,
    /// Distance within which slice endpoints are joined during stitching.
    pub slice_join_eps: f64,
    /// Numeric cutoff for near-zero quantities; also the radius at or below
    /// which an offset arc is treated as collapsed.
    pub fuzzy_eps: f64,
    /// Closed loops with a shorter path length are discarded.
    pub min_loop_length: f64,
    /// Run the dual-sided slicing path for closed input, which tolerates
    /// self-intersecting closed polylines.
    pub handle_self_intersects: bool,
}

impl Default for OffsetOptions {
    fn default() -> Self {
        Self {
            pos_equal_eps: 1e-5,
            offset_dist_eps: 1e-4,
            slice_join_eps: 1e-4,
            fuzzy_eps: TOLERANCE,
            min_loop_length: 1e-2,
            handle_self_intersects: false,
        }
    }
}

impl OffsetOptions {
    #[must_use]
    pub fn with_pos_equal_eps(mut self, eps: f64) -> Self {
        self.pos_equal_eps = eps;
        self
    }

    #[must_use]
    pub fn with_offset_dist_eps(mut self, eps: f64) -> Self {
        self.offset_dist_eps = eps;
        self
    }

    #[must_use]
    pub fn with_slice_join_eps(mut self, eps: f64) -> Self {
        self.slice_join_eps = eps;
        self
    }

    #[must_use]
    pub fn with_fuzzy_eps(mut self, eps: f64) -> Self {
        self.fuzzy_eps = eps;
        self
    }

    #[must_use]
    pub fn with_min_loop_length(mut self, length: f64) -> Self {
        self.min_loop_length = length;
        self
    }

    #[must_use]
    pub fn with_handle_self_intersects(mut self, handle: bool) -> Self {
        self.handle_self_intersects = handle;
        self
    }

    /// Checks that every tolerance is positive and finite.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidTolerance`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("pos_equal_eps", self.pos_equal_eps),
            ("offset_dist_eps", self.offset_dist_eps),
            ("slice_join_eps", self.slice_join_eps),
            ("fuzzy_eps", self.fuzzy_eps),
            ("min_loop_length", self.min_loop_length),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(GeometryError::InvalidTolerance { name, value }.into());
            }
        }
        Ok(())
    }
}
