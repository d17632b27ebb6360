mod filter;
mod raw_offset;
mod slice;
mod stitch;

use tracing::debug;

use crate::config::OffsetOptions;
use crate::error::{GeometryError, Result};
use crate::geometry::pline::Pline;

/// Offsets a polyline (with potential arc segments) using the slice-and-stitch
/// algorithm.
///
/// Positive distances offset to the left of the direction of travel, which is
/// inward for a counter-clockwise closed polyline; negative distances offset
/// to the right. Open results carry no end caps.
#[derive(Debug, Clone)]
pub struct PlineOffset2D {
    pline: Pline,
    distance: f64,
    options: OffsetOptions,
}

impl PlineOffset2D {
    /// Creates a new polyline offset operation with default tolerances.
    #[must_use]
    pub fn new(pline: Pline, distance: f64) -> Self {
        Self {
            pline,
            distance,
            options: OffsetOptions::default(),
        }
    }

    /// Replaces the tolerances used by every stage.
    #[must_use]
    pub fn with_options(mut self, options: OffsetOptions) -> Self {
        self.options = options;
        self
    }

    fn check_input(&self) -> Result<()> {
        self.options.validate()?;
        self.pline.validate()?;
        if !self.distance.is_finite() {
            return Err(GeometryError::NonFinite("offset distance").into());
        }
        Ok(())
    }

    /// Builds the raw offset only: every segment offset and joined, without
    /// removing self-intersections.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidTolerance`] for bad options and
    /// [`GeometryError::NonFinite`] for non-finite input.
    pub fn raw(&self) -> Result<Pline> {
        self.check_input()?;
        let pline = self.pline.remove_repeat_pos(self.options.pos_equal_eps);
        Ok(raw_offset::create_raw_offset_polyline(&pline, self.distance, &self.options))
    }

    /// Executes the offset, returning zero or more result polylines.
    ///
    /// Input with fewer than two distinct vertices, and offsets that consume
    /// the whole shape, give an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidTolerance`] for bad options,
    /// [`GeometryError::NonFinite`] for non-finite input, and
    /// [`OperationError::LoopGuardExceeded`](crate::error::OperationError::LoopGuardExceeded)
    /// if slicing or stitching fails to terminate.
    pub fn execute(&self) -> Result<Vec<Pline>> {
        self.check_input()?;
        let opts = &self.options;
        let pline = self.pline.remove_repeat_pos(opts.pos_equal_eps);
        if pline.len() < 2 {
            return Ok(Vec::new());
        }
        if self.distance.abs() < opts.fuzzy_eps {
            return Ok(vec![pline]);
        }

        let raw = raw_offset::create_raw_offset_polyline(&pline, self.distance, opts);
        debug!(vertices = raw.len(), closed = raw.closed, "raw offset built");
        if raw.len() < 2 {
            return Ok(Vec::new());
        }

        let slices = if pline.closed && !opts.handle_self_intersects {
            slice::slices_from_raw_offset(&pline, &raw, self.distance, opts)?
        } else {
            let dual = raw_offset::create_raw_offset_polyline(&pline, -self.distance, opts);
            debug!(vertices = dual.len(), "dual raw offset built");
            slice::slices_from_dual_raw_offsets(&pline, &raw, &dual, self.distance, opts)?
        };
        debug!(slices = slices.len(), "offset slices produced");

        let result = stitch::stitch_slices_together(&slices, raw.len(), opts)?;
        debug!(polylines = result.len(), "offset slices stitched");
        Ok(result)
    }
}

/// Parallel offset of `pline` by `distance` with default tolerances.
///
/// # Errors
///
/// See [`PlineOffset2D::execute`].
pub fn parallel_offset(pline: &Pline, distance: f64) -> Result<Vec<Pline>> {
    parallel_offset_with_options(pline, distance, &OffsetOptions::default())
}

/// Parallel offset of `pline` by `distance`.
///
/// # Errors
///
/// See [`PlineOffset2D::execute`].
pub fn parallel_offset_with_options(
    pline: &Pline,
    distance: f64,
    options: &OffsetOptions,
) -> Result<Vec<Pline>> {
    PlineOffset2D::new(pline.clone(), distance)
        .with_options(*options)
        .execute()
}

/// Raw offset of `pline` by `distance` with default tolerances. The result
/// may self-intersect.
///
/// # Errors
///
/// See [`PlineOffset2D::raw`].
pub fn raw_offset(pline: &Pline, distance: f64) -> Result<Pline> {
    raw_offset_with_options(pline, distance, &OffsetOptions::default())
}

/// Raw offset of `pline` by `distance`. The result may self-intersect.
///
/// # Errors
///
/// See [`PlineOffset2D::raw`].
pub fn raw_offset_with_options(
    pline: &Pline,
    distance: f64,
    options: &OffsetOptions,
) -> Result<Pline> {
    PlineOffset2D::new(pline.clone(), distance)
        .with_options(*options)
        .raw()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::PlineOffsetError;
    use crate::geometry::pline::PlineVertex;
    use crate::operations::query::pline_intersect::find_self_intersects;

    fn square_pline() -> Pline {
        Pline {
            vertices: vec![
                PlineVertex::line(0.0, 0.0),
                PlineVertex::line(10.0, 0.0),
                PlineVertex::line(10.0, 10.0),
                PlineVertex::line(0.0, 10.0),
            ],
            closed: true,
        }
    }

    #[test]
    fn square_inward_offset() {
        let op = PlineOffset2D::new(square_pline(), 1.0);
        let result = op.execute().unwrap();
        assert_eq!(result.len(), 1);
        // The inward offset of a 10x10 square by 1 is an 8x8 square.
        let poly = &result[0];
        assert_eq!(poly.vertices.len(), 4, "expected 4 vertices");
        assert!(poly.closed);
        assert!((poly.area() - 64.0).abs() < 1e-6, "area={}", poly.area());
    }

    #[test]
    fn square_outward_offset() {
        let op = PlineOffset2D::new(square_pline(), -1.0);
        let result = op.execute().unwrap();
        assert_eq!(result.len(), 1);
        let poly = &result[0];
        // Four sides plus a rounding arc at each corner.
        assert_eq!(poly.vertices.len(), 8, "expected 8 vertices");
        let expected = 140.0 + std::f64::consts::PI;
        assert!((poly.area() - expected).abs() < 1e-6, "area={}", poly.area());
    }

    #[test]
    fn square_collapses_when_offset_too_large() {
        let result = PlineOffset2D::new(square_pline(), 6.0).execute().unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn no_self_intersection_passthrough() {
        // A simple triangle offset inward, no self-intersections expected.
        let pline = Pline {
            vertices: vec![
                PlineVertex::line(0.0, 0.0),
                PlineVertex::line(10.0, 0.0),
                PlineVertex::line(5.0, 8.66),
            ],
            closed: true,
        };
        let op = PlineOffset2D::new(pline, 0.5);
        let result = op.execute().unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].vertices.len(), 3);
    }

    #[test]
    fn zero_distance_returns_input() {
        let result = PlineOffset2D::new(square_pline(), 0.0).execute().unwrap();
        assert_eq!(result, vec![square_pline()]);
    }

    #[test]
    fn short_input_is_empty() {
        let pline = Pline::from_vertices(
            vec![PlineVertex::line(1.0, 1.0), PlineVertex::line(1.0, 1.0)],
            false,
        );
        assert!(PlineOffset2D::new(pline, 1.0).execute().unwrap().is_empty());
    }

    #[test]
    fn rejects_non_finite_distance() {
        let err = PlineOffset2D::new(square_pline(), f64::NAN).execute().unwrap_err();
        assert!(matches!(err, PlineOffsetError::Geometry(GeometryError::NonFinite(_))));
    }

    #[test]
    fn rejects_bad_options() {
        let opts = OffsetOptions::default().with_pos_equal_eps(-1.0);
        let err = PlineOffset2D::new(square_pline(), 1.0)
            .with_options(opts)
            .execute()
            .unwrap_err();
        assert!(matches!(err, PlineOffsetError::Geometry(GeometryError::InvalidTolerance { .. })));
    }

    // ── Arc segment tests ──

    /// A rounded rectangle: two horizontal lines connected by semicircular arcs.
    fn rounded_rect_pline() -> Pline {
        Pline {
            vertices: vec![
                PlineVertex::line(0.0, 0.0),
                PlineVertex::new(10.0, 0.0, 1.0),
                PlineVertex::line(10.0, 4.0),
                PlineVertex::new(0.0, 4.0, 1.0),
            ],
            closed: true,
        }
    }

    #[test]
    fn rounded_rect_inward_offset() {
        let result = PlineOffset2D::new(rounded_rect_pline(), 0.5).execute().unwrap();
        assert_eq!(result.len(), 1);
        let poly = &result[0];
        let has_arcs = poly.vertices.iter().any(|v| v.bulge.abs() > 1e-6);
        assert!(has_arcs, "result should contain arc segments");
        // Stadium of straight length 10 and radius 1.5.
        let expected = 10.0 * 3.0 + std::f64::consts::PI * 1.5 * 1.5;
        assert!((poly.area() - expected).abs() < 1e-6, "area={}", poly.area());
    }

    #[test]
    fn rounded_rect_outward_offset() {
        let result = PlineOffset2D::new(rounded_rect_pline(), -0.5).execute().unwrap();
        assert_eq!(result.len(), 1);
        let expected = 10.0 * 5.0 + std::f64::consts::PI * 2.5 * 2.5;
        assert!((result[0].area() - expected).abs() < 1e-6, "area={}", result[0].area());
    }

    #[test]
    fn semicircle_arc_no_self_intersect() {
        let pline = Pline {
            vertices: vec![
                PlineVertex::line(0.0, 0.0),
                PlineVertex::new(5.0, 0.0, 1.0),
                PlineVertex::line(10.0, 0.0),
            ],
            closed: false,
        };
        let result = PlineOffset2D::new(pline, 0.5).execute().unwrap();
        assert_eq!(result.len(), 1);
        assert!(!result[0].closed, "open pline offset should stay open");
        assert!(find_self_intersects(&result[0], 1e-5).is_empty());
    }

    // ── Open polyline tests ──

    #[test]
    fn open_l_shape_left_offset() {
        let pline = Pline::from_points(
            &[
                crate::math::Point2::new(0.0, 0.0),
                crate::math::Point2::new(5.0, 0.0),
                crate::math::Point2::new(5.0, 5.0),
            ],
            false,
        );
        let result = PlineOffset2D::new(pline, 0.5).execute().unwrap();
        assert_eq!(result.len(), 1);
        assert!(!result[0].closed, "result should be open");
        assert_eq!(result[0].vertices.len(), 3);
    }

    #[test]
    fn open_l_shape_right_offset() {
        let pline = Pline::from_points(
            &[
                crate::math::Point2::new(0.0, 0.0),
                crate::math::Point2::new(5.0, 0.0),
                crate::math::Point2::new(5.0, 5.0),
            ],
            false,
        );
        let result = PlineOffset2D::new(pline, -0.5).execute().unwrap();
        assert_eq!(result.len(), 1);
        assert!(!result[0].closed, "result should be open");
        // Corner rounded by a connecting arc.
        assert_eq!(result[0].vertices.len(), 4);
    }

    #[test]
    fn open_straight_line_offset() {
        let pline = Pline {
            vertices: vec![PlineVertex::line(0.0, 0.0), PlineVertex::line(10.0, 0.0)],
            closed: false,
        };
        let result = PlineOffset2D::new(pline, 1.0).execute().unwrap();
        assert_eq!(result.len(), 1);
        assert!(!result[0].closed, "result should be open");
        assert_eq!(result[0].vertices.len(), 2);
        for v in &result[0].vertices {
            assert!((v.y - 1.0).abs() < 1e-9, "y should be 1.0, got {}", v.y);
        }
    }

    #[test]
    fn mixed_line_arc_square_with_rounded_corner() {
        let bulge = std::f64::consts::FRAC_PI_8.tan();
        let pline = Pline {
            vertices: vec![
                PlineVertex::line(0.0, 0.0),
                PlineVertex::line(10.0, 0.0),
                PlineVertex::new(10.0, 10.0, bulge),
                PlineVertex::line(0.0, 10.0),
            ],
            closed: true,
        };
        let result = PlineOffset2D::new(pline, 0.5).execute().unwrap();
        assert_eq!(result.len(), 1);
        assert!(result[0].closed);
    }

    #[test]
    fn raw_matches_free_function() {
        let op = PlineOffset2D::new(square_pline(), 1.0);
        assert_eq!(op.raw().unwrap(), raw_offset(&square_pline(), 1.0).unwrap());
        assert_eq!(
            op.execute().unwrap(),
            parallel_offset(&square_pline(), 1.0).unwrap()
        );
    }
}
