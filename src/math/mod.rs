pub mod arc_2d;
pub mod distance_2d;
pub mod intersect_2d;
pub mod vector_2d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Threshold below which a bulge or an angle is treated as zero.
///
/// This is a representation cutoff, not a geometric tolerance; positional
/// tolerances are carried by [`crate::config::OffsetOptions`].
pub const TOLERANCE: f64 = 1e-8;
