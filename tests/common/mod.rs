#![allow(dead_code)]

use pline_offset::geometry::Segment;
use pline_offset::math::Point2;
use pline_offset::operations::query::find_self_intersects;
use pline_offset::{Pline, PlineVertex};

/// Installs a test-writer subscriber once; `RUST_LOG` controls verbosity.
pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .try_init();
}

/// Counter-clockwise axis-aligned rectangle with its corner at the origin.
pub fn rect(width: f64, height: f64) -> Pline {
    Pline::from_points(
        &[
            Point2::new(0.0, 0.0),
            Point2::new(width, 0.0),
            Point2::new(width, height),
            Point2::new(0.0, height),
        ],
        true,
    )
}

/// Counter-clockwise circle built from two half circles.
pub fn circle(center: Point2, radius: f64) -> Pline {
    Pline::from_vertices(
        vec![
            PlineVertex::new(center.x - radius, center.y, 1.0),
            PlineVertex::new(center.x + radius, center.y, 1.0),
        ],
        true,
    )
}

pub fn open(points: &[(f64, f64)]) -> Pline {
    let points: Vec<Point2> = points.iter().map(|&(x, y)| Point2::new(x, y)).collect();
    Pline::from_points(&points, false)
}

pub fn closed(points: &[(f64, f64)]) -> Pline {
    let points: Vec<Point2> = points.iter().map(|&(x, y)| Point2::new(x, y)).collect();
    Pline::from_points(&points, true)
}

/// Shortest distance from `point` to any segment of `pline`.
pub fn distance_to(pline: &Pline, point: Point2) -> f64 {
    pline
        .iter_segments()
        .map(|(v1, v2)| {
            let closest = Segment::from_vertices(&v1, &v2).closest_point(point);
            (closest - point).norm()
        })
        .fold(f64::INFINITY, f64::min)
}

/// Every vertex of every result sits at the offset distance from `original`.
pub fn assert_at_offset_distance(original: &Pline, results: &[Pline], distance: f64) {
    for result in results {
        for v in &result.vertices {
            let d = distance_to(original, v.pos());
            assert!(
                (d - distance.abs()).abs() < 1e-6,
                "vertex {v:?} is {d} from the original, expected {}",
                distance.abs()
            );
        }
    }
}

pub fn assert_no_self_intersects(results: &[Pline]) {
    for result in results {
        let found = find_self_intersects(result, 1e-5);
        assert!(found.is_empty(), "self intersects in {result:?}: {found:?}");
    }
}
