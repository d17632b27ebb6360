pub mod pline;
pub mod seg_intersect;
pub mod segment;

pub use pline::{Pline, PlineVertex};
pub use seg_intersect::{segments_intersect, SegIntr};
pub use segment::Segment;
