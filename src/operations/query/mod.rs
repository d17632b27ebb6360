pub mod coincident;
pub mod pline_intersect;

pub use coincident::{join_coincident_intersects, CoincidentSlice};
pub use pline_intersect::{
    find_intersects, find_self_intersects, BasicIntersect, IntersectsCollection,
    OverlappingIntersect,
};
