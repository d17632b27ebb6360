pub mod config;
pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod spatial_index;

pub use config::OffsetOptions;
pub use error::{PlineOffsetError, Result};
pub use geometry::{Pline, PlineVertex};
pub use operations::offset::{
    parallel_offset, parallel_offset_with_options, raw_offset, raw_offset_with_options,
    PlineOffset2D,
};
