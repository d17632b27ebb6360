pub mod pline_offset;

pub use pline_offset::{
    parallel_offset, parallel_offset_with_options, raw_offset, raw_offset_with_options,
    PlineOffset2D,
};
