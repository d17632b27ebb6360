use thiserror::Error;

/// Top-level error type for polyline offsetting.
#[derive(Debug, Error)]
pub enum PlineOffsetError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Precondition violations on geometric input.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("arc requested for a segment with zero bulge")]
    ZeroBulge,

    #[error("arc requested between coincident vertices at ({x}, {y})")]
    CoincidentVertices { x: f64, y: f64 },

    #[error("non-finite value in {0}")]
    NonFinite(&'static str),

    #[error("tolerance {name} = {value} must be positive and finite")]
    InvalidTolerance { name: &'static str, value: f64 },
}

/// Failures inside the offset pipeline.
#[derive(Debug, Error, PartialEq)]
pub enum OperationError {
    #[error("{stage} exceeded its iteration bound of {limit}")]
    LoopGuardExceeded { stage: &'static str, limit: usize },
}

/// Convenience type alias for results using [`PlineOffsetError`].
pub type Result<T> = std::result::Result<T, PlineOffsetError>;
