use thiserror::Error;

/// Errors returned by gvm operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GvmError {
    #[error("gvm: capacity must be positive, got {0}")]
    InvalidCapacity(usize),

    #[error("gvm: space must have at least one dimension, got {0}")]
    InvalidDimension(usize),

    #[error("gvm: dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("gvm: mass must be finite and non-negative, got {0}")]
    InvalidMass(f64),

    #[error("gvm: point coordinates must be finite")]
    NonFinitePoint,

    #[error("gvm: max variance must not be NaN, got {0}")]
    InvalidMaxVariance(f64),
}
