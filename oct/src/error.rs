use shared::algo::InterpError;
use shared::DimensionError;
use thiserror::Error;

/// Errors produced by reconstruction and simulation.
#[derive(Error, Debug)]
pub enum OctError {
    /// Requested behaviour is deliberately not implemented.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Array shape and dimension-set disagree.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(#[from] DimensionError),

    /// Sample grid could not be resampled.
    #[error("resampling failed: {0}")]
    Resampling(#[from] InterpError),

    /// Parameter or input outside its valid domain.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
