use hardware::{ScanError, StageError};
use thiserror::Error;

/// Boxed error returned by an external collaborator.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by the surface autofocus controller.
#[derive(Error, Debug)]
pub enum AutofocusError {
    /// No calibrated focus pixel was supplied.
    #[error("focus_position_in_image_zpix is required; run calibration first")]
    MissingFocusPosition,

    /// Configuration rejected before any work started.
    #[error("invalid autofocus config: {0}")]
    InvalidConfig(String),

    /// Surface map arrays and coordinate vectors disagree.
    #[error("invalid surface map: {0}")]
    InvalidSurface(String),

    /// Tiled scan failed.
    #[error("scan failed: {0}")]
    Scan(#[from] ScanError),

    /// Volume reconstruction failed.
    #[error("volume reconstruction failed: {0}")]
    Reconstruction(#[source] CollaboratorError),

    /// Surface detection failed outright (undetectable points are NaN, not errors).
    #[error("surface detection failed: {0}")]
    Detection(#[source] CollaboratorError),

    /// Stage query or move failed.
    #[error("stage error: {0}")]
    Stage(#[from] StageError),

    /// Temporary scan storage could not be created.
    #[error("temporary scan storage: {0}")]
    TempStorage(#[source] std::io::Error),
}
