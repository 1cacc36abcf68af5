use hardware::ScanError;
use oct::OctError;
use thiserror::Error;

/// Error during dispersion/focus calibration
#[derive(Error, Debug)]
pub enum CalibrationError {
    /// Configuration rejected at construction
    #[error("invalid calibration config: {0}")]
    InvalidConfig(String),

    /// Scanner failed to deliver an acquisition
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// Reconstruction of an acquisition failed
    #[error("reconstruction error: {0}")]
    Reconstruction(#[from] OctError),

    /// Reference target is not planar or the setup is wrong
    #[error(
        "sanity check failed: column ({x}, {y}) peaks {deviation_pix:.2} px from focus pixel \
         {focus_pixel} (limit {limit_pix:.2} px)"
    )]
    SanityCheckFailed {
        x: usize,
        y: usize,
        deviation_pix: f64,
        focus_pixel: usize,
        limit_pix: f64,
    },

    /// Focus pixel at the edge of (or outside) the depth axis
    #[error("focus pixel {pixel:?} not strictly inside depth axis of length {depth_len}")]
    FocusOutOfRange { pixel: Option<usize>, depth_len: usize },

    /// Search finished without any usable acquisition
    #[error("no calibration samples acquired")]
    NoSamples,
}
