//! Acquisition interfaces of the spectral-domain scanner.

use std::path::{Path, PathBuf};

use ndarray::Array3;
use serde::{Deserialize, Serialize};
use shared::{Dimensions, Length, LengthExt};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    /// Scanner failed to deliver data
    #[error("acquisition failed: {0}")]
    Acquisition(String),

    /// Request cannot be executed as specified
    #[error("invalid scan request: {0}")]
    InvalidRequest(String),

    /// Scan output could not be written or read back
    #[error("scan i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Single acquisition with the sample displaced along the optical axis.
///
/// Used by calibration, which scans a reference target at a series of depth
/// offsets and reconstructs each one itself.
pub trait SpectralScanner {
    /// Acquire one raw interferogram `[lambda, x, y]` with the sample moved
    /// `depth_offset` along the optical axis, together with its dimension-set.
    fn acquire(&mut self, depth_offset: Length) -> Result<(Array3<f64>, Dimensions), ScanError>;
}

/// Lateral area requested from a tiled scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileScanRequest {
    pub x_range: (Length, Length),
    pub y_range: (Length, Length),
    pub pixel_size: Length,
}

impl TileScanRequest {
    pub fn from_millimeters(x_range_mm: (f64, f64), y_range_mm: (f64, f64), pixel_size_um: f64) -> Self {
        Self {
            x_range: (
                Length::from_millimeters(x_range_mm.0),
                Length::from_millimeters(x_range_mm.1),
            ),
            y_range: (
                Length::from_millimeters(y_range_mm.0),
                Length::from_millimeters(y_range_mm.1),
            ),
            pixel_size: Length::from_micrometers(pixel_size_um),
        }
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        for (name, (start, end)) in [("x", self.x_range), ("y", self.y_range)] {
            if !(end > start) {
                return Err(ScanError::InvalidRequest(format!(
                    "{name} range must be increasing, got [{:.4}, {:.4}] mm",
                    start.as_millimeters(),
                    end.as_millimeters()
                )));
            }
        }
        let pixel_um = self.pixel_size.as_micrometers();
        if !(pixel_um.is_finite() && pixel_um > 0.0) {
            return Err(ScanError::InvalidRequest(format!(
                "pixel size must be positive, got {pixel_um} um"
            )));
        }
        Ok(())
    }
}

/// What a tiled scan left in its output directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanMetadata {
    pub output_dir: PathBuf,
    pub tiles: usize,
}

/// Tiled volumetric scan written to disk.
pub trait TileScanner {
    /// Scan `request` into `output_dir`, which exists and is empty.
    fn scan(&mut self, request: &TileScanRequest, output_dir: &Path) -> Result<ScanMetadata, ScanError>;
}
