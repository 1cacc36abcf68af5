//! Seams to the reconstruction and surface-detection collaborators.
//!
//! Both run outside this crate: the reconstructor reads the tiles the scanner
//! wrote to disk and the detector locates the tissue interface in the
//! resulting volume. Their error types are boxed into [`CollaboratorError`]
//! when they reach the controller.

use std::path::Path;

use ndarray::Array3;
use serde::{Deserialize, Serialize};
use shared::Dimensions;

use crate::config::CropPolicy;
use crate::error::CollaboratorError;
use crate::surface::SurfaceMap;

/// Parameters handed to the volume reconstructor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconstructionRequest {
    pub focus_pixel: usize,
    pub dispersion_quadratic_term: f64,
    pub crop: CropPolicy,
}

impl ReconstructionRequest {
    /// Depth pixel range the crop keeps, clipped to `depth_len`.
    pub fn depth_window(&self, depth_len: usize) -> std::ops::Range<usize> {
        match self.crop {
            CropPolicy::Full => 0..depth_len,
            CropPolicy::AroundFocus { half_height_pix } => {
                let start = self.focus_pixel.saturating_sub(half_height_pix).min(depth_len);
                let end = self
                    .focus_pixel
                    .saturating_add(half_height_pix + 1)
                    .min(depth_len);
                start..end
            }
        }
    }
}

/// Reconstructs an intensity volume from a directory of scan tiles.
pub trait VolumeReconstructor {
    type Error: std::error::Error + Send + Sync + 'static;

    fn reconstruct(
        &mut self,
        scan_dir: &Path,
        request: &ReconstructionRequest,
    ) -> Result<(Array3<f64>, Dimensions), Self::Error>;
}

/// Locates the tissue surface in a reconstructed volume.
///
/// Lateral positions without a detectable surface are NaN in the map.
pub trait SurfaceDetector {
    type Error: std::error::Error + Send + Sync + 'static;

    fn detect(&mut self, volume: &Array3<f64>, dims: &Dimensions) -> Result<SurfaceMap, Self::Error>;
}

pub(crate) fn boxed<E: std::error::Error + Send + Sync + 'static>(err: E) -> CollaboratorError {
    Box::new(err)
}
