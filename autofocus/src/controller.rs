//! Surface autofocus feedback controller.
//!
//! One call to [`SurfaceAutofocusController::run`] scans the configured
//! lateral area, reconstructs a volume cropped around the calibrated focus
//! pixel, detects the tissue surface, and decides whether the mean surface
//! offset is within tolerance. When it is not and auto-correction is on,
//! the stage z axis is moved by the offset, clamped to
//! [`MAX_CORRECTION_MM`](crate::decision::MAX_CORRECTION_MM).

use hardware::{Stage, StageTarget, TileScanRequest, TileScanner};
use serde::{Deserialize, Serialize};
use shared::{Length, LengthExt};

use crate::config::AutofocusConfig;
use crate::decision::{clamp_correction, decide, FocusDecision, FocusStatus};
use crate::pipeline::{boxed, ReconstructionRequest, SurfaceDetector, VolumeReconstructor};
use crate::scratch::ScanScratch;
use crate::state::AutofocusState;
use crate::surface::SurfaceMap;
use crate::AutofocusError;

/// Stage move made by a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AppliedCorrection {
    /// Mean surface offset before clamping
    pub requested_mm: f64,
    /// Clamped amount subtracted from stage z
    pub applied_mm: f64,
    pub from_z: Length,
    pub to_z: Length,
}

/// Result of one autofocus run.
#[derive(Debug, Clone)]
pub struct AutofocusOutcome {
    /// Surface map, already shifted by any applied correction
    pub surface: SurfaceMap,
    pub decision: FocusDecision,
    pub correction: Option<AppliedCorrection>,
    /// States in the order visited, ending with `Done`
    pub visited_states: Vec<AutofocusState>,
}

impl AutofocusOutcome {
    pub fn final_state(&self) -> Option<AutofocusState> {
        self.visited_states.last().copied()
    }
}

/// Scan → reconstruct → detect → decide → correct.
pub struct SurfaceAutofocusController<T, R, D>
where
    T: TileScanner,
    R: VolumeReconstructor,
    D: SurfaceDetector,
{
    config: AutofocusConfig,
    scanner: T,
    reconstructor: R,
    detector: D,
}

impl<T, R, D> SurfaceAutofocusController<T, R, D>
where
    T: TileScanner,
    R: VolumeReconstructor,
    D: SurfaceDetector,
{
    pub fn new(
        config: AutofocusConfig,
        scanner: T,
        reconstructor: R,
        detector: D,
    ) -> Result<Self, AutofocusError> {
        config.validate()?;
        Ok(Self {
            config,
            scanner,
            reconstructor,
            detector,
        })
    }

    pub fn config(&self) -> &AutofocusConfig {
        &self.config
    }

    pub fn scanner(&self) -> &T {
        &self.scanner
    }

    pub fn reconstructor(&self) -> &R {
        &self.reconstructor
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Run one autofocus cycle.
    ///
    /// The stage is only touched in the `Correcting` state. Any collaborator
    /// failure aborts the run; the temporary scan folder is removed either way.
    pub fn run<S: Stage>(&mut self, stage: &mut S) -> Result<AutofocusOutcome, AutofocusError> {
        let focus_pixel = self
            .config
            .focus_position_in_image_zpix
            .ok_or(AutofocusError::MissingFocusPosition)?;

        if !self.config.hardware_enabled {
            log::info!("Hardware disabled, returning an empty surface map");
            let surface = SurfaceMap::nan_filled(
                self.config.x_range,
                self.config.y_range,
                self.config.pixel_size,
            );
            return Ok(AutofocusOutcome {
                surface,
                decision: FocusDecision::unverifiable(),
                correction: None,
                visited_states: vec![AutofocusState::Simulated, AutofocusState::Done],
            });
        }

        let mut visited = Vec::with_capacity(6);

        visited.push(AutofocusState::Scanning);
        let request = TileScanRequest {
            x_range: self.config.x_range,
            y_range: self.config.y_range,
            pixel_size: self.config.pixel_size,
        };
        request.validate()?;
        let scratch = ScanScratch::create(self.config.temp_dir_parent.as_deref())?;
        let metadata = self.scanner.scan(&request, scratch.path())?;
        log::info!(
            "Scanned {} tiles into {}",
            metadata.tiles,
            scratch.path().display()
        );

        visited.push(AutofocusState::Reconstructing);
        let reconstruction = ReconstructionRequest {
            focus_pixel,
            dispersion_quadratic_term: self.config.dispersion_quadratic_term,
            crop: self.config.crop,
        };
        let (volume, dims) = self
            .reconstructor
            .reconstruct(scratch.path(), &reconstruction)
            .map_err(|e| AutofocusError::Reconstruction(boxed(e)))?;
        log::debug!("Reconstructed volume of shape {:?}", volume.dim());

        visited.push(AutofocusState::Detecting);
        let mut surface = self
            .detector
            .detect(&volume, &dims)
            .map_err(|e| AutofocusError::Detection(boxed(e)))?;
        drop(scratch);

        visited.push(AutofocusState::Deciding);
        let offset_mm = surface.mean_offset(self.config.roi.as_ref());
        let decision = decide(offset_mm, self.config.acceptable_range_mm);
        log::info!(
            "Surface {} ({:.0}% of points detected)",
            decision,
            100.0 * surface.detected_fraction()
        );

        let mut correction = None;
        match decision.status() {
            FocusStatus::InFocus => {}
            FocusStatus::Unverifiable => {
                log::warn!("Cannot verify focus: no surface point was detected");
            }
            FocusStatus::OutOfFocus if !self.config.auto_correct => {
                if let Some(instruction) = decision.operator_instruction() {
                    log::warn!("{instruction}");
                }
            }
            FocusStatus::OutOfFocus => {
                visited.push(AutofocusState::Correcting);
                let applied = self.correct(stage, decision.offset_mm)?;
                surface.shift(applied.applied_mm);
                correction = Some(applied);
            }
        }

        visited.push(AutofocusState::Done);
        Ok(AutofocusOutcome {
            surface,
            decision,
            correction,
            visited_states: visited,
        })
    }

    fn correct<S: Stage>(&self, stage: &mut S, offset_mm: f64) -> Result<AppliedCorrection, AutofocusError> {
        let applied_mm = clamp_correction(offset_mm);
        if applied_mm != offset_mm {
            log::warn!(
                "Requested correction {:+.4} mm exceeds the safety limit, applying {:+.4} mm",
                offset_mm,
                applied_mm
            );
        }

        let from_z = stage.position()?.z;
        let target = StageTarget::z(from_z - Length::from_millimeters(applied_mm));
        stage.travel().check(&target)?;
        let reached = stage.set_position(target)?;
        log::info!(
            "Moved stage z from {:.4} mm to {:.4} mm",
            from_z.as_millimeters(),
            reached.z.as_millimeters()
        );

        Ok(AppliedCorrection {
            requested_mm: offset_mm,
            applied_mm,
            from_z,
            to_z: reached.z,
        })
    }
}
