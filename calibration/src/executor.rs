//! Dispersion/focus calibration executor
//!
//! Runs the full procedure against a glass-slide reference: coarse-to-fine
//! depth search, dispersion estimation, focus pixel localization, planarity
//! check and the optional pixel-size diagnostic.

use hardware::SpectralScanner;
use oct::{depth_pixel_size, OctError};
use shared::{Dimensions, Length, LengthExt};
use tracing::info;

use crate::diagnostics::{pixel_size_diagnostic, PixelSizeDiagnostic};
use crate::dispersion::{estimate_dispersion, DispersionEstimate};
use crate::focus::localize_focus;
use crate::sanity::{check_planarity, PlanarityCheck};
use crate::search::{coarse_to_fine, SearchSchedule};
use crate::session::{CalibrationSession, SessionSample};
use crate::{CalibrationConfig, CalibrationError, CalibrationResult};

/// Everything a calibration run produced.
#[derive(Debug, Clone)]
pub struct CalibrationReport {
    pub result: CalibrationResult,
    /// Stage depth the search settled on
    pub best_depth: Length,
    pub dispersion: DispersionEstimate,
    pub planarity: PlanarityCheck,
    pub pixel_size: Option<PixelSizeDiagnostic>,
    pub session: CalibrationSession,
}

/// Analytic depth pixel size for the band recorded in `dims`.
pub fn expected_pixel_size(dims: &Dimensions, refractive_index: f64) -> Result<Length, OctError> {
    let lambda = dims.lambda()?;
    let (min, max) = lambda
        .bounds()
        .ok_or_else(|| OctError::InvalidInput("empty wavelength axis".to_string()))?;
    depth_pixel_size(
        Length::from_nanometers(min),
        Length::from_nanometers(max),
        lambda.len(),
        refractive_index,
    )
}

/// Calibrates dispersion and focus pixel through a spectral scanner
pub struct DispersionFocusCalibrator<S: SpectralScanner> {
    scanner: S,
    config: CalibrationConfig,
}

impl<S: SpectralScanner> DispersionFocusCalibrator<S> {
    /// Create a calibrator, rejecting an invalid configuration.
    pub fn new(scanner: S, config: CalibrationConfig) -> Result<Self, CalibrationError> {
        config.validate()?;
        Ok(Self { scanner, config })
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    pub fn scanner(&self) -> &S {
        &self.scanner
    }

    pub fn into_scanner(self) -> S {
        self.scanner
    }

    /// Run the full calibration.
    ///
    /// Any failed acquisition, reconstruction or check aborts the run; no
    /// step is retried.
    pub fn run(&mut self) -> Result<CalibrationReport, CalibrationError> {
        let config = &self.config;
        info!(
            "Starting calibration: center {:.1} um, window {:.1} um, n = {}",
            config.initial_depth.as_micrometers(),
            config.initial_window.as_micrometers(),
            config.refractive_index
        );

        // The first acquisition fixes the spectral band and with it the
        // one-pixel stopping threshold of the search
        let (interferogram, dims) = self.scanner.acquire(config.initial_depth)?;
        let expected = expected_pixel_size(&dims, config.refractive_index)?;
        let threshold = config.pixel_threshold.unwrap_or(expected);
        let schedule = SearchSchedule::new(config, threshold)?;
        info!(
            "Search schedule: {} iterations of {} samples, pixel threshold {:.3} um",
            schedule.iterations(),
            config.samples_per_iteration,
            threshold.as_micrometers()
        );

        let mut session = CalibrationSession::with_capacity(schedule.total_samples() + 1);
        session.push(SessionSample::new(config.initial_depth, interferogram, dims));

        let best_depth = coarse_to_fine(&mut self.scanner, &schedule, &mut session)?;
        let at_focus = session.at_focus().ok_or(CalibrationError::NoSamples)?;
        info!(
            "At-focus sample at {:.2} um after {} acquisitions",
            at_focus.depth.as_micrometers(),
            session.len()
        );

        let dispersion = estimate_dispersion(at_focus, config)?;
        let focus = localize_focus(&session, dispersion.dispersion_quadratic_term, config)?;
        let planarity = check_planarity(
            &focus.at_focus_scan,
            focus.focus_pixel,
            focus.search_range.clone(),
            config,
        )?;

        let pixel_size = if config.run_pixel_size_diagnostic {
            pixel_size_diagnostic(&focus.profiles, expected, config)
        } else {
            None
        };

        let result = CalibrationResult {
            dispersion_quadratic_term: dispersion.dispersion_quadratic_term,
            focus_position_in_image_zpix: focus.focus_pixel,
        };
        info!(
            "Calibration complete: dispersion {:.4e} rad*nm^2, focus pixel {}",
            result.dispersion_quadratic_term, result.focus_position_in_image_zpix
        );

        Ok(CalibrationReport {
            result,
            best_depth,
            dispersion,
            planarity,
            pixel_size,
            session,
        })
    }
}
