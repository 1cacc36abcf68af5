//! Configuration types for dispersion/focus calibration

use serde::{Deserialize, Serialize};
use shared::algo::NelderMeadOptions;
use shared::{Length, LengthExt};

use crate::CalibrationError;

/// Window shrink factor applied after every coarse-to-fine iteration.
pub const DEFAULT_WINDOW_SHRINK_RATIO: f64 = 0.5;
/// Depth samples acquired per coarse-to-fine iteration.
pub const DEFAULT_SAMPLES_PER_ITERATION: usize = 5;
/// Half width of the focus pixel search around the initial guess.
pub const DEFAULT_FOCUS_SEARCH_HALF_WINDOW: usize = 200;
/// Largest per-column peak deviation accepted by the planarity check.
pub const DEFAULT_MAX_FOCUS_DEVIATION_PIX: f64 = 2.0;
/// Relative pixel-size mismatch that triggers a refractive index warning.
pub const DEFAULT_PIXEL_SIZE_TOLERANCE: f64 = 0.02;

/// Configuration for the calibration procedure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Stage depth offset the coarse-to-fine search starts from
    pub initial_depth: Length,
    /// Depth span covered by the first search iteration
    pub initial_window: Length,
    pub window_shrink_ratio: f64,
    pub samples_per_iteration: usize,
    /// Search stops once the sample step drops below this; one depth pixel
    /// of the analytic axis when `None`
    pub pixel_threshold: Option<Length>,
    /// Upper bound on coarse-to-fine iterations
    pub max_search_iterations: usize,
    /// Refractive index assumed for the reference target
    pub refractive_index: f64,
    /// Starting point of the dispersion search, rad·nm²
    pub initial_dispersion_guess: f64,
    pub dispersion_search: NelderMeadOptions,
    /// Expected focus pixel; the middle of the depth axis when `None`
    pub initial_focus_guess_pix: Option<usize>,
    pub focus_search_half_window: usize,
    /// Half width of the per-column parabola fit in the planarity check
    pub sanity_fit_half_width: usize,
    pub max_focus_deviation_pix: f64,
    pub run_pixel_size_diagnostic: bool,
    pub pixel_size_tolerance: f64,
    /// Samples scoring below this fraction of the best are left out of the
    /// pixel-size fit
    pub diagnostic_min_relative_score: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            initial_depth: Length::from_millimeters(0.0),
            initial_window: Length::from_micrometers(400.0),
            window_shrink_ratio: DEFAULT_WINDOW_SHRINK_RATIO,
            samples_per_iteration: DEFAULT_SAMPLES_PER_ITERATION,
            pixel_threshold: None,
            max_search_iterations: 16,
            refractive_index: 1.0,
            initial_dispersion_guess: 0.0,
            dispersion_search: NelderMeadOptions {
                initial_step: 5.0e6,
                x_tolerance: 1.0e4,
                f_tolerance: 1.0e-4,
                max_iterations: 200,
            },
            initial_focus_guess_pix: None,
            focus_search_half_window: DEFAULT_FOCUS_SEARCH_HALF_WINDOW,
            sanity_fit_half_width: 3,
            max_focus_deviation_pix: DEFAULT_MAX_FOCUS_DEVIATION_PIX,
            run_pixel_size_diagnostic: true,
            pixel_size_tolerance: DEFAULT_PIXEL_SIZE_TOLERANCE,
            diagnostic_min_relative_score: 0.25,
        }
    }
}

impl CalibrationConfig {
    pub fn validate(&self) -> Result<(), CalibrationError> {
        let invalid = |msg: String| Err(CalibrationError::InvalidConfig(msg));

        let window_um = self.initial_window.as_micrometers();
        if !(window_um.is_finite() && window_um > 0.0) {
            return invalid(format!("initial window must be positive, got {window_um} um"));
        }
        if !self.initial_depth.as_micrometers().is_finite() {
            return invalid("initial depth must be finite".to_string());
        }
        if !(self.window_shrink_ratio > 0.0 && self.window_shrink_ratio < 1.0) {
            return invalid(format!(
                "window shrink ratio must lie in (0, 1), got {}",
                self.window_shrink_ratio
            ));
        }
        if self.samples_per_iteration < 3 {
            return invalid(format!(
                "need at least 3 samples per iteration, got {}",
                self.samples_per_iteration
            ));
        }
        if let Some(threshold) = self.pixel_threshold {
            let um = threshold.as_micrometers();
            if !(um.is_finite() && um > 0.0) {
                return invalid(format!("pixel threshold must be positive, got {um} um"));
            }
        }
        if self.max_search_iterations == 0 {
            return invalid("max search iterations must be at least 1".to_string());
        }
        if !(self.refractive_index.is_finite() && self.refractive_index > 0.0) {
            return invalid(format!(
                "refractive index must be positive, got {}",
                self.refractive_index
            ));
        }
        if !self.initial_dispersion_guess.is_finite() {
            return invalid("initial dispersion guess must be finite".to_string());
        }
        if self.dispersion_search.initial_step == 0.0
            || !self.dispersion_search.initial_step.is_finite()
        {
            return invalid("dispersion search step must be finite and non-zero".to_string());
        }
        if self.focus_search_half_window == 0 {
            return invalid("focus search half window must be at least 1 pixel".to_string());
        }
        if self.sanity_fit_half_width == 0 {
            return invalid("sanity fit half width must be at least 1 pixel".to_string());
        }
        if !(self.max_focus_deviation_pix > 0.0) {
            return invalid(format!(
                "max focus deviation must be positive, got {}",
                self.max_focus_deviation_pix
            ));
        }
        if !(self.pixel_size_tolerance > 0.0) {
            return invalid(format!(
                "pixel size tolerance must be positive, got {}",
                self.pixel_size_tolerance
            ));
        }
        if !(0.0..=1.0).contains(&self.diagnostic_min_relative_score) {
            return invalid(format!(
                "diagnostic score fraction must lie in [0, 1], got {}",
                self.diagnostic_min_relative_score
            ));
        }
        Ok(())
    }
}

/// Result of a dispersion/focus calibration.
///
/// Valid for as long as the optical setup is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    /// Quadratic spectral phase coefficient, rad·nm²
    pub dispersion_quadratic_term: f64,
    /// Depth index of the focal plane
    pub focus_position_in_image_zpix: usize,
}
