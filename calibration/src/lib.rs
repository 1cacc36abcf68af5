//! Dispersion and focus-pixel calibration
//!
//! This crate calibrates the two parameters every reconstruction needs
//! against a flat glass-slide reference target.
//!
//! # Overview
//!
//! The calibration process:
//! 1. Coarse-to-fine depth search for the stage position that puts the slide
//!    in focus, keeping every acquisition in a [`CalibrationSession`]
//! 2. Derivative-free minimization of the dispersion coefficient on the
//!    at-focus acquisition
//! 3. Focus pixel localization on the dispersion-compensated reconstruction
//! 4. Planarity check of every lateral column against the focus pixel
//! 5. Optional comparison of expected and measured depth pixel size
//!
//! # Modules
//!
//! - [`config`] - Calibration configuration and result
//! - [`search`] - Coarse-to-fine schedule and search
//! - [`dispersion`] - Dispersion estimation
//! - [`focus`] - Focus pixel localization
//! - [`sanity`] - Planarity check
//! - [`diagnostics`] - Depth pixel size diagnostic
//! - [`executor`] - Calibration workflow orchestration

pub mod config;
pub mod diagnostics;
pub mod dispersion;
pub mod error;
pub mod executor;
pub mod focus;
pub mod sanity;
pub mod search;
pub mod session;

pub use config::{
    CalibrationConfig, CalibrationResult, DEFAULT_FOCUS_SEARCH_HALF_WINDOW,
    DEFAULT_MAX_FOCUS_DEVIATION_PIX, DEFAULT_PIXEL_SIZE_TOLERANCE, DEFAULT_SAMPLES_PER_ITERATION,
    DEFAULT_WINDOW_SHRINK_RATIO,
};
pub use diagnostics::PixelSizeDiagnostic;
pub use dispersion::DispersionEstimate;
pub use error::CalibrationError;
pub use executor::{CalibrationReport, DispersionFocusCalibrator};
pub use sanity::PlanarityCheck;
pub use search::SearchSchedule;
pub use session::{CalibrationSession, SessionSample};

/// Added to intensities before taking the log so empty bins stay finite.
pub(crate) const LOG_INTENSITY_FLOOR: f64 = 1e-12;
