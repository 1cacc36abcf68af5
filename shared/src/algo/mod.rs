//! Numeric algorithms shared by reconstruction, calibration and autofocus
//!
//! This module provides grid resampling, NaN-aware statistics, peak
//! location, least-squares fits and a derivative-free minimizer.

pub mod fit;
pub mod minimize;
pub mod misc;
pub mod peak;
pub mod stats;

pub use fit::{linear_fit, FitError, LinearFit};
pub use minimize::{nelder_mead_1d, MinimizeResult, NelderMeadOptions};
pub use misc::{linspace, InterpError, LinearResampler};
pub use peak::{argmax, argmax_in, parabolic_peak, quadratic_fit_peak};
pub use stats::{mean_abs, nan_mean};
