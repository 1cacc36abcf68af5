//! Dispersion coefficient estimation.
//!
//! A mismatch in dispersion between the sample and reference arms smears the
//! reflection of the reference target over many depth bins. The coefficient
//! that best compensates it is the one giving the sharpest (highest) peak of
//! the laterally averaged log-intensity profile.

use oct::{reconstruct, OctError};
use shared::algo::nelder_mead_1d;
use tracing::info;

use crate::session::SessionSample;
use crate::{CalibrationConfig, CalibrationError, LOG_INTENSITY_FLOOR};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispersionEstimate {
    /// Quadratic phase coefficient, rad·nm²
    pub dispersion_quadratic_term: f64,
    /// Peak of the mean log-intensity profile at that coefficient
    pub peak_log_intensity: f64,
    pub evaluations: usize,
    pub converged: bool,
}

/// Peak of the lateral-mean log-intensity after reconstructing with `beta`.
pub fn peak_log_intensity(
    sample: &SessionSample,
    beta: f64,
    refractive_index: f64,
) -> Result<f64, OctError> {
    let (scan, _) = reconstruct(&sample.interferogram, &sample.dims, beta, refractive_index)?;
    Ok(scan
        .mean_log_intensity(LOG_INTENSITY_FLOOR)
        .into_iter()
        .fold(f64::NEG_INFINITY, f64::max))
}

/// Minimize the negative peak log-intensity over the dispersion coefficient.
///
/// Starts from `config.initial_dispersion_guess`; a poor guess may converge
/// to a local optimum and is not retried.
pub fn estimate_dispersion(
    sample: &SessionSample,
    config: &CalibrationConfig,
) -> Result<DispersionEstimate, CalibrationError> {
    // Surface reconstruction errors here rather than as an infinite cost
    let start = peak_log_intensity(sample, config.initial_dispersion_guess, config.refractive_index)?;

    let mut failure: Option<OctError> = None;
    let result = nelder_mead_1d(
        |beta| match peak_log_intensity(sample, beta, config.refractive_index) {
            Ok(peak) => -peak,
            Err(e) => {
                failure.get_or_insert(e);
                f64::NAN
            }
        },
        config.initial_dispersion_guess,
        &config.dispersion_search,
    );
    if let Some(e) = failure {
        return Err(e.into());
    }

    info!(
        "Dispersion estimate {:.4e} rad*nm^2 (peak log-intensity {:.3} -> {:.3}, {} evaluations{})",
        result.x,
        start,
        -result.fx,
        result.evaluations,
        if result.converged { "" } else { ", not converged" }
    );

    Ok(DispersionEstimate {
        dispersion_quadratic_term: result.x,
        peak_log_intensity: -result.fx,
        evaluations: result.evaluations,
        converged: result.converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hardware::SpectralScanner;
    use shared::{Length, LengthExt};
    use test_helpers::GlassSlideScanner;

    const BETA: f64 = 2.0e7;

    fn at_focus_sample() -> SessionSample {
        let mut scanner = GlassSlideScanner::default().with_dispersion(BETA);
        let depth = Length::from_micrometers(scanner.in_focus_offset_um());
        let (interferogram, dims) = scanner.acquire(depth).unwrap();
        SessionSample::new(depth, interferogram, dims)
    }

    #[test]
    fn test_correct_coefficient_sharpens_peak() {
        let sample = at_focus_sample();
        let blurred = peak_log_intensity(&sample, 0.0, 1.0).unwrap();
        let sharp = peak_log_intensity(&sample, BETA, 1.0).unwrap();
        assert!(sharp > blurred + 1.0, "sharp {sharp} vs blurred {blurred}");
    }

    #[test]
    fn test_recovers_dispersion() {
        let sample = at_focus_sample();
        let estimate = estimate_dispersion(&sample, &CalibrationConfig::default()).unwrap();
        let relative = (estimate.dispersion_quadratic_term - BETA).abs() / BETA;
        assert!(
            relative < 0.1,
            "estimated {:.4e}, expected {BETA:.4e}",
            estimate.dispersion_quadratic_term
        );
    }
}
