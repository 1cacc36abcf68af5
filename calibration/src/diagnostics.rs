//! Depth pixel size diagnostic.
//!
//! Moving the stage by a known distance shifts the reference reflection by a
//! number of depth pixels set by the true refractive index. Fitting measured
//! peak position against stage depth gives the pixel size actually realized,
//! which is compared with the analytic one for the assumed index.

use shared::algo::{argmax, linear_fit, quadratic_fit_peak, LinearFit};
use shared::{Length, LengthExt};
use tracing::{debug, info, warn};

use crate::focus::ReconstructedSample;
use crate::CalibrationConfig;

/// Half width of the parabola fitted around each profile maximum.
const PEAK_FIT_HALF_WIDTH: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct PixelSizeDiagnostic {
    pub expected_pixel_size: Length,
    pub measured_pixel_size: Length,
    /// `measured / expected - 1`
    pub relative_error: f64,
    /// Peak pixel against stage depth in micrometers
    pub fit: LinearFit,
    pub samples_used: usize,
    /// Index that would reconcile the two sizes, set only when the mismatch
    /// exceeds the tolerance
    pub suggested_refractive_index: Option<f64>,
}

impl PixelSizeDiagnostic {
    pub fn is_consistent(&self) -> bool {
        self.suggested_refractive_index.is_none()
    }
}

/// Compare the analytic pixel size with the one implied by the session.
///
/// Only samples scoring at least `diagnostic_min_relative_score` of the best
/// take part, since far-from-focus acquisitions carry no usable peak.
/// Returns `None` when fewer than three distinct depths remain or the fit is
/// degenerate.
pub fn pixel_size_diagnostic(
    profiles: &[ReconstructedSample],
    expected_pixel_size: Length,
    config: &CalibrationConfig,
) -> Option<PixelSizeDiagnostic> {
    let best_score = profiles
        .iter()
        .map(|p| p.score)
        .filter(|s| s.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    let min_score = best_score * config.diagnostic_min_relative_score;

    let (depths_um, peaks): (Vec<f64>, Vec<f64>) = profiles
        .iter()
        .filter(|p| p.score >= min_score)
        .filter_map(|p| {
            let coarse = argmax(&p.mean_log_intensity)?;
            let peak = quadratic_fit_peak(&p.mean_log_intensity, coarse, PEAK_FIT_HALF_WIDTH)
                .unwrap_or(coarse as f64);
            Some((p.depth.as_micrometers(), peak))
        })
        .unzip();

    let mut distinct = depths_um.clone();
    distinct.sort_by(|a, b| a.total_cmp(b));
    distinct.dedup_by(|a, b| (*a - *b).abs() < 1e-6);
    if distinct.len() < 3 {
        debug!(
            "Pixel size diagnostic skipped: {} distinct depths above score threshold",
            distinct.len()
        );
        return None;
    }

    let fit = match linear_fit(&depths_um, &peaks) {
        Ok(fit) if fit.slope.abs() > f64::EPSILON => fit,
        Ok(_) => {
            debug!("Pixel size diagnostic skipped: peak does not move with stage depth");
            return None;
        }
        Err(e) => {
            debug!("Pixel size diagnostic skipped: {e}");
            return None;
        }
    };

    let expected_um = expected_pixel_size.as_micrometers();
    let measured_um = 1.0 / fit.slope.abs();
    let relative_error = measured_um / expected_um - 1.0;

    let suggested_refractive_index = if relative_error.abs() > config.pixel_size_tolerance {
        let suggested = config.refractive_index * expected_um / measured_um;
        warn!(
            "Measured depth pixel {:.4} um differs from expected {:.4} um by {:.1}%; \
             consider refractive index {:.4} instead of {:.4}",
            measured_um,
            expected_um,
            100.0 * relative_error,
            suggested,
            config.refractive_index
        );
        Some(suggested)
    } else {
        info!(
            "Measured depth pixel {:.4} um matches expected {:.4} um ({:+.2}%)",
            measured_um,
            expected_um,
            100.0 * relative_error
        );
        None
    };

    Some(PixelSizeDiagnostic {
        expected_pixel_size,
        measured_pixel_size: Length::from_micrometers(measured_um),
        relative_error,
        fit,
        samples_used: depths_um.len(),
        suggested_refractive_index,
    })
}
