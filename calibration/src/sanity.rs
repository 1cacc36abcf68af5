//! Planarity check of the calibrated focus pixel.
//!
//! The reference target is flat, so every lateral column of the at-focus
//! acquisition must peak at the same depth. A column that peaks elsewhere
//! means a tilted or curved target, or a wrong setup, and rejects the
//! calibration.

use std::ops::Range;

use ndarray::Array2;
use oct::ComplexDepthScan;
use shared::algo::{argmax_in, quadratic_fit_peak};
use tracing::{debug, info};

use crate::{CalibrationConfig, CalibrationError, LOG_INTENSITY_FLOOR};

#[derive(Debug, Clone)]
pub struct PlanarityCheck {
    /// Sub-pixel peak of every lateral column, `[x, y]`
    pub column_peaks: Array2<f64>,
    pub max_deviation_pix: f64,
    pub worst_column: (usize, usize),
}

/// Sub-pixel peak of one column's log-intensity inside `range`.
fn column_peak(log_intensity: &[f64], range: Range<usize>, half_width: usize) -> f64 {
    match argmax_in(log_intensity, range) {
        Some(coarse) => {
            quadratic_fit_peak(log_intensity, coarse, half_width).unwrap_or(coarse as f64)
        }
        None => f64::NAN,
    }
}

/// Verify every column of `scan` peaks within the configured deviation of
/// `focus_pixel`.
pub fn check_planarity(
    scan: &ComplexDepthScan,
    focus_pixel: usize,
    search_range: Range<usize>,
    config: &CalibrationConfig,
) -> Result<PlanarityCheck, CalibrationError> {
    let (_, nx, ny) = scan.dim();
    let mut column_peaks = Array2::<f64>::zeros((nx, ny));
    let mut worst = (0, 0);
    let mut max_deviation = 0.0f64;

    for ix in 0..nx {
        for iy in 0..ny {
            let log_intensity: Vec<f64> = scan
                .column_intensity(ix, iy)
                .into_iter()
                .map(|v| (v + LOG_INTENSITY_FLOOR).ln())
                .collect();
            let peak = column_peak(&log_intensity, search_range.clone(), config.sanity_fit_half_width);
            column_peaks[[ix, iy]] = peak;

            // A column without a peak counts as infinitely far off
            let deviation = if peak.is_finite() {
                (peak - focus_pixel as f64).abs()
            } else {
                f64::INFINITY
            };
            if deviation > max_deviation {
                max_deviation = deviation;
                worst = (ix, iy);
            }
        }
    }

    debug!(
        "Planarity: max deviation {:.3} px at column {:?}",
        max_deviation, worst
    );

    if max_deviation >= config.max_focus_deviation_pix {
        return Err(CalibrationError::SanityCheckFailed {
            x: worst.0,
            y: worst.1,
            deviation_pix: max_deviation,
            focus_pixel,
            limit_pix: config.max_focus_deviation_pix,
        });
    }

    info!(
        "Planarity check passed: {}x{} columns within {:.3} px of focus pixel {}",
        nx, ny, max_deviation, focus_pixel
    );
    Ok(PlanarityCheck {
        column_peaks,
        max_deviation_pix: max_deviation,
        worst_column: worst,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;
    use rustfft::num_complex::Complex64;

    /// Scan with a Gaussian peak per column at `centers[ix]`.
    fn scan_with_peaks(centers: &[f64]) -> ComplexDepthScan {
        let depth = 64;
        let data = Array3::from_shape_fn((depth, centers.len(), 1), |(z, x, _)| {
            let d = z as f64 - centers[x];
            Complex64::new((-d * d / 8.0).exp(), 0.0)
        });
        ComplexDepthScan::new(data)
    }

    #[test]
    fn test_flat_target_passes() {
        let scan = scan_with_peaks(&[30.2, 30.4, 29.9, 30.0]);
        let check = check_planarity(&scan, 30, 10..50, &CalibrationConfig::default()).unwrap();
        assert!(check.max_deviation_pix < 0.5);
        assert!((check.column_peaks[[1, 0]] - 30.4).abs() < 0.05);
    }

    #[test]
    fn test_tilted_target_fails() {
        let scan = scan_with_peaks(&[28.0, 30.0, 32.0, 34.5]);
        match check_planarity(&scan, 30, 10..50, &CalibrationConfig::default()) {
            Err(CalibrationError::SanityCheckFailed { x, deviation_pix, .. }) => {
                assert_eq!(x, 3);
                assert!((deviation_pix - 4.5).abs() < 0.05);
            }
            other => panic!("expected SanityCheckFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_deviation_just_beyond_limit_fails() {
        let scan = scan_with_peaks(&[32.1]);
        let config = CalibrationConfig {
            max_focus_deviation_pix: 2.0,
            ..Default::default()
        };
        assert!(check_planarity(&scan, 30, 10..50, &config).is_err());
    }
}
