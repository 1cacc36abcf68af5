//! Least-squares line fit.

use nalgebra::{DMatrix, DVector};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("need at least {need} points, got {got}")]
    InsufficientData { got: usize, need: usize },
    #[error("x and y must have the same length ({0} vs {1})")]
    MismatchedLengths(usize, usize),
    #[error("least-squares solve failed: {0}")]
    Solve(&'static str),
}

/// Result of `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination (NaN when y has no variance)
    pub r_squared: f64,
}

impl LinearFit {
    pub fn evaluate(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Ordinary least-squares line through `(xs[i], ys[i])`, skipping pairs with
/// a non-finite member.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Result<LinearFit, FitError> {
    if xs.len() != ys.len() {
        return Err(FitError::MismatchedLengths(xs.len(), ys.len()));
    }

    let points: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(&x, &y)| (x, y))
        .collect();
    if points.len() < 2 {
        return Err(FitError::InsufficientData {
            got: points.len(),
            need: 2,
        });
    }

    let n = points.len();
    let a = DMatrix::from_fn(n, 2, |row, col| if col == 0 { points[row].0 } else { 1.0 });
    let b = DVector::from_iterator(n, points.iter().map(|p| p.1));
    let coeffs = a.svd(true, true).solve(&b, 1e-12).map_err(FitError::Solve)?;
    let (slope, intercept) = (coeffs[0], coeffs[1]);

    let mean_y = b.mean();
    let ss_tot: f64 = b.iter().map(|y| (y - mean_y).powi(2)).sum();
    let ss_res: f64 = points
        .iter()
        .map(|(x, y)| (y - (slope * x + intercept)).powi(2))
        .sum();
    let r_squared = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else {
        f64::NAN
    };

    Ok(LinearFit {
        slope,
        intercept,
        r_squared,
    })
}
