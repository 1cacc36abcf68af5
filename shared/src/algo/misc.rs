//! Linear resampling between sample grids.
//!
//! Reconstruction resamples every lateral column from the spectrometer's
//! wavenumber grid onto a uniform one, and the simulator resamples every
//! depth profile onto the scanner's depth grid. The grids are the same for
//! every column, so the bracketing indices and weights are computed once by
//! [`LinearResampler::new`] and reused for each column.

use thiserror::Error;

/// Errors that can occur while building a resampler.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpError {
    #[error("Input grid must have at least 2 points")]
    InsufficientData,
    #[error("Input grid must be sorted in ascending order")]
    UnsortedData,
    #[error("Input grid contains non-finite value at index {0}")]
    NonFinite(usize),
}

/// Precomputed linear interpolation from a source grid onto target positions.
///
/// Targets outside the source range evaluate to zero (no extrapolation).
/// Targets that miss an end point by floating point noise (relative
/// 1e-9 of the span) are snapped onto it.
#[derive(Debug, Clone)]
pub struct LinearResampler {
    source_len: usize,
    /// For each target: index of the lower bracketing sample and the weight
    /// of the upper one, or `None` when the target lies outside the grid.
    taps: Vec<Option<(usize, f64)>>,
}

impl LinearResampler {
    /// Build a resampler from ascending source positions `xs` onto `targets`.
    pub fn new(xs: &[f64], targets: &[f64]) -> Result<Self, InterpError> {
        if xs.len() < 2 {
            return Err(InterpError::InsufficientData);
        }
        if let Some(i) = xs.iter().position(|v| !v.is_finite()) {
            return Err(InterpError::NonFinite(i));
        }
        if xs.windows(2).any(|w| w[1] < w[0]) {
            return Err(InterpError::UnsortedData);
        }

        let first = xs[0];
        let last = xs[xs.len() - 1];
        let slack = (last - first).abs() * 1e-9;

        let taps = targets
            .iter()
            .map(|&t| {
                if !t.is_finite() || t < first - slack || t > last + slack {
                    return None;
                }
                let t = t.clamp(first, last);
                // partition_point returns the index of the first element > t
                let upper = xs.partition_point(|&v| v <= t).clamp(1, xs.len() - 1);
                let lower = upper - 1;
                let span = xs[upper] - xs[lower];
                let weight = if span > 0.0 {
                    (t - xs[lower]) / span
                } else {
                    0.0
                };
                Some((lower, weight))
            })
            .collect();

        Ok(Self {
            source_len: xs.len(),
            taps,
        })
    }

    /// Number of source samples this resampler expects.
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    /// Number of output samples.
    pub fn target_len(&self) -> usize {
        self.taps.len()
    }

    /// Resample one column whose source samples are read through `sample`.
    pub fn resample<F>(&self, sample: F) -> Vec<f64>
    where
        F: Fn(usize) -> f64,
    {
        self.taps
            .iter()
            .map(|tap| match *tap {
                Some((lower, weight)) if weight == 0.0 => sample(lower),
                Some((lower, weight)) => {
                    let y1 = sample(lower);
                    let y2 = sample(lower + 1);
                    y1 + weight * (y2 - y1)
                }
                None => 0.0,
            })
            .collect()
    }

    /// Resample a contiguous column.
    pub fn resample_slice(&self, ys: &[f64]) -> Vec<f64> {
        debug_assert_eq!(ys.len(), self.source_len);
        self.resample(|i| ys[i])
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive.
///
/// The last value is exactly `end`, which keeps resampling grids from
/// missing their final source sample.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}
