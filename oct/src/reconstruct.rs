//! Spectral interferogram → complex depth scan.
//!
//! The reconstruction runs per lateral column:
//! 1. Resample from the spectrometer's wavelength channels onto a grid
//!    uniform in vacuum wavenumber
//! 2. Apply the quadratic dispersion phase `exp(i·β·(k − k₀)²)`
//! 3. Inverse FFT (normalized by `1/N`) and keep the first `N/2` bins
//!
//! Columns are independent and are processed in parallel.

use std::f64::consts::PI;
use std::sync::Arc;

use ndarray::{s, Array3};
use rayon::prelude::*;
use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use shared::algo::LinearResampler;
use shared::Dimensions;

use crate::depth_axis::{band_depth_axis, WavenumberBand};
use crate::scan::{ComplexDepthScan, Interferogram};
use crate::OctError;

/// Everything about a spectral axis that is shared by all columns.
struct SpectralPlan {
    band: WavenumberBand,
    /// Source row for each position of the ascending-k ordering
    order: Vec<usize>,
    resampler: LinearResampler,
    dispersion: Option<Vec<Complex64>>,
    fft: Arc<dyn Fft<f64>>,
}

impl SpectralPlan {
    fn new(lambda_nm: &[f64], dispersion_quadratic_term: f64) -> Result<Self, OctError> {
        let samples = lambda_nm.len();
        if samples < 4 {
            return Err(OctError::InvalidInput(format!(
                "need at least 4 spectral samples, got {samples}"
            )));
        }
        if let Some(bad) = lambda_nm.iter().find(|l| !l.is_finite() || **l <= 0.0) {
            return Err(OctError::InvalidInput(format!(
                "wavelength samples must be positive and finite, found {bad}"
            )));
        }
        if !dispersion_quadratic_term.is_finite() {
            return Err(OctError::InvalidInput(format!(
                "dispersion quadratic term must be finite, got {dispersion_quadratic_term}"
            )));
        }

        let k: Vec<f64> = lambda_nm.iter().map(|l| 2.0 * PI / l).collect();
        let mut order: Vec<usize> = (0..samples).collect();
        order.sort_by(|&a, &b| k[a].total_cmp(&k[b]));
        let k_sorted: Vec<f64> = order.iter().map(|&i| k[i]).collect();

        let band = WavenumberBand {
            k_min: k_sorted[0],
            k_max: k_sorted[samples - 1],
            samples,
        };
        if band.k_max <= band.k_min {
            return Err(OctError::InvalidInput(
                "wavelength samples span an empty band".to_string(),
            ));
        }

        let grid = band.grid();
        let resampler = LinearResampler::new(&k_sorted, &grid)?;

        // β == 0 must reproduce the unfiltered transform bit for bit, so the
        // multiplication is skipped rather than performed with unit phasors.
        let dispersion: Option<Vec<Complex64>> = (dispersion_quadratic_term != 0.0).then(|| {
            let k0 = band.center();
            grid.iter()
                .map(|k| Complex64::from_polar(1.0, dispersion_quadratic_term * (k - k0).powi(2)))
                .collect()
        });

        let fft = FftPlanner::new().plan_fft_inverse(samples);

        Ok(Self {
            band,
            order,
            resampler,
            dispersion,
            fft,
        })
    }

    fn transform_column<F>(&self, sample: F) -> Vec<Complex64>
    where
        F: Fn(usize) -> f64,
    {
        let resampled = self.resampler.resample(|i| sample(self.order[i]));

        let mut buffer: Vec<Complex64> = match &self.dispersion {
            Some(phase) => resampled
                .iter()
                .zip(phase)
                .map(|(&v, p)| *p * v)
                .collect(),
            None => resampled.iter().map(|&v| Complex64::new(v, 0.0)).collect(),
        };

        self.fft.process(&mut buffer);

        let scale = 1.0 / self.band.samples as f64;
        buffer.truncate(self.band.depth_len());
        buffer.iter_mut().for_each(|c| *c *= scale);
        buffer
    }
}

/// Reconstruct a complex depth scan from a raw interferogram.
///
/// # Arguments
/// * `interferogram` - Raw spectra `[lambda, x, y]`
/// * `dims` - Dimension-set with a `lambda` axis in nanometers
/// * `dispersion_quadratic_term` - β in rad·nm², applied about the band center
/// * `refractive_index` - Medium index used for the depth axis
///
/// # Returns
/// The complex scan `[z, x, y]` with `z` length `N/2`, and a dimension-set
/// whose `z` axis is in micrometers and whose lateral axes are unchanged.
pub fn reconstruct(
    interferogram: &Interferogram,
    dims: &Dimensions,
    dispersion_quadratic_term: f64,
    refractive_index: f64,
) -> Result<(ComplexDepthScan, Dimensions), OctError> {
    if !refractive_index.is_finite() || refractive_index <= 0.0 {
        return Err(OctError::InvalidInput(format!(
            "refractive index must be positive, got {refractive_index}"
        )));
    }
    let shape = interferogram.dim();
    dims.check_spectral(shape)?;
    let (_, nx, ny) = shape;
    if nx == 0 || ny == 0 {
        return Err(OctError::InvalidInput(
            "interferogram has no lateral samples".to_string(),
        ));
    }

    let plan = SpectralPlan::new(dims.lambda()?.values(), dispersion_quadratic_term)?;
    let depth_len = plan.band.depth_len();

    let columns: Vec<Vec<Complex64>> = (0..nx * ny)
        .into_par_iter()
        .map(|c| {
            let column = interferogram.slice(s![.., c / ny, c % ny]);
            plan.transform_column(|i| column[i])
        })
        .collect();

    let mut data = Array3::<Complex64>::zeros((depth_len, nx, ny));
    for (c, column) in columns.into_iter().enumerate() {
        let mut target = data.slice_mut(s![.., c / ny, c % ny]);
        for (dst, src) in target.iter_mut().zip(column) {
            *dst = src;
        }
    }

    let out_dims = Dimensions::depth(
        band_depth_axis(&plan.band, refractive_index),
        dims.x.clone(),
        dims.y.clone(),
    );

    log::debug!(
        "Reconstructed {}x{} columns, {} spectral samples -> {} depth bins (beta = {:.3e})",
        nx,
        ny,
        plan.band.samples,
        depth_len,
        dispersion_quadratic_term
    );

    Ok((ComplexDepthScan::new(data), out_dims))
}
