//! Depth-domain reflectivity → synthetic interferogram.
//!
//! The simulator is the exact inverse of the reconstructor's core transform
//! and exists to validate it: `reconstruct(simulate(x)) ≈ smooth(x)`, where
//! the smoothing comes from resampling the input profile onto the scanner's
//! depth grid.
//!
//! Spectral samples are generated uniform in wavenumber and reported with
//! the corresponding (non-uniform) wavelengths, so the reconstructor's
//! resampling step is an identity on simulated data.

use std::f64::consts::PI;

use ndarray::{s, Array3};
use rayon::prelude::*;
use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};
use shared::algo::LinearResampler;
use shared::{AxisDescriptor, AxisUnit, Dimensions, Length, LengthExt};

use crate::depth_axis::{band_depth_axis, WavenumberBand};
use crate::scan::Interferogram;
use crate::OctError;

/// Parameters of a simulated acquisition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Sampling pitch of the input volume, used for depth and both lateral axes
    pub pixel_size: Length,
    /// Refractive index of the simulated medium
    pub refractive_index: f64,
    /// Spectrometer band edges `(min, max)`
    pub lambda_range: (Length, Length),
    pub number_of_spectral_bands: usize,
    /// Reference arm lengthening; scatterers appear shallower by this much
    pub reference_arm_z_offset: Length,
    /// Depth pixel of the confocal focus, no roll-off when `None`
    pub focus_position_in_image_zpix: Option<f64>,
    /// Gaussian width of the confocal roll-off, in depth pixels
    pub focus_sigma_pix: f64,
    /// Only `0.0` is supported
    pub dispersion_quadratic_term: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            pixel_size: Length::from_micrometers(1.0),
            refractive_index: 1.0,
            lambda_range: (Length::from_nanometers(800.0), Length::from_nanometers(1000.0)),
            number_of_spectral_bands: 2048,
            reference_arm_z_offset: Length::from_micrometers(0.0),
            focus_position_in_image_zpix: None,
            focus_sigma_pix: 20.0,
            dispersion_quadratic_term: 0.0,
        }
    }
}

impl SimulationParams {
    pub fn validate(&self) -> Result<(), OctError> {
        if self.dispersion_quadratic_term != 0.0 {
            return Err(OctError::UnsupportedOperation(format!(
                "simulating dispersion is not supported (dispersion_quadratic_term = {})",
                self.dispersion_quadratic_term
            )));
        }
        let pixel_um = self.pixel_size.as_micrometers();
        if !pixel_um.is_finite() || pixel_um <= 0.0 {
            return Err(OctError::InvalidInput(format!(
                "pixel size must be positive, got {pixel_um} um"
            )));
        }
        if !self.refractive_index.is_finite() || self.refractive_index <= 0.0 {
            return Err(OctError::InvalidInput(format!(
                "refractive index must be positive, got {}",
                self.refractive_index
            )));
        }
        if !self.reference_arm_z_offset.as_micrometers().is_finite() {
            return Err(OctError::InvalidInput(
                "reference arm offset must be finite".to_string(),
            ));
        }
        if self.focus_position_in_image_zpix.is_some()
            && !(self.focus_sigma_pix.is_finite() && self.focus_sigma_pix > 0.0)
        {
            return Err(OctError::InvalidInput(format!(
                "focus sigma must be positive, got {}",
                self.focus_sigma_pix
            )));
        }
        Ok(())
    }

    fn band(&self) -> Result<WavenumberBand, OctError> {
        WavenumberBand::from_wavelengths(
            self.lambda_range.0,
            self.lambda_range.1,
            self.number_of_spectral_bands,
        )
    }
}

/// Simulate the interferogram a scanner would record from `depth_volume`.
///
/// # Arguments
/// * `depth_volume` - Reflectivity `[z, x, y]` sampled every `pixel_size`
///   starting at depth 0
/// * `params` - Scanner and medium description
///
/// # Returns
/// The interferogram `[lambda, x, y]` (rows ascending in wavelength) and its
/// dimension-set. Lateral axes are in millimeters.
///
/// # Errors
/// `UnsupportedOperation` for a non-zero dispersion term, `InvalidInput` for
/// other out-of-domain parameters.
pub fn simulate(
    depth_volume: &Array3<f64>,
    params: &SimulationParams,
) -> Result<(Interferogram, Dimensions), OctError> {
    params.validate()?;
    let band = params.band()?;
    let (nz_in, nx, ny) = depth_volume.dim();
    if nz_in < 2 || nx == 0 || ny == 0 {
        return Err(OctError::InvalidInput(format!(
            "depth volume must have at least 2 depth samples and one lateral column, got {:?}",
            depth_volume.dim()
        )));
    }

    let samples = band.samples;
    let depth_len = band.depth_len();
    let pixel_um = params.pixel_size.as_micrometers();
    let offset_um = params.reference_arm_z_offset.as_micrometers();

    let scanner_z = band_depth_axis(&band, params.refractive_index);
    let source_z: Vec<f64> = (0..nz_in).map(|i| i as f64 * pixel_um).collect();
    let targets: Vec<f64> = scanner_z.values().iter().map(|z| z + offset_um).collect();
    let resampler = LinearResampler::new(&source_z, &targets)?;

    let roll_off: Vec<f64> = match params.focus_position_in_image_zpix {
        Some(focus) => {
            let two_sigma_sq = 2.0 * params.focus_sigma_pix.powi(2);
            (0..depth_len)
                .map(|p| (-(p as f64 - focus).powi(2) / two_sigma_sq).exp())
                .collect()
        }
        None => vec![1.0; depth_len],
    };

    // Carrier phase of each depth bin at the first wavenumber sample
    let phase: Vec<Complex64> = scanner_z
        .values()
        .iter()
        .map(|z_um| {
            let z_nm = z_um * 1000.0;
            Complex64::from_polar(1.0, -2.0 * params.refractive_index * band.k_min * z_nm)
        })
        .collect();

    let fft = FftPlanner::new().plan_fft_forward(samples);

    let columns: Vec<Vec<f64>> = (0..nx * ny)
        .into_par_iter()
        .map(|c| {
            let column = depth_volume.slice(s![.., c / ny, c % ny]);
            let reflectivity = resampler.resample(|i| column[i]);

            let mut spectrum = vec![Complex64::new(0.0, 0.0); samples];
            spectrum[0] = Complex64::new(reflectivity[0] * roll_off[0], 0.0);
            for p in 1..depth_len {
                let value = phase[p] * (reflectivity[p] * roll_off[p]);
                spectrum[p] = value;
                spectrum[samples - p] = value.conj();
            }

            fft.process(&mut spectrum);
            spectrum.iter().map(|c| c.re).collect()
        })
        .collect();

    // Columns are ascending in k; emit rows ascending in wavelength
    let mut interferogram = Array3::<f64>::zeros((samples, nx, ny));
    for (c, column) in columns.into_iter().enumerate() {
        let mut target = interferogram.slice_mut(s![.., c / ny, c % ny]);
        for (dst, src) in target.iter_mut().zip(column.into_iter().rev()) {
            *dst = src;
        }
    }

    let lambda: Vec<f64> = band.grid().iter().rev().map(|k| 2.0 * PI / k).collect();
    let pixel_mm = params.pixel_size.as_millimeters();
    let dims = Dimensions::spectral(
        AxisDescriptor::new(lambda, AxisUnit::Nanometers),
        AxisDescriptor::uniform(0.0, pixel_mm, nx, AxisUnit::Millimeters),
        AxisDescriptor::uniform(0.0, pixel_mm, ny, AxisUnit::Millimeters),
    );

    log::debug!(
        "Simulated {}x{} columns into {} spectral bands (reference offset {:.2} um)",
        nx,
        ny,
        samples,
        offset_um
    );

    Ok((interferogram, dims))
}
