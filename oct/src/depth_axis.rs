//! Analytic relationship between the spectrometer band and the depth axis.
//!
//! With `N` samples uniform in vacuum wavenumber between `k_min = 2π/λ_max`
//! and `k_max = 2π/λ_min`, the inverse FFT bin `p` corresponds to the
//! physical depth
//!
//! ```text
//! z_p = p · π / (n · Δk · N),    Δk = (k_max − k_min) / (N − 1)
//! ```
//!
//! where `n` is the refractive index of the imaged medium. Only the first
//! `N/2` bins carry independent information for a real interferogram.

use shared::algo::linspace;
use shared::{AxisDescriptor, AxisUnit, Length, LengthExt};
use std::f64::consts::PI;

use crate::OctError;

/// Wavenumber band covered by a spectrometer, in rad/nm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavenumberBand {
    pub k_min: f64,
    pub k_max: f64,
    pub samples: usize,
}

impl WavenumberBand {
    /// Band for wavelengths `lambda_min..=lambda_max` sampled `samples` times.
    pub fn from_wavelengths(
        lambda_min: Length,
        lambda_max: Length,
        samples: usize,
    ) -> Result<Self, OctError> {
        let (lo, hi) = (lambda_min.as_nanometers(), lambda_max.as_nanometers());
        if !(lo.is_finite() && hi.is_finite()) || lo <= 0.0 || hi <= lo {
            return Err(OctError::InvalidInput(format!(
                "wavelength range must satisfy 0 < min < max, got [{lo}, {hi}] nm"
            )));
        }
        if samples < 4 {
            return Err(OctError::InvalidInput(format!(
                "need at least 4 spectral samples, got {samples}"
            )));
        }
        Ok(Self {
            k_min: 2.0 * PI / hi,
            k_max: 2.0 * PI / lo,
            samples,
        })
    }

    /// Spacing of the uniform wavenumber grid.
    pub fn delta_k(&self) -> f64 {
        (self.k_max - self.k_min) / (self.samples - 1) as f64
    }

    /// Band-center wavenumber, the origin of the dispersion phase.
    pub fn center(&self) -> f64 {
        0.5 * (self.k_min + self.k_max)
    }

    /// The uniform grid itself, ascending.
    pub fn grid(&self) -> Vec<f64> {
        linspace(self.k_min, self.k_max, self.samples)
    }

    /// Number of usable depth bins.
    pub fn depth_len(&self) -> usize {
        self.samples / 2
    }

    /// Physical depth covered by one bin in a medium of index `refractive_index`.
    pub fn depth_pixel_size(&self, refractive_index: f64) -> Length {
        let dz_nm = PI / (refractive_index * self.delta_k() * self.samples as f64);
        Length::from_nanometers(dz_nm)
    }
}

fn check_refractive_index(refractive_index: f64) -> Result<(), OctError> {
    if !refractive_index.is_finite() || refractive_index <= 0.0 {
        return Err(OctError::InvalidInput(format!(
            "refractive index must be positive, got {refractive_index}"
        )));
    }
    Ok(())
}

/// Depth axis (micrometers) of a reconstruction.
///
/// # Arguments
/// * `lambda_min`, `lambda_max` - Spectrometer band edges
/// * `samples` - Number of spectral samples
/// * `refractive_index` - Index of the imaged medium; smaller values give a
///   larger physical depth per pixel
pub fn depth_axis(
    lambda_min: Length,
    lambda_max: Length,
    samples: usize,
    refractive_index: f64,
) -> Result<AxisDescriptor, OctError> {
    check_refractive_index(refractive_index)?;
    let band = WavenumberBand::from_wavelengths(lambda_min, lambda_max, samples)?;
    Ok(band_depth_axis(&band, refractive_index))
}

pub(crate) fn band_depth_axis(band: &WavenumberBand, refractive_index: f64) -> AxisDescriptor {
    let dz_um = band.depth_pixel_size(refractive_index).as_micrometers();
    AxisDescriptor::uniform(0.0, dz_um, band.depth_len(), AxisUnit::Micrometers)
}

/// Size of one depth pixel for the given band and medium.
pub fn depth_pixel_size(
    lambda_min: Length,
    lambda_max: Length,
    samples: usize,
    refractive_index: f64,
) -> Result<Length, OctError> {
    check_refractive_index(refractive_index)?;
    let band = WavenumberBand::from_wavelengths(lambda_min, lambda_max, samples)?;
    Ok(band.depth_pixel_size(refractive_index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn nm(v: f64) -> Length {
        Length::from_nanometers(v)
    }

    #[test]
    fn test_depth_pixel_size_800_1000() {
        // Δk·(N-1) = 2π(1/800 - 1/1000) → dz ≈ 2 µm·(N-1)/N in air
        let dz = depth_pixel_size(nm(800.0), nm(1000.0), 1024, 1.0).unwrap();
        assert_relative_eq!(dz.as_micrometers(), 2.0 * 1023.0 / 1024.0, epsilon = 1e-9);
    }

    #[test]
    fn test_depth_axis_shape() {
        let axis = depth_axis(nm(800.0), nm(1000.0), 2048, 1.0).unwrap();
        assert_eq!(axis.len(), 1024);
        assert_eq!(axis.unit(), AxisUnit::Micrometers);
        assert_eq!(axis.values()[0], 0.0);
    }

    #[test]
    fn test_smaller_index_gives_larger_pixels() {
        let air = depth_pixel_size(nm(800.0), nm(1000.0), 1024, 1.0).unwrap();
        let tissue = depth_pixel_size(nm(800.0), nm(1000.0), 1024, 1.33).unwrap();
        assert!(air > tissue);
        assert_relative_eq!(
            air.as_micrometers() / tissue.as_micrometers(),
            1.33,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(depth_axis(nm(1000.0), nm(800.0), 1024, 1.0).is_err());
        assert!(depth_axis(nm(800.0), nm(1000.0), 2, 1.0).is_err());
        assert!(depth_axis(nm(800.0), nm(1000.0), 1024, 0.0).is_err());
        assert!(depth_axis(nm(800.0), nm(1000.0), 1024, f64::NAN).is_err());
    }
}
