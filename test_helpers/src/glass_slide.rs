//! Synthetic spectral-domain scanner imaging a flat glass slide.
//!
//! Each lateral column sees a single reflector, the slide surface, at
//!
//! ```text
//! z = surface_depth + stage_offset + tilt · x_index        (µm)
//! ```
//!
//! and records the fringe `A · cos(2·n·k·z + β·(k − k₀)²)` at each
//! spectrometer channel, where `A` is a Gaussian focus envelope centered on
//! `focus_depth`. The spectrometer samples uniformly in wavelength, so the
//! wavenumber grid is non-uniform exactly as on the real instrument.

use std::f64::consts::PI;

use hardware::{ScanError, SpectralScanner};
use ndarray::Array3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use shared::{AxisDescriptor, AxisUnit, Dimensions, Length, LengthExt};

/// Lateral pixel pitch reported in the dimension-set, in millimeters.
const LATERAL_PITCH_MM: f64 = 0.001;

#[derive(Debug, Clone)]
pub struct GlassSlideScanner {
    pub lambda_min_nm: f64,
    pub lambda_max_nm: f64,
    pub spectral_samples: usize,
    pub nx: usize,
    pub ny: usize,
    /// Index of the medium above the slide surface
    pub refractive_index: f64,
    /// Surface depth at zero stage offset
    pub surface_depth_um: f64,
    /// Depth at which the objective focuses
    pub focus_depth_um: f64,
    /// Width of the Gaussian focus envelope
    pub focus_sigma_um: f64,
    /// Quadratic dispersion applied to every fringe (rad·nm²)
    pub dispersion_quadratic_term: f64,
    /// Surface depth change per lateral column
    pub tilt_um_per_column: f64,
    pub amplitude: f64,
    noise: Option<(Normal<f64>, StdRng)>,
    acquisitions: usize,
}

impl Default for GlassSlideScanner {
    fn default() -> Self {
        Self {
            lambda_min_nm: 800.0,
            lambda_max_nm: 1000.0,
            spectral_samples: 1024,
            nx: 8,
            ny: 1,
            refractive_index: 1.0,
            surface_depth_um: 160.0,
            focus_depth_um: 200.0,
            focus_sigma_um: 30.0,
            dispersion_quadratic_term: 0.0,
            tilt_um_per_column: 0.0,
            amplitude: 1.0,
            noise: None,
            acquisitions: 0,
        }
    }
}

impl GlassSlideScanner {
    pub fn with_dispersion(mut self, dispersion_quadratic_term: f64) -> Self {
        self.dispersion_quadratic_term = dispersion_quadratic_term;
        self
    }

    pub fn with_tilt(mut self, um_per_column: f64) -> Self {
        self.tilt_um_per_column = um_per_column;
        self
    }

    pub fn with_refractive_index(mut self, refractive_index: f64) -> Self {
        self.refractive_index = refractive_index;
        self
    }

    /// Add Gaussian noise of standard deviation `std` to every channel.
    pub fn with_noise(mut self, std: f64, seed: u64) -> anyhow::Result<Self> {
        let normal = Normal::new(0.0, std)?;
        self.noise = Some((normal, StdRng::seed_from_u64(seed)));
        Ok(self)
    }

    /// Number of `acquire` calls so far.
    pub fn acquisitions(&self) -> usize {
        self.acquisitions
    }

    /// Stage offset that places the untilted surface at the focus depth.
    pub fn in_focus_offset_um(&self) -> f64 {
        self.focus_depth_um - self.surface_depth_um
    }

    /// Air depth pixel size of this spectrometer, in micrometers.
    pub fn air_pixel_size_um(&self) -> f64 {
        let k_min = 2.0 * PI / self.lambda_max_nm;
        let k_max = 2.0 * PI / self.lambda_min_nm;
        let n = self.spectral_samples as f64;
        let delta_k = (k_max - k_min) / (n - 1.0);
        PI / (delta_k * n) / 1000.0
    }

    /// Depth pixel at which a reconstruction with `n = 1` shows the surface
    /// when it sits at the focus depth.
    pub fn focus_pixel(&self) -> f64 {
        self.refractive_index * self.focus_depth_um / self.air_pixel_size_um()
    }

    fn lambda_nm(&self) -> Vec<f64> {
        let step = (self.lambda_max_nm - self.lambda_min_nm) / (self.spectral_samples - 1) as f64;
        (0..self.spectral_samples)
            .map(|i| self.lambda_min_nm + i as f64 * step)
            .collect()
    }

    fn dimensions(&self) -> Dimensions {
        Dimensions::spectral(
            AxisDescriptor::new(self.lambda_nm(), AxisUnit::Nanometers),
            AxisDescriptor::uniform(0.0, LATERAL_PITCH_MM, self.nx, AxisUnit::Millimeters),
            AxisDescriptor::uniform(0.0, LATERAL_PITCH_MM, self.ny, AxisUnit::Millimeters),
        )
    }
}

impl SpectralScanner for GlassSlideScanner {
    fn acquire(&mut self, depth_offset: Length) -> Result<(Array3<f64>, Dimensions), ScanError> {
        if self.spectral_samples < 4 || self.nx == 0 || self.ny == 0 {
            return Err(ScanError::Acquisition(format!(
                "degenerate scanner geometry {}x{}x{}",
                self.spectral_samples, self.nx, self.ny
            )));
        }
        self.acquisitions += 1;

        let k: Vec<f64> = self.lambda_nm().iter().map(|l| 2.0 * PI / l).collect();
        let k0 = 0.5 * (2.0 * PI / self.lambda_min_nm + 2.0 * PI / self.lambda_max_nm);
        let dispersion: Vec<f64> = k
            .iter()
            .map(|kj| self.dispersion_quadratic_term * (kj - k0).powi(2))
            .collect();

        let offset_um = depth_offset.as_micrometers();
        let mut spectra = Array3::zeros((self.spectral_samples, self.nx, self.ny));
        for ix in 0..self.nx {
            let z_um = self.surface_depth_um + offset_um + self.tilt_um_per_column * ix as f64;
            let envelope = self.amplitude
                * (-(z_um - self.focus_depth_um).powi(2) / (2.0 * self.focus_sigma_um.powi(2))).exp();
            let z_nm = z_um * 1000.0;
            for iy in 0..self.ny {
                for (j, (kj, phase)) in k.iter().zip(&dispersion).enumerate() {
                    spectra[[j, ix, iy]] =
                        envelope * (2.0 * self.refractive_index * kj * z_nm + phase).cos();
                }
            }
        }

        if let Some((normal, rng)) = self.noise.as_mut() {
            spectra.mapv_inplace(|v| v + normal.sample(rng));
        }

        Ok((spectra, self.dimensions()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_geometry() {
        let mut scanner = GlassSlideScanner::default();
        let (spectra, dims) = scanner.acquire(Length::from_micrometers(0.0)).unwrap();
        assert_eq!(spectra.dim(), (1024, 8, 1));
        dims.check_spectral(spectra.dim()).unwrap();
        assert_eq!(scanner.acquisitions(), 1);
        assert_relative_eq!(scanner.in_focus_offset_um(), 40.0);
        // Roughly 2 um per air pixel for 800-1000 nm over 1024 channels
        assert!((scanner.air_pixel_size_um() - 2.0).abs() < 0.01);
        assert!((scanner.focus_pixel() - 100.0).abs() < 0.5);
    }

    #[test]
    fn test_signal_strongest_in_focus() {
        let mut scanner = GlassSlideScanner::default();
        let energy = |s: &Array3<f64>| s.iter().map(|v| v * v).sum::<f64>();
        let (in_focus, _) = scanner
            .acquire(Length::from_micrometers(scanner.in_focus_offset_um()))
            .unwrap();
        let (defocused, _) = scanner.acquire(Length::from_micrometers(-100.0)).unwrap();
        assert!(energy(&in_focus) > 100.0 * energy(&defocused));
    }

    #[test]
    fn test_noise_is_reproducible() {
        let make = || GlassSlideScanner::default().with_noise(0.01, 7).unwrap();
        let (a, _) = make().acquire(Length::from_micrometers(0.0)).unwrap();
        let (b, _) = make().acquire(Length::from_micrometers(0.0)).unwrap();
        assert_eq!(a, b);
        assert!(GlassSlideScanner::default().with_noise(-1.0, 0).is_err());
    }
}
