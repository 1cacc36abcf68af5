//! Array types exchanged by the reconstructor and simulator.

use ndarray::{Array3, ArrayView1, Axis};
use rustfft::num_complex::Complex64;

/// Raw detector response, indexed `[spectral, x, y]`.
pub type Interferogram = Array3<f64>;

/// Complex depth-resolved scan, indexed `[depth, x, y]`.
#[derive(Debug, Clone)]
pub struct ComplexDepthScan {
    pub data: Array3<Complex64>,
}

impl ComplexDepthScan {
    pub fn new(data: Array3<Complex64>) -> Self {
        Self { data }
    }

    /// `(depth, x, y)` shape.
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Reflectivity amplitude `|c|`.
    pub fn magnitude(&self) -> Array3<f64> {
        self.data.mapv(|c| c.norm())
    }

    /// Reflectivity intensity `|c|²`.
    pub fn intensity(&self) -> Array3<f64> {
        self.data.mapv(|c| c.norm_sqr())
    }

    /// Natural log of intensity averaged over the lateral extent, one value
    /// per depth bin.
    ///
    /// `floor` is added to the intensity before taking the log so empty bins
    /// stay finite.
    pub fn mean_log_intensity(&self, floor: f64) -> Vec<f64> {
        let (_, nx, ny) = self.dim();
        let lateral = (nx * ny).max(1) as f64;
        self.data
            .axis_iter(Axis(0))
            .map(|plane| plane.iter().map(|c| (c.norm_sqr() + floor).ln()).sum::<f64>() / lateral)
            .collect()
    }

    /// Intensity averaged over the lateral extent, one value per depth bin.
    pub fn mean_intensity(&self) -> Vec<f64> {
        let (_, nx, ny) = self.dim();
        let lateral = (nx * ny).max(1) as f64;
        self.data
            .axis_iter(Axis(0))
            .map(|plane| plane.iter().map(|c| c.norm_sqr()).sum::<f64>() / lateral)
            .collect()
    }

    /// Depth profile of one lateral column as intensity.
    pub fn column_intensity(&self, ix: usize, iy: usize) -> Vec<f64> {
        let column: ArrayView1<Complex64> = self.data.slice(ndarray::s![.., ix, iy]);
        column.iter().map(|c| c.norm_sqr()).collect()
    }

    /// Sum of `|c|²` over the whole scan.
    pub fn energy(&self) -> f64 {
        self.data.iter().map(|c| c.norm_sqr()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_magnitude_and_intensity() {
        let mut data = Array3::<Complex64>::zeros((4, 2, 1));
        data[[1, 0, 0]] = Complex64::new(3.0, 4.0);
        let scan = ComplexDepthScan::new(data);
        assert_abs_diff_eq!(scan.magnitude()[[1, 0, 0]], 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(scan.intensity()[[1, 0, 0]], 25.0, epsilon = 1e-12);
        assert_abs_diff_eq!(scan.energy(), 25.0, epsilon = 1e-12);
        assert_eq!(scan.column_intensity(0, 0), vec![0.0, 25.0, 0.0, 0.0]);
    }

    #[test]
    fn test_mean_log_intensity_averages_columns() {
        let mut data = Array3::<Complex64>::zeros((2, 2, 1));
        data[[0, 0, 0]] = Complex64::new(1.0, 0.0);
        data[[0, 1, 0]] = Complex64::new(1.0, 0.0);
        let scan = ComplexDepthScan::new(data);
        let profile = scan.mean_log_intensity(1.0);
        assert_abs_diff_eq!(profile[0], 2f64.ln(), epsilon = 1e-12);
        assert_abs_diff_eq!(profile[1], 0.0, epsilon = 1e-12);

        let mean = scan.mean_intensity();
        assert_abs_diff_eq!(mean[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mean[1], 0.0, epsilon = 1e-12);
    }
}
