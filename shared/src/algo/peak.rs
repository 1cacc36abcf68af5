//! Peak location on sampled 1-D profiles.

use nalgebra::{DMatrix, DVector};

/// Index of the largest finite value, `None` if there is none.
pub fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
}

/// Index of the largest finite value within `range`, as an absolute index.
pub fn argmax_in(values: &[f64], range: std::ops::Range<usize>) -> Option<usize> {
    let end = range.end.min(values.len());
    let start = range.start.min(end);
    argmax(&values[start..end]).map(|i| i + start)
}

/// Three-point parabolic vertex around `index`.
///
/// Falls back to `index` itself at the array edges or when the three points
/// are collinear.
pub fn parabolic_peak(values: &[f64], index: usize) -> f64 {
    if index == 0 || index + 1 >= values.len() {
        return index as f64;
    }
    let (a, b, c) = (values[index - 1], values[index], values[index + 1]);
    let denom = a - 2.0 * b + c;
    if denom.abs() < f64::EPSILON || !denom.is_finite() {
        return index as f64;
    }
    index as f64 + 0.5 * (a - c) / denom
}

/// Least-squares parabola through `values[center - half_width ..= center + half_width]`.
///
/// Returns the vertex position as an absolute (fractional) index. The window
/// is clipped to the array. Returns `None` when fewer than three samples are
/// available, when the fit is not concave, or when the vertex lands outside
/// the fitted window.
pub fn quadratic_fit_peak(values: &[f64], center: usize, half_width: usize) -> Option<f64> {
    let start = center.saturating_sub(half_width);
    let end = (center + half_width + 1).min(values.len());
    let n = end.saturating_sub(start);
    if n < 3 {
        return None;
    }

    // Centre the abscissa on `center` for conditioning
    let a = DMatrix::from_fn(n, 3, |row, col| {
        let x = (start + row) as f64 - center as f64;
        x.powi(col as i32)
    });
    let b = DVector::from_iterator(n, values[start..end].iter().copied());
    if b.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let coeffs = a.svd(true, true).solve(&b, 1e-12).ok()?;
    let (c1, c2) = (coeffs[1], coeffs[2]);
    if c2 >= 0.0 {
        return None;
    }

    let vertex = center as f64 - c1 / (2.0 * c2);
    if vertex < start as f64 || vertex > (end - 1) as f64 {
        return None;
    }
    Some(vertex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn gaussian(n: usize, center: f64, sigma: f64) -> Vec<f64> {
        (0..n)
            .map(|i| (-(i as f64 - center).powi(2) / (2.0 * sigma * sigma)).exp())
            .collect()
    }

    #[test]
    fn test_argmax_ignores_nan() {
        assert_eq!(argmax(&[1.0, f64::NAN, 3.0, 2.0]), Some(2));
        assert_eq!(argmax(&[f64::NAN]), None);
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_argmax_in_window() {
        let v = [9.0, 1.0, 2.0, 5.0, 3.0, 8.0];
        assert_eq!(argmax_in(&v, 1..5), Some(3));
        assert_eq!(argmax_in(&v, 4..100), Some(5));
        assert_eq!(argmax_in(&v, 10..20), None);
    }

    #[test]
    fn test_parabolic_peak_on_log_gaussian_is_exact() {
        let g: Vec<f64> = gaussian(32, 12.3, 2.0).iter().map(|v| v.ln()).collect();
        let idx = argmax(&g).unwrap();
        assert_abs_diff_eq!(parabolic_peak(&g, idx), 12.3, epsilon = 1e-9);
    }

    #[test]
    fn test_parabolic_peak_at_edge() {
        assert_eq!(parabolic_peak(&[3.0, 2.0, 1.0], 0), 0.0);
    }

    #[test]
    fn test_quadratic_fit_recovers_vertex() {
        let values: Vec<f64> = (0..20)
            .map(|i| {
                let x = i as f64 - 7.4;
                10.0 - 0.5 * x * x
            })
            .collect();
        let peak = quadratic_fit_peak(&values, 7, 3).unwrap();
        assert_abs_diff_eq!(peak, 7.4, epsilon = 1e-9);
    }

    #[test]
    fn test_quadratic_fit_rejects_convex() {
        let values: Vec<f64> = (0..9).map(|i| (i as f64 - 4.0).powi(2)).collect();
        assert!(quadratic_fit_peak(&values, 4, 2).is_none());
    }
}
