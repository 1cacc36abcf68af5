//! NaN-aware summary statistics.
//!
//! Surface maps mark undetectable points with NaN, so every average taken
//! over detector output skips NaN entries instead of treating them as zero.

/// Mean of the finite values, NaN when there are none.
pub fn nan_mean<'a, I>(values: I) -> f64
where
    I: IntoIterator<Item = &'a f64>,
{
    let (sum, count) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Mean absolute value, NaN for an empty input.
pub fn mean_abs<'a, I>(values: I) -> f64
where
    I: IntoIterator<Item = &'a f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v.abs(), count + 1));

    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_mean_skips_nan() {
        let values = [1.0, f64::NAN, 3.0];
        assert_eq!(nan_mean(&values), 2.0);
    }

    #[test]
    fn test_nan_mean_all_nan() {
        let values = [f64::NAN, f64::NAN];
        assert!(nan_mean(&values).is_nan());
        assert!(nan_mean(&[]).is_nan());
    }

    #[test]
    fn test_mean_abs() {
        assert_eq!(mean_abs(&[-1.0, 1.0, -4.0, 2.0]), 2.0);
        assert!(mean_abs(&[]).is_nan());
    }
}
