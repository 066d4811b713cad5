//! Trailing-window statistics for short series

use crate::{MathError, Result};
use statrs::statistics::Statistics;

/// Mean of the last `min(window, values.len())` values, zeros included
pub fn trailing_mean(values: &[f64], window: usize) -> Result<f64> {
    if window == 0 {
        return Err(MathError::InvalidInput(
            "Window must be greater than zero".to_string(),
        ));
    }
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "No values available for a trailing mean".to_string(),
        ));
    }

    let k = window.min(values.len());
    Ok(values[values.len() - k..].iter().mean())
}

/// Number of values that are strictly non-zero
pub fn count_nonzero(values: &[f64]) -> usize {
    values.iter().filter(|v| **v != 0.0).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    #[case(&[0.0, 5.0, 7.0], 3, 4.0)]
    #[case(&[1.0, 2.0, 3.0, 4.0, 8.0], 3, 5.0)]
    #[case(&[6.0, 8.0], 3, 7.0)]
    #[case(&[9.0], 3, 9.0)]
    #[case(&[1.0, 2.0, 3.0, 10.0], 1, 10.0)]
    fn test_trailing_mean(#[case] values: &[f64], #[case] window: usize, #[case] expected: f64) {
        assert_approx_eq!(trailing_mean(values, window).unwrap(), expected, 1e-12);
    }

    #[test]
    fn test_trailing_mean_errors() {
        assert!(matches!(
            trailing_mean(&[], 3),
            Err(MathError::InsufficientData(_))
        ));
        assert!(matches!(
            trailing_mean(&[1.0], 0),
            Err(MathError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_count_nonzero_counts_negatives() {
        assert_eq!(count_nonzero(&[0.0, -1.0, 2.5, 0.0, 3.0]), 3);
        assert_eq!(count_nonzero(&[]), 0);
        assert_eq!(count_nonzero(&[0.0, -0.0]), 0);
    }
}
