//! Small numeric primitives shared by the analysis modules.

/// Standard deviations below which a baseline is treated as constant.
/// Guards the zero-variance rules against float round-off.
pub const ZERO_VARIANCE_EPS: f64 = 1e-9;

/// Arithmetic mean. Returns `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (divide by n-1).
///
/// Defined as 0 when fewer than two values are present so that every
/// downstream sigma comparison stays well-defined.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = values.iter().sum::<f64>() / n as f64;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (sum_sq / (n - 1) as f64).sqrt()
}

/// Median of the values. Returns `None` for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Least-squares line fit over (x, y) pairs.
///
/// Returns `(slope, intercept)`, or `None` when fewer than two distinct
/// x positions exist.
pub fn least_squares(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let xs = &xs[..n];
    let ys = &ys[..n];
    let x_mean = xs.iter().sum::<f64>() / n as f64;
    let y_mean = ys.iter().sum::<f64>() / n as f64;
    let sxx: f64 = xs.iter().map(|x| (x - x_mean).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    let sxy: f64 = xs
        .iter()
        .zip(ys.iter())
        .map(|(x, y)| (x - x_mean) * (y - y_mean))
        .sum();
    let slope = sxy / sxx;
    Some((slope, y_mean - slope * x_mean))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&values), Some(5.0));
        // sample variance of this classic fixture is 32/7
        let expected = (32.0f64 / 7.0).sqrt();
        assert!((sample_std(&values) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_std_of_small_samples_is_zero() {
        assert_eq!(sample_std(&[]), 0.0);
        assert_eq!(sample_std(&[42.0]), 0.0);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0]), Some(3.0));
        assert_eq!(median(&[1.0, 2.0, 10.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 10.0]), Some(3.0));
    }

    #[test]
    fn test_least_squares_recovers_line() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys: Vec<f64> = xs.iter().map(|x| 1.5 * x - 2.0).collect();
        let (slope, intercept) = least_squares(&xs, &ys).unwrap();
        assert!((slope - 1.5).abs() < 1e-12);
        assert!((intercept + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_least_squares_degenerate() {
        assert_eq!(least_squares(&[1.0], &[2.0]), None);
        assert_eq!(least_squares(&[3.0, 3.0], &[1.0, 2.0]), None);
    }
}
