//! Statistical functions over slices of non-missing values.
//!
//! Moment estimators follow the conventions of the usual dataframe
//! libraries: sample variance, adjusted Fisher-Pearson skewness and
//! bias-adjusted excess kurtosis. Quantiles use linear interpolation
//! between closest ranks.

use crate::types::BoxSummary;

/// Arithmetic mean. Returns `None` for an empty slice.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sort a copy of the values in ascending order.
pub(crate) fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Quantile `q` of already sorted values, interpolating linearly.
///
/// The position is `q * (n - 1)`; the result blends the two neighbouring
/// ranks. Returns `None` for an empty slice.
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Median, i.e. the 0.5 quantile.
pub(crate) fn median(values: &[f64]) -> Option<f64> {
    quantile_sorted(&sorted(values), 0.5)
}

/// Whether all values are equal. Checked directly: a rounded mean can leave a
/// non-zero second moment for constant samples.
pub(crate) fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Sum of `(x - mean)^power` over the values.
fn central_moment_sum(values: &[f64], mean: f64, power: i32) -> f64 {
    values.iter().map(|v| (v - mean).powi(power)).sum()
}

/// Sample variance with N-1 denominator. Needs at least two values.
pub(crate) fn sample_variance(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = mean(values)?;
    Some(central_moment_sum(values, mean, 2) / (n - 1) as f64)
}

/// Population standard deviation with N denominator.
pub(crate) fn population_std(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    if is_constant(values) {
        return Some(0.0);
    }
    Some((central_moment_sum(values, mean, 2) / values.len() as f64).sqrt())
}

/// Adjusted Fisher-Pearson skewness. Needs at least three values; a
/// constant sample has skewness zero.
pub(crate) fn skewness(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let mean = mean(values)?;
    if is_constant(values) {
        return Some(0.0);
    }
    let m2 = central_moment_sum(values, mean, 2);
    let m3 = central_moment_sum(values, mean, 3);
    let n = n as f64;
    Some(n * (n - 1.0).sqrt() / (n - 2.0) * m3 / m2.powf(1.5))
}

/// Bias-adjusted excess kurtosis (zero for a normal distribution). Needs at
/// least four values; a constant sample has kurtosis zero.
pub(crate) fn kurtosis(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 4 {
        return None;
    }
    let mean = mean(values)?;
    if is_constant(values) {
        return Some(0.0);
    }
    let m2 = central_moment_sum(values, mean, 2);
    let m4 = central_moment_sum(values, mean, 4);
    let n = n as f64;
    let adjustment = 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0));
    let numerator = n * (n + 1.0) * (n - 1.0) * m4;
    let denominator = (n - 2.0) * (n - 3.0) * m2 * m2;
    Some(numerator / denominator - adjustment)
}

/// Box-plot summary of the values. Returns `None` for an empty slice.
pub(crate) fn box_summary(values: &[f64]) -> Option<BoxSummary> {
    let sorted = sorted(values);
    Some(BoxSummary {
        count: sorted.len(),
        min: *sorted.first()?,
        q1: quantile_sorted(&sorted, 0.25)?,
        median: quantile_sorted(&sorted, 0.5)?,
        q3: quantile_sorted(&sorted, 0.75)?,
        max: *sorted.last()?,
        mean: mean(&sorted)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ==================== quantile tests ====================

    #[test]
    fn test_quantile_interpolates() {
        let s = [1.0, 2.0, 3.0, 4.0];
        assert!(close(quantile_sorted(&s, 0.25).unwrap(), 1.75));
        assert!(close(quantile_sorted(&s, 0.5).unwrap(), 2.5));
        assert!(close(quantile_sorted(&s, 0.75).unwrap(), 3.25));
    }

    #[test]
    fn test_quantile_extremes() {
        let s = [2.0, 4.0, 8.0];
        assert_eq!(quantile_sorted(&s, 0.0), Some(2.0));
        assert_eq!(quantile_sorted(&s, 1.0), Some(8.0));
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }

    #[test]
    fn test_median_unsorted_input() {
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    // ==================== variance tests ====================

    #[test]
    fn test_sample_variance_basic() {
        // Mean = 3, squared deviations sum to 10, divided by 4
        let v = sample_variance(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!(close(v, 2.5));
    }

    #[test]
    fn test_sample_variance_single_value() {
        assert_eq!(sample_variance(&[5.0]), None);
    }

    #[test]
    fn test_population_std_constant_is_exact_zero() {
        assert_eq!(population_std(&[0.1, 0.1, 0.1]), Some(0.0));
    }

    #[test]
    fn test_population_std() {
        // Population variance of 2,4,4,4,5,5,7,9 is 4
        let std = population_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!(close(std, 2.0));
    }

    // ==================== shape tests ====================

    #[test]
    fn test_skewness_symmetric() {
        let skew = skewness(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!(skew.abs() < 1e-12);
    }

    #[test]
    fn test_skewness_positive_tail() {
        let skew = skewness(&[1.0, 1.0, 1.0, 1.0, 10.0]).unwrap();
        // n=5: 5*sqrt(4)/3 * m3/m2^1.5 with m2=64.8, m3=349.92
        assert!(close(skew, 10.0 / 3.0 * 349.92 / 64.8f64.powf(1.5)));
        assert!(skew > 0.0);
    }

    #[test]
    fn test_skewness_constant_and_small() {
        assert_eq!(skewness(&[5.0, 5.0, 5.0, 5.0]), Some(0.0));
        assert_eq!(skewness(&[1.0, 2.0]), None);
    }

    #[test]
    fn test_kurtosis_uniform_ranks() {
        // Excess kurtosis of 1..=5 under the bias-adjusted estimator is -1.2
        let kurt = kurtosis(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!(close(kurt, -1.2));
    }

    #[test]
    fn test_kurtosis_constant_and_small() {
        assert_eq!(kurtosis(&[3.0, 3.0, 3.0, 3.0]), Some(0.0));
        assert_eq!(kurtosis(&[1.0, 2.0, 3.0]), None);
    }

    // ==================== box summary tests ====================

    #[test]
    fn test_box_summary() {
        let summary = box_summary(&[9.0, 1.0, 5.0, 3.0, 7.0]).unwrap();
        assert_eq!(summary.count, 5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.q1, 3.0);
        assert_eq!(summary.median, 5.0);
        assert_eq!(summary.q3, 7.0);
        assert_eq!(summary.max, 9.0);
        assert_eq!(summary.mean, 5.0);
    }

    #[test]
    fn test_box_summary_empty() {
        assert!(box_summary(&[]).is_none());
    }
}
