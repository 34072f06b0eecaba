//! Summary Statistics
//!
//! Descriptive statistics for one group's metric values (pass indicators,
//! scores or costs). Standard deviation uses the n-1 denominator.

use crate::percentiles::{percentile_of_sorted, sorted_copy};
use serde::Serialize;

/// Descriptive statistics of a sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStatistics {
    /// Arithmetic mean
    pub mean: f64,
    /// 50th percentile
    pub median: f64,
    /// Sample standard deviation (n-1 denominator), 0 for fewer than 2 values
    pub std_dev: f64,
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
    /// 25th percentile
    pub q1: f64,
    /// 75th percentile
    pub q3: f64,
    /// Number of values
    pub sample_count: usize,
}

/// Compute summary statistics; every field is NaN for an empty sample
pub fn compute_summary(samples: &[f64]) -> SummaryStatistics {
    if samples.is_empty() {
        return SummaryStatistics {
            mean: f64::NAN,
            median: f64::NAN,
            std_dev: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            q1: f64::NAN,
            q3: f64::NAN,
            sample_count: 0,
        };
    }

    let sorted = sorted_copy(samples);
    let n = samples.len();
    let mean = mean(samples);

    let std_dev = if n < 2 {
        0.0
    } else {
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        variance.sqrt()
    };

    SummaryStatistics {
        mean,
        median: percentile_of_sorted(&sorted, 50.0),
        std_dev,
        min: sorted[0],
        max: sorted[n - 1],
        q1: percentile_of_sorted(&sorted, 25.0),
        q3: percentile_of_sorted(&sorted, 75.0),
        sample_count: n,
    }
}

impl SummaryStatistics {
    /// Coefficient of variation (std_dev / mean), 0 when the mean is 0
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            self.std_dev / self.mean
        }
    }

    /// Interquartile range
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Arithmetic mean; NaN for an empty sample
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return f64::NAN;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_summary() {
        let samples = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let summary = compute_summary(&samples);

        assert!((summary.mean - 3.0).abs() < 1e-12);
        assert!((summary.median - 3.0).abs() < 1e-12);
        assert!((summary.std_dev - 2.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 5.0);
        assert_eq!(summary.q1, 2.0);
        assert_eq!(summary.q3, 4.0);
        assert_eq!(summary.iqr(), 2.0);
        assert_eq!(summary.sample_count, 5);
    }

    #[test]
    fn test_pass_indicators() {
        let passes = vec![1.0, 0.0, 1.0, 1.0];
        let summary = compute_summary(&passes);
        assert!((summary.mean - 0.75).abs() < 1e-12);
        assert_eq!(summary.median, 1.0);
    }

    #[test]
    fn test_coefficient_of_variation() {
        let summary = compute_summary(&[100.0, 100.0, 100.0]);
        assert_eq!(summary.coefficient_of_variation(), 0.0);

        let summary = compute_summary(&[0.0, 0.0]);
        assert_eq!(summary.coefficient_of_variation(), 0.0);
    }

    #[test]
    fn test_single_value_has_zero_spread() {
        let summary = compute_summary(&[7.0]);
        assert_eq!(summary.std_dev, 0.0);
        assert_eq!(summary.median, 7.0);
    }

    #[test]
    fn test_empty_samples() {
        let summary = compute_summary(&[]);
        assert_eq!(summary.sample_count, 0);
        assert!(summary.mean.is_nan());
        assert!(mean(&[]).is_nan());
    }
}
