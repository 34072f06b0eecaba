//! Percentile Computation
//!
//! Linear interpolation between closest ranks, the same convention as the
//! default estimator of most numerical libraries. Used for bootstrap interval
//! bounds and for quartiles in summary statistics.

use std::cmp::Ordering;

/// Sort a copy of `samples` ascending
pub(crate) fn sorted_copy(samples: &[f64]) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

/// Percentile of an already sorted slice
///
/// `percentile` is in [0, 100]. Returns NaN for an empty slice.
pub fn percentile_of_sorted(sorted: &[f64], percentile: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let p = (percentile / 100.0).clamp(0.0, 1.0);
            let rank = p * (n - 1) as f64;
            let lower_idx = rank.floor() as usize;
            let upper_idx = (lower_idx + 1).min(n - 1);
            let fraction = rank - lower_idx as f64;

            sorted[lower_idx] + fraction * (sorted[upper_idx] - sorted[lower_idx])
        }
    }
}

/// Compute a single percentile from unsorted samples
///
/// # Examples
///
/// ```
/// # use tierstat_stats::compute_percentile;
/// let samples = vec![5.0, 1.0, 3.0, 2.0, 4.0];
/// assert_eq!(compute_percentile(&samples, 50.0), 3.0);
/// ```
pub fn compute_percentile(samples: &[f64], percentile: f64) -> f64 {
    percentile_of_sorted(&sorted_copy(samples), percentile)
}
