//! Multiple Comparison Correction
//!
//! Corrected p-values are written back to the position of their raw p-value,
//! so `corrected[i]` always belongs to the comparison that produced `raw[i]`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Correction procedure applied to a family of p-values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CorrectionMethod {
    /// No correction
    None,
    /// Single-step FWER control
    Bonferroni,
    /// Step-down FWER control (default)
    #[default]
    Holm,
    /// Step-up FDR control
    BenjaminiHochberg,
}

impl std::fmt::Display for CorrectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorrectionMethod::None => write!(f, "none"),
            CorrectionMethod::Bonferroni => write!(f, "bonferroni"),
            CorrectionMethod::Holm => write!(f, "holm"),
            CorrectionMethod::BenjaminiHochberg => write!(f, "benjamini-hochberg"),
        }
    }
}

/// Correct a family of p-values with `method`
pub fn correct_p_values(p_values: &[f64], method: CorrectionMethod) -> Vec<f64> {
    match method {
        CorrectionMethod::None => p_values.to_vec(),
        CorrectionMethod::Bonferroni => bonferroni_correction(p_values),
        CorrectionMethod::Holm => holm_bonferroni_correction(p_values),
        CorrectionMethod::BenjaminiHochberg => benjamini_hochberg_correction(p_values),
    }
}

/// Bonferroni-corrected p-value for one of `n_tests` comparisons: `min(1, p·n)`
pub fn bonferroni(p_value: f64, n_tests: usize) -> f64 {
    (p_value * n_tests as f64).min(1.0)
}

/// Bonferroni correction of a whole family
pub fn bonferroni_correction(p_values: &[f64]) -> Vec<f64> {
    let n = p_values.len();
    p_values.iter().map(|&p| bonferroni(p, n)).collect()
}

/// Holm-Bonferroni step-down correction
///
/// The k-th smallest p-value (0-based) is multiplied by `n - k`, then a running
/// maximum along the ascending order keeps the corrected values monotone.
///
/// # Examples
///
/// ```
/// # use tierstat_stats::holm_bonferroni_correction;
/// assert_eq!(holm_bonferroni_correction(&[0.01, 0.011]), vec![0.02, 0.02]);
/// ```
pub fn holm_bonferroni_correction(p_values: &[f64]) -> Vec<f64> {
    let n = p_values.len();
    let order = ascending_order(p_values);
    let mut corrected = vec![0.0; n];

    let mut running_max = 0.0f64;
    for (rank, &idx) in order.iter().enumerate() {
        let adjusted = (p_values[idx] * (n - rank) as f64).min(1.0);
        running_max = running_max.max(adjusted);
        corrected[idx] = running_max;
    }
    corrected
}

/// Benjamini-Hochberg correction
///
/// The k-th smallest p-value (0-based) is multiplied by `n / (k + 1)` and
/// clamped to [0, 1]. No step-up minimum is taken from the largest rank
/// downward, so the corrected values are not forced to be monotone.
pub fn benjamini_hochberg_correction(p_values: &[f64]) -> Vec<f64> {
    let n = p_values.len();
    let order = ascending_order(p_values);
    let mut corrected = vec![0.0; n];

    for (rank, &idx) in order.iter().enumerate() {
        corrected[idx] = (p_values[idx] * n as f64 / (rank + 1) as f64).clamp(0.0, 1.0);
    }
    corrected
}

/// Indices of `values` sorted by ascending value (stable for ties)
fn ascending_order(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(Ordering::Equal)
    });
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-12, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn test_bonferroni() {
        assert!((bonferroni(0.01, 3) - 0.03).abs() < 1e-15);
        assert_eq!(bonferroni(0.5, 3), 1.0);
        assert_close(&bonferroni_correction(&[0.01, 0.04]), &[0.02, 0.08]);
    }

    #[test]
    fn test_holm_enforces_monotonicity() {
        assert_close(&holm_bonferroni_correction(&[0.01, 0.011]), &[0.02, 0.02]);
    }

    #[test]
    fn test_holm_preserves_positions() {
        let raw = [0.04, 0.01, 0.03];
        // sorted: 0.01·3 = 0.03, 0.03·2 = 0.06, 0.04·1 = 0.04 -> 0.06
        assert_close(&holm_bonferroni_correction(&raw), &[0.06, 0.03, 0.06]);
    }

    #[test]
    fn test_holm_clamps_to_one() {
        assert_close(&holm_bonferroni_correction(&[0.6, 0.9]), &[1.0, 1.0]);
    }

    #[test]
    fn test_benjamini_hochberg() {
        let raw = [0.01, 0.04, 0.03, 0.02];
        // ranks: 0.01→×4, 0.02→×2, 0.03→×4/3, 0.04→×1
        assert_close(
            &benjamini_hochberg_correction(&raw),
            &[0.04, 0.04, 0.04, 0.04],
        );
    }

    #[test]
    fn test_benjamini_hochberg_has_no_step_up_pass() {
        // 0.02·3 = 0.06 at rank 0 stays above 0.021·3/2 = 0.0315 at rank 1
        let raw = [0.02, 0.021, 0.9];
        let corrected = benjamini_hochberg_correction(&raw);
        assert_close(&corrected, &[0.06, 0.0315, 0.9]);
        assert!(corrected[0] > corrected[1]);
    }

    #[test]
    fn test_empty_family() {
        assert!(holm_bonferroni_correction(&[]).is_empty());
        assert!(benjamini_hochberg_correction(&[]).is_empty());
        assert!(bonferroni_correction(&[]).is_empty());
    }

    #[test]
    fn test_dispatch() {
        let raw = [0.01, 0.011];
        assert_eq!(correct_p_values(&raw, CorrectionMethod::None), raw.to_vec());
        assert_eq!(
            correct_p_values(&raw, CorrectionMethod::Holm),
            holm_bonferroni_correction(&raw)
        );
        assert_eq!(CorrectionMethod::default(), CorrectionMethod::Holm);
        assert_eq!(
            CorrectionMethod::BenjaminiHochberg.to_string(),
            "benjamini-hochberg"
        );
    }
}
