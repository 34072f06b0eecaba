//! Effect Size
//!
//! Cliff's delta, the non-parametric effect size reported alongside each
//! Mann-Whitney comparison, with a joint two-sample BCa interval.

use crate::bootstrap::{BootstrapConfig, BootstrapResult, compute_bootstrap_two_sample};
use serde::Serialize;

/// Cliff's delta with its confidence interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectSizeResult {
    /// Point estimate in [-1, 1]
    pub delta: f64,
    /// Lower interval bound
    pub ci_low: f64,
    /// Upper interval bound
    pub ci_high: f64,
}

impl EffectSizeResult {
    /// `(delta, ci_low, ci_high)`
    pub fn as_tuple(&self) -> (f64, f64, f64) {
        (self.delta, self.ci_low, self.ci_high)
    }

    /// Magnitude label of the point estimate
    pub fn magnitude(&self) -> EffectMagnitude {
        EffectMagnitude::from_delta(self.delta)
    }
}

impl From<BootstrapResult> for EffectSizeResult {
    fn from(result: BootstrapResult) -> Self {
        Self {
            delta: result.point_estimate,
            ci_low: result.confidence_interval.lower,
            ci_high: result.confidence_interval.upper,
        }
    }
}

/// Interpretation of |delta| (Romano et al. thresholds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectMagnitude {
    /// |δ| < 0.147
    Negligible,
    /// 0.147 <= |δ| < 0.33
    Small,
    /// 0.33 <= |δ| < 0.474
    Medium,
    /// |δ| >= 0.474
    Large,
    /// δ is NaN
    Undefined,
}

impl EffectMagnitude {
    /// Classify a Cliff's delta by its absolute value
    pub fn from_delta(delta: f64) -> Self {
        let abs_d = delta.abs();
        if delta.is_nan() {
            EffectMagnitude::Undefined
        } else if abs_d < 0.147 {
            EffectMagnitude::Negligible
        } else if abs_d < 0.33 {
            EffectMagnitude::Small
        } else if abs_d < 0.474 {
            EffectMagnitude::Medium
        } else {
            EffectMagnitude::Large
        }
    }
}

impl std::fmt::Display for EffectMagnitude {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EffectMagnitude::Negligible => write!(f, "negligible"),
            EffectMagnitude::Small => write!(f, "small"),
            EffectMagnitude::Medium => write!(f, "medium"),
            EffectMagnitude::Large => write!(f, "large"),
            EffectMagnitude::Undefined => write!(f, "undefined"),
        }
    }
}

/// Cliff's delta: `(#(g1 > g2) - #(g1 < g2)) / (n1·n2)` over all pairs
///
/// Ties count for neither side. Either group empty yields NaN.
///
/// # Examples
///
/// ```
/// # use tierstat_stats::cliffs_delta;
/// assert_eq!(cliffs_delta(&[3.0, 4.0], &[1.0, 2.0]), 1.0);
/// assert_eq!(cliffs_delta(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
/// ```
pub fn cliffs_delta(g1: &[f64], g2: &[f64]) -> f64 {
    if g1.is_empty() || g2.is_empty() {
        return f64::NAN;
    }
    let mut dominance: i64 = 0;
    for x in g1 {
        for y in g2 {
            if x > y {
                dominance += 1;
            } else if x < y {
                dominance -= 1;
            }
        }
    }
    dominance as f64 / (g1.len() * g2.len()) as f64
}

/// Cliff's delta with a BCa interval from jointly resampling both groups
///
/// Either group below `config.min_samples` returns the point estimate as
/// all three values.
pub fn cliffs_delta_ci(g1: &[f64], g2: &[f64], config: &BootstrapConfig) -> EffectSizeResult {
    compute_bootstrap_two_sample(g1, g2, cliffs_delta, config).into()
}
