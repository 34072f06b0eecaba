#![warn(missing_docs)]
//! Tierstat Statistical Engine
//!
//! Statistical evaluation of tiered agent benchmark results:
//! - BCa (Bias-Corrected and Accelerated) bootstrap intervals for one- and two-sample statistics
//! - Rank-based hypothesis tests (Mann-Whitney U, Kruskal-Wallis H, Scheirer-Ray-Hare)
//! - Shapiro-Wilk normality and Pearson/Spearman correlation
//! - Bonferroni, Holm-Bonferroni and Benjamini-Hochberg correction
//! - Cliff's delta with a bootstrap interval
//! - Monte-Carlo power analysis
//! - Cost-of-Pass, Pareto frontier and quality metrics
//! - Simple linear regression
//!
//! Operations come in pairs: `try_*` returns [`StatsError`], the plain form
//! logs the error through `tracing` and returns a documented sentinel.

mod bootstrap;
mod correction;
mod correlation;
mod distributions;
mod effect;
mod error;
mod hypothesis;
mod metrics;
mod percentiles;
mod power;
mod rank_anova;
mod ranks;
mod regression;
mod rng;
mod summary;

pub use bootstrap::{
    BootstrapConfig, BootstrapMethod, BootstrapResult, ConfidenceInterval, compute_bootstrap,
    compute_bootstrap_two_sample, compute_bootstrap_with, try_compute_bootstrap_two_sample,
    try_compute_bootstrap_with,
};
pub use correction::{
    CorrectionMethod, benjamini_hochberg_correction, bonferroni, bonferroni_correction,
    correct_p_values, holm_bonferroni_correction,
};
pub use correlation::{pearson, spearman, try_pearson, try_spearman};
pub use distributions::{chi_squared_sf, normal_cdf, normal_quantile, students_t_two_sided};
pub use effect::{EffectMagnitude, EffectSizeResult, cliffs_delta, cliffs_delta_ci};
pub use error::{StatsError, or_sentinel};
pub use hypothesis::{
    MANN_WHITNEY_EXACT_MAX, MANN_WHITNEY_EXACT_MAX_LARGER, TestOutcome, kruskal_wallis,
    mann_whitney_u, shapiro_wilk, try_kruskal_wallis, try_mann_whitney_u, try_shapiro_wilk,
};
pub use metrics::{
    ParetoPoint, consistency, cost_of_pass, frontier_cop, implementation_rate, pareto_efficiency,
    pareto_frontier,
};
pub use percentiles::{compute_percentile, percentile_of_sorted};
pub use power::{
    PowerConfig, delta_to_shift, kruskal_wallis_power, mann_whitney_power,
    try_kruskal_wallis_power, try_mann_whitney_power,
};
pub use rank_anova::{
    FactorialObservation, INTERACTION, RankAnovaTerm, ScheirerRayHareResult, scheirer_ray_hare,
    try_scheirer_ray_hare,
};
pub use ranks::rank_average;
pub use regression::{RegressionResult, linear_regression, try_linear_regression};
pub use rng::{EngineRng, rng_for, seed_for_key};
pub use summary::{SummaryStatistics, compute_summary, mean};

/// Default number of bootstrap resamples
pub const DEFAULT_BOOTSTRAP_RESAMPLES: usize = 10_000;

/// Default confidence level (95%)
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Default seed for bootstrap resampling and power simulation
pub const DEFAULT_SEED: u64 = 42;

/// Default significance level
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Default number of Monte-Carlo power trials
pub const DEFAULT_POWER_SIMULATIONS: usize = 10_000;

/// Smallest sample a bootstrap interval is computed for
pub const DEFAULT_MIN_BOOTSTRAP_SAMPLES: usize = 2;

/// Smallest group the Mann-Whitney test accepts
pub const DEFAULT_MIN_MANN_WHITNEY_SAMPLES: usize = 2;

/// Smallest sample the Shapiro-Wilk test accepts
pub const DEFAULT_MIN_NORMALITY_SAMPLES: usize = 3;

/// Smallest paired sample a correlation is computed for
pub const DEFAULT_MIN_CORRELATION_SAMPLES: usize = 3;

/// Smallest group the Kruskal-Wallis test accepts
pub const DEFAULT_MIN_KRUSKAL_WALLIS_SAMPLES: usize = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(DEFAULT_BOOTSTRAP_RESAMPLES, 10_000);
        assert_eq!(DEFAULT_POWER_SIMULATIONS, 10_000);
        assert_eq!(DEFAULT_SEED, 42);
        assert!((DEFAULT_CONFIDENCE_LEVEL - 0.95).abs() < f64::EPSILON);
        assert!((DEFAULT_ALPHA - 0.05).abs() < f64::EPSILON);
        assert_eq!(DEFAULT_MIN_BOOTSTRAP_SAMPLES, 2);
        assert_eq!(DEFAULT_MIN_MANN_WHITNEY_SAMPLES, 2);
        assert_eq!(DEFAULT_MIN_NORMALITY_SAMPLES, 3);
        assert_eq!(DEFAULT_MIN_CORRELATION_SAMPLES, 3);
        assert_eq!(DEFAULT_MIN_KRUSKAL_WALLIS_SAMPLES, 2);
    }
}
