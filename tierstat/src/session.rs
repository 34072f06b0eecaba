//! Analysis session
//!
//! An [`AnalysisSession`] binds one [`AnalysisConfig`] to the engine so callers
//! do not thread thresholds, seeds and alpha through every call.

use crate::config::AnalysisConfig;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tierstat_stats::{
    BootstrapConfig, BootstrapResult, EffectMagnitude, EffectSizeResult, FactorialObservation,
    RegressionResult, ScheirerRayHareResult, SummaryStatistics, TestOutcome, cliffs_delta_ci,
    compute_bootstrap, compute_summary, consistency, correct_p_values, cost_of_pass,
    linear_regression, or_sentinel, scheirer_ray_hare, seed_for_key, try_kruskal_wallis,
    try_mann_whitney_u, try_pearson, try_shapiro_wilk, try_spearman,
};
use tracing::debug;

/// Mann-Whitney comparison of a candidate against a baseline
///
/// U and Cliff's delta are computed for the candidate, so a positive delta
/// means the candidate tends to score higher.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseComparison {
    /// Baseline group size
    pub n_baseline: usize,
    /// Candidate group size
    pub n_candidate: usize,
    /// Mann-Whitney U of the candidate
    pub u_statistic: f64,
    /// Raw two-sided p-value
    pub p_value: f64,
    /// p-value after family-wise correction; equals `p_value` for a single comparison
    pub corrected_p_value: f64,
    /// Cliff's delta with its bootstrap interval
    pub effect: EffectSizeResult,
    /// Magnitude label of `effect.delta`
    pub magnitude: EffectMagnitude,
    /// Post-hoc power at the observed delta
    pub power: f64,
    /// `corrected_p_value < alpha`
    pub significant: bool,
}

/// Kruskal-Wallis omnibus test across several groups
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OmnibusResult {
    /// Number of groups
    pub n_groups: usize,
    /// Observations across all groups
    pub n_total: usize,
    /// Kruskal-Wallis H and p-value
    pub test: TestOutcome,
    /// `H / (N - 1)`
    pub epsilon_squared: f64,
    /// Post-hoc power at the observed epsilon-squared
    pub power: f64,
    /// `test.p_value < alpha`
    pub significant: bool,
}

/// Engine operations bound to one configuration
#[derive(Debug, Clone, Default)]
pub struct AnalysisSession {
    config: AnalysisConfig,
}

impl AnalysisSession {
    /// Create a session for `config`
    pub fn new(config: AnalysisConfig) -> Self {
        debug!(
            alpha = config.alpha,
            correction = %config.correction,
            resamples = config.bootstrap.resamples,
            simulations = config.power.simulations,
            "analysis session created"
        );
        Self { config }
    }

    /// Session configuration
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Mann-Whitney U test; `(0.0, 1.0)` below the configured group size
    pub fn mann_whitney_u(&self, g1: &[f64], g2: &[f64]) -> TestOutcome {
        or_sentinel(
            try_mann_whitney_u(g1, g2, self.config.min_samples.mann_whitney),
            TestOutcome::new(0.0, 1.0),
        )
    }

    /// Kruskal-Wallis H test; `(NaN, NaN)` when undefined
    pub fn kruskal_wallis<G: AsRef<[f64]>>(&self, groups: &[G]) -> TestOutcome {
        or_sentinel(
            try_kruskal_wallis(groups, self.config.min_samples.kruskal_wallis),
            TestOutcome::undefined(),
        )
    }

    /// Shapiro-Wilk normality test; `(NaN, NaN)` when undefined
    pub fn shapiro_wilk(&self, sample: &[f64]) -> TestOutcome {
        or_sentinel(
            try_shapiro_wilk(sample, self.config.min_samples.normality),
            TestOutcome::undefined(),
        )
    }

    /// Pearson correlation; `(NaN, NaN)` when undefined
    pub fn pearson(&self, x: &[f64], y: &[f64]) -> TestOutcome {
        or_sentinel(
            try_pearson(x, y, self.config.min_samples.correlation),
            TestOutcome::undefined(),
        )
    }

    /// Spearman correlation; `(NaN, NaN)` when undefined
    pub fn spearman(&self, x: &[f64], y: &[f64]) -> TestOutcome {
        or_sentinel(
            try_spearman(x, y, self.config.min_samples.correlation),
            TestOutcome::undefined(),
        )
    }

    /// Scheirer-Ray-Hare two-way rank ANOVA
    pub fn scheirer_ray_hare(
        &self,
        records: &[FactorialObservation],
        factor_a: &str,
        factor_b: &str,
    ) -> ScheirerRayHareResult {
        scheirer_ray_hare(records, factor_a, factor_b)
    }

    /// BCa interval for the mean
    pub fn bootstrap_mean(&self, samples: &[f64]) -> BootstrapResult {
        compute_bootstrap(samples, &self.config.bootstrap_config())
    }

    /// Cliff's delta of `g1` against `g2` with a BCa interval
    pub fn cliffs_delta(&self, g1: &[f64], g2: &[f64]) -> EffectSizeResult {
        cliffs_delta_ci(g1, g2, &self.config.bootstrap_config())
    }

    /// Post-hoc Mann-Whitney power at `delta`
    pub fn mann_whitney_power(&self, n1: usize, n2: usize, delta: f64) -> f64 {
        tierstat_stats::mann_whitney_power(n1, n2, delta, &self.config.power_config())
    }

    /// Post-hoc Kruskal-Wallis power at an epsilon-squared `effect_size`
    pub fn kruskal_wallis_power(&self, group_sizes: &[usize], effect_size: f64) -> f64 {
        tierstat_stats::kruskal_wallis_power(group_sizes, effect_size, &self.config.power_config())
    }

    /// Apply the configured correction to a family of p-values
    pub fn correct(&self, p_values: &[f64]) -> Vec<f64> {
        correct_p_values(p_values, self.config.correction)
    }

    /// OLS fit of `y` on `x`
    pub fn linear_regression(&self, x: &[f64], y: &[f64]) -> RegressionResult {
        linear_regression(x, y)
    }

    /// Compare one candidate group against a baseline
    pub fn compare(&self, baseline: &[f64], candidate: &[f64]) -> PairwiseComparison {
        let test = self.mann_whitney_u(candidate, baseline);
        let effect = self.cliffs_delta(candidate, baseline);
        let power = self.mann_whitney_power(candidate.len(), baseline.len(), effect.delta);

        PairwiseComparison {
            n_baseline: baseline.len(),
            n_candidate: candidate.len(),
            u_statistic: test.statistic,
            p_value: test.p_value,
            corrected_p_value: test.p_value,
            magnitude: effect.magnitude(),
            effect,
            power,
            significant: test.is_significant(self.config.alpha),
        }
    }

    /// Compare every `(baseline, candidate)` pair, correcting across the family
    ///
    /// Results are in input order; significance is judged on the corrected
    /// p-value.
    pub fn compare_family(&self, pairs: &[(&[f64], &[f64])]) -> Vec<PairwiseComparison> {
        let mut comparisons: Vec<PairwiseComparison> = pairs
            .iter()
            .map(|(baseline, candidate)| self.compare(baseline, candidate))
            .collect();

        let raw: Vec<f64> = comparisons.iter().map(|c| c.p_value).collect();
        let corrected = self.correct(&raw);
        for (comparison, p) in comparisons.iter_mut().zip(corrected) {
            comparison.corrected_p_value = p;
            comparison.significant = p < self.config.alpha;
        }
        comparisons
    }

    /// Kruskal-Wallis across `groups` with post-hoc power
    pub fn omnibus<G: AsRef<[f64]>>(&self, groups: &[G]) -> OmnibusResult {
        let sizes: Vec<usize> = groups.iter().map(|g| g.as_ref().len()).collect();
        let n_total: usize = sizes.iter().sum();
        let test = self.kruskal_wallis(groups);

        let epsilon_squared = if n_total > 1 {
            test.statistic / (n_total - 1) as f64
        } else {
            f64::NAN
        };
        let power = if epsilon_squared.is_nan() {
            f64::NAN
        } else {
            self.kruskal_wallis_power(&sizes, epsilon_squared.max(0.0))
        };

        OmnibusResult {
            n_groups: groups.len(),
            n_total,
            test,
            epsilon_squared,
            power,
            significant: test.is_significant(self.config.alpha),
        }
    }

    /// Bootstrap the mean of every group in parallel
    ///
    /// Each group is seeded from the configured seed and its key, so a group's
    /// interval does not depend on which other groups are present.
    pub fn bootstrap_groups<K>(
        &self,
        groups: &BTreeMap<K, Vec<f64>>,
    ) -> BTreeMap<K, BootstrapResult>
    where
        K: AsRef<str> + Ord + Clone + Send + Sync,
    {
        let base = self.config.bootstrap_config();
        groups
            .par_iter()
            .map(|(key, samples)| {
                let config = BootstrapConfig {
                    seed: seed_for_key(base.seed, key.as_ref()),
                    ..base.clone()
                };
                (key.clone(), compute_bootstrap(samples, &config))
            })
            .collect()
    }

    /// Summary statistics of one group
    pub fn summarize(&self, samples: &[f64]) -> SummaryStatistics {
        compute_summary(samples)
    }

    /// Cost-of-Pass from per-run costs and pass flags
    ///
    /// # Panics
    ///
    /// Panics if `costs` and `passed` differ in length.
    pub fn cost_of_pass_from_runs(&self, costs: &[f64], passed: &[bool]) -> f64 {
        assert_eq!(
            costs.len(),
            passed.len(),
            "cost_of_pass_from_runs: costs and pass flags must have equal length"
        );
        if costs.is_empty() {
            return f64::INFINITY;
        }
        let mean_cost = compute_summary(costs).mean;
        let pass_rate = passed.iter().filter(|&&p| p).count() as f64 / passed.len() as f64;
        cost_of_pass(mean_cost, pass_rate)
    }

    /// Consistency of one group's scores
    pub fn consistency_of(&self, samples: &[f64]) -> f64 {
        let summary = compute_summary(samples);
        consistency(summary.mean, summary.std_dev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_session() -> AnalysisSession {
        let mut config = AnalysisConfig::default();
        config.bootstrap.resamples = 1_000;
        config.power.simulations = 300;
        AnalysisSession::new(config)
    }

    #[test]
    fn test_compare_separated_groups() {
        let session = quick_session();
        let baseline = [0.1, 0.2, 0.3, 0.4, 0.5];
        let candidate = [0.6, 0.7, 0.8, 0.9, 1.0];
        let cmp = session.compare(&baseline, &candidate);

        assert_eq!(cmp.u_statistic, 25.0);
        assert!(cmp.p_value < 0.01);
        assert_eq!(cmp.corrected_p_value, cmp.p_value);
        assert_eq!(cmp.effect.delta, 1.0);
        assert_eq!(cmp.magnitude, EffectMagnitude::Large);
        assert!(cmp.significant);
        assert!((0.0..=1.0).contains(&cmp.power));
    }

    #[test]
    fn test_compare_small_groups_use_sentinels() {
        let session = quick_session();
        let cmp = session.compare(&[0.5], &[0.1, 0.9]);
        assert_eq!((cmp.u_statistic, cmp.p_value), (0.0, 1.0));
        assert!(!cmp.significant);
        assert!(cmp.power.is_nan());
    }

    #[test]
    fn test_compare_family_applies_correction() {
        let session = quick_session();
        let baseline = [0.1, 0.2, 0.3, 0.4, 0.5];
        let better = [0.6, 0.7, 0.8, 0.9, 1.0];
        let same = [0.15, 0.25, 0.35, 0.45, 0.55];
        let family =
            session.compare_family(&[(&baseline[..], &better[..]), (&baseline[..], &same[..])]);

        assert_eq!(family.len(), 2);
        let raw: Vec<f64> = family.iter().map(|c| c.p_value).collect();
        let expected = tierstat_stats::holm_bonferroni_correction(&raw);
        for (cmp, p) in family.iter().zip(expected) {
            assert_eq!(cmp.corrected_p_value, p);
            assert!(cmp.corrected_p_value >= cmp.p_value);
            assert_eq!(cmp.significant, p < 0.05);
        }
    }

    #[test]
    fn test_omnibus() {
        let session = quick_session();
        let groups = vec![
            vec![1.0, 2.0, 3.0, 4.0],
            vec![5.0, 6.0, 7.0, 8.0],
            vec![9.0, 10.0, 11.0, 12.0],
        ];
        let result = session.omnibus(&groups);
        assert_eq!(result.n_groups, 3);
        assert_eq!(result.n_total, 12);
        assert!(result.significant);
        assert!((result.epsilon_squared - result.test.statistic / 11.0).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&result.power));
    }

    #[test]
    fn test_omnibus_single_group() {
        let session = quick_session();
        let result = session.omnibus(&[vec![1.0, 2.0, 3.0]]);
        assert!(result.test.p_value.is_nan());
        assert!(result.power.is_nan());
        assert!(!result.significant);
    }

    #[test]
    fn test_bootstrap_groups_is_key_seeded() {
        let session = quick_session();
        let mut groups = BTreeMap::new();
        groups.insert("opus/T0".to_string(), vec![0.2, 0.4, 0.5, 0.9, 0.1]);
        groups.insert("opus/T1".to_string(), vec![0.6, 0.4, 0.8, 0.9, 0.7]);
        let all = session.bootstrap_groups(&groups);

        let mut alone = BTreeMap::new();
        alone.insert("opus/T1".to_string(), groups["opus/T1"].clone());
        let single = session.bootstrap_groups(&alone);

        assert_eq!(all.len(), 2);
        assert_eq!(all["opus/T1"], single["opus/T1"]);
    }

    #[test]
    fn test_cost_of_pass_from_runs() {
        let session = AnalysisSession::default();
        let cop =
            session.cost_of_pass_from_runs(&[1.0, 2.0, 3.0, 2.0], &[true, false, true, false]);
        assert_eq!(cop, 4.0);
        assert_eq!(
            session.cost_of_pass_from_runs(&[1.0, 1.0], &[false, false]),
            f64::INFINITY
        );
        assert_eq!(session.cost_of_pass_from_runs(&[], &[]), f64::INFINITY);
    }

    #[test]
    fn test_consistency_of() {
        let session = AnalysisSession::default();
        assert_eq!(session.consistency_of(&[0.5, 0.5, 0.5]), 1.0);
        assert_eq!(session.consistency_of(&[]), 0.0);
        let c = session.consistency_of(&[0.2, 0.8]);
        assert!((0.0..=1.0).contains(&c));
    }

    #[test]
    fn test_configured_minimum_is_respected() {
        let mut config = AnalysisConfig::default();
        config.min_samples.mann_whitney = 4;
        let session = AnalysisSession::new(config);
        let outcome = session.mann_whitney_u(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);
        assert_eq!(outcome.as_tuple(), (0.0, 1.0));
    }
}
