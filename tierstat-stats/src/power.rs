//! Power Analysis
//!
//! Monte-Carlo power for the rank tests: simulate the alternative implied by
//! an observed effect size, run the test on every trial and report the
//! fraction of trials that reject at `alpha`.
//!
//! Trial `i` draws from a generator seeded with `(seed, i)`, so an estimate
//! is reproducible across runs, platforms and thread counts.

use crate::distributions::normal_quantile;
use crate::error::{StatsError, or_sentinel};
use crate::hypothesis::{ExactUDistribution, mann_whitney_with, try_kruskal_wallis, uses_exact_u};
use crate::rng::{EngineRng, rng_for};
use crate::{DEFAULT_ALPHA, DEFAULT_POWER_SIMULATIONS, DEFAULT_SEED};
use rand::Rng;
use rand_distr::StandardNormal;
use rayon::prelude::*;
use std::f64::consts::SQRT_2;
use tracing::debug;

/// Smallest |delta| treated as a real effect
const NULL_EFFECT_EPSILON: f64 = 1e-10;

/// Bound keeping `(delta + 1) / 2` inside the open unit interval
const PROBABILITY_CLAMP: f64 = 1e-12;

/// Simulation settings
#[derive(Debug, Clone, PartialEq)]
pub struct PowerConfig {
    /// Significance level a trial must beat
    pub alpha: f64,
    /// Number of simulated trials
    pub simulations: usize,
    /// Base seed; trial `i` uses the stream for `(seed, i)`
    pub seed: u64,
    /// Run trials on the rayon pool
    pub parallel: bool,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            simulations: DEFAULT_POWER_SIMULATIONS,
            seed: DEFAULT_SEED,
            parallel: true,
        }
    }
}

impl PowerConfig {
    fn check(&self, test: &'static str) -> Result<(), StatsError> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(StatsError::invalid(
                test,
                format!("alpha {} must be between 0 and 1", self.alpha),
            ));
        }
        if self.simulations == 0 {
            return Err(StatsError::invalid(test, "simulation count must be positive"));
        }
        Ok(())
    }
}

/// Standardized mean shift equivalent to a Cliff's delta
///
/// Under two unit-variance normals, `P(X > Y) = Φ(shift / √2)`, and
/// `delta = 2·P(X > Y) - 1`.
pub fn delta_to_shift(delta: f64) -> f64 {
    let prob = ((delta + 1.0) / 2.0).clamp(PROBABILITY_CLAMP, 1.0 - PROBABILITY_CLAMP);
    SQRT_2 * normal_quantile(prob)
}

/// Post-hoc power of the Mann-Whitney test; NaN when it cannot be estimated
pub fn mann_whitney_power(n1: usize, n2: usize, delta: f64, config: &PowerConfig) -> f64 {
    or_sentinel(try_mann_whitney_power(n1, n2, delta, config), f64::NAN)
}

/// Fallible Mann-Whitney power
///
/// A null effect returns `alpha` without simulating.
pub fn try_mann_whitney_power(
    n1: usize,
    n2: usize,
    delta: f64,
    config: &PowerConfig,
) -> Result<f64, StatsError> {
    const TEST: &str = "mann_whitney_power";
    if n1 < 2 || n2 < 2 {
        return Err(StatsError::InsufficientData {
            test: TEST,
            got: n1.min(n2),
            min: 2,
        });
    }
    config.check(TEST)?;
    if !delta.is_finite() {
        return Err(StatsError::invalid(TEST, format!("effect size {delta} is not finite")));
    }
    if delta.abs() < NULL_EFFECT_EPSILON {
        return Ok(config.alpha);
    }

    let shift = delta_to_shift(delta);
    debug!(n1, n2, delta, shift, "simulating Mann-Whitney power");

    let exact = uses_exact_u(n1, n2).then(|| ExactUDistribution::new(n1, n2));
    let rejects = |trial: usize| {
        let mut rng = rng_for(config.seed, trial as u64);
        let g1 = normal_sample(&mut rng, n1, 0.0);
        let g2 = normal_sample(&mut rng, n2, shift);
        mann_whitney_with(&g1, &g2, 2, exact.as_ref())
            .map(|outcome| outcome.p_value < config.alpha)
            .unwrap_or(false)
    };

    Ok(rejection_rate(config, rejects))
}

/// Post-hoc power of the Kruskal-Wallis test; NaN when it cannot be estimated
pub fn kruskal_wallis_power(group_sizes: &[usize], effect_size: f64, config: &PowerConfig) -> f64 {
    or_sentinel(
        try_kruskal_wallis_power(group_sizes, effect_size, config),
        f64::NAN,
    )
}

/// Fallible Kruskal-Wallis power
///
/// The epsilon-squared `effect_size` is spread over the groups as means on
/// an evenly spaced schedule from `-√effect_size` to `+√effect_size`.
pub fn try_kruskal_wallis_power(
    group_sizes: &[usize],
    effect_size: f64,
    config: &PowerConfig,
) -> Result<f64, StatsError> {
    const TEST: &str = "kruskal_wallis_power";
    if group_sizes.len() < 2 {
        return Err(StatsError::InsufficientData {
            test: TEST,
            got: group_sizes.len(),
            min: 2,
        });
    }
    if let Some(&smallest) = group_sizes.iter().min().filter(|&&n| n < 2) {
        return Err(StatsError::InsufficientData {
            test: TEST,
            got: smallest,
            min: 2,
        });
    }
    config.check(TEST)?;
    if !(effect_size.is_finite() && effect_size >= 0.0) {
        return Err(StatsError::invalid(
            TEST,
            format!("effect size {effect_size} must be finite and non-negative"),
        ));
    }

    let means = mean_schedule(group_sizes.len(), effect_size.sqrt());
    debug!(groups = group_sizes.len(), effect_size, "simulating Kruskal-Wallis power");

    let rejects = |trial: usize| {
        let mut rng = rng_for(config.seed, trial as u64);
        let groups: Vec<Vec<f64>> = group_sizes
            .iter()
            .zip(&means)
            .map(|(&n, &mu)| normal_sample(&mut rng, n, mu))
            .collect();
        try_kruskal_wallis(&groups, 2)
            .map(|outcome| outcome.p_value < config.alpha)
            .unwrap_or(false)
    };

    Ok(rejection_rate(config, rejects))
}

/// `k` evenly spaced values from `-half_width` to `+half_width`
fn mean_schedule(k: usize, half_width: f64) -> Vec<f64> {
    let step = 2.0 * half_width / (k - 1) as f64;
    (0..k).map(|i| -half_width + step * i as f64).collect()
}

fn normal_sample(rng: &mut EngineRng, n: usize, mean: f64) -> Vec<f64> {
    (0..n)
        .map(|_| mean + rng.sample::<f64, _>(StandardNormal))
        .collect()
}

fn rejection_rate<F>(config: &PowerConfig, rejects: F) -> f64
where
    F: Fn(usize) -> bool + Sync,
{
    let count = if config.parallel {
        (0..config.simulations)
            .into_par_iter()
            .filter(|&i| rejects(i))
            .count()
    } else {
        (0..config.simulations).filter(|&i| rejects(i)).count()
    };
    count as f64 / config.simulations as f64
}
