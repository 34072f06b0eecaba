//! Bootstrap Resampling
//!
//! BCa (Bias-Corrected and Accelerated) confidence intervals for an arbitrary
//! scalar statistic of one sample, or of several samples resampled jointly.
//!
//! Resample `i` draws its indices from a generator seeded with `(seed, i)`,
//! so a fixed seed reproduces the interval bit for bit whether the resamples
//! run serially or on the rayon pool.

use crate::distributions::{normal_cdf, normal_quantile};
use crate::error::{StatsError, or_sentinel, require_finite, require_len};
use crate::percentiles::percentile_of_sorted;
use crate::rng::rng_for;
use crate::summary::mean;
use crate::{
    DEFAULT_BOOTSTRAP_RESAMPLES, DEFAULT_CONFIDENCE_LEVEL, DEFAULT_MIN_BOOTSTRAP_SAMPLES,
    DEFAULT_SEED,
};
use rand::Rng;
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

const TEST: &str = "bootstrap";

/// Bootstrap configuration
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapConfig {
    /// Number of bootstrap resamples (default: 10,000)
    pub resamples: usize,
    /// Confidence level (default: 0.95 for 95% CI)
    pub confidence_level: f64,
    /// Seed of the resampling stream (default: 42)
    pub seed: u64,
    /// Samples below this size collapse to the point estimate (default: 2)
    pub min_samples: usize,
    /// Whether to use parallel computation
    pub parallel: bool,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            resamples: DEFAULT_BOOTSTRAP_RESAMPLES,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            seed: DEFAULT_SEED,
            min_samples: DEFAULT_MIN_BOOTSTRAP_SAMPLES,
            parallel: true,
        }
    }
}

/// Which method produced the interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapMethod {
    /// Bias-corrected and accelerated percentile interval
    Bca,
    /// No resampling: the interval collapsed onto the point estimate
    Collapsed,
}

/// Confidence interval bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    /// Lower bound
    pub lower: f64,
    /// Upper bound
    pub upper: f64,
    /// Confidence level in (0, 1)
    pub level: f64,
}

/// Result of bootstrap analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BootstrapResult {
    /// Statistic evaluated on the original sample(s)
    pub point_estimate: f64,
    /// Confidence interval
    pub confidence_interval: ConfidenceInterval,
    /// Standard deviation of the bootstrap distribution
    pub standard_error: f64,
    /// Which method was used
    pub method: BootstrapMethod,
}

impl BootstrapResult {
    /// Interval collapsed onto `value`
    pub fn collapsed(value: f64, level: f64) -> Self {
        Self {
            point_estimate: value,
            confidence_interval: ConfidenceInterval {
                lower: value,
                upper: value,
                level,
            },
            standard_error: 0.0,
            method: BootstrapMethod::Collapsed,
        }
    }

    /// `(point_estimate, ci_low, ci_high)`
    pub fn as_tuple(&self) -> (f64, f64, f64) {
        (
            self.point_estimate,
            self.confidence_interval.lower,
            self.confidence_interval.upper,
        )
    }
}

/// BCa interval for the mean of `samples`
pub fn compute_bootstrap(samples: &[f64], config: &BootstrapConfig) -> BootstrapResult {
    compute_bootstrap_with(samples, mean, config)
}

/// BCa interval for `statistic` of `samples`
///
/// Never fails: samples below `config.min_samples` and zero-variance samples
/// collapse to `(value, value, value)`; other failures are logged and
/// collapse the same way.
pub fn compute_bootstrap_with<F>(
    samples: &[f64],
    statistic: F,
    config: &BootstrapConfig,
) -> BootstrapResult
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    let value = point_or_nan(&[samples], &|s: &[&[f64]]| statistic(s[0]));
    or_sentinel(
        try_compute_bootstrap_with(samples, &statistic, config),
        BootstrapResult::collapsed(value, config.confidence_level),
    )
}

/// Fallible form of [`compute_bootstrap_with`]
///
/// Zero variance is not an error: it yields a collapsed result.
pub fn try_compute_bootstrap_with<F>(
    samples: &[f64],
    statistic: F,
    config: &BootstrapConfig,
) -> Result<BootstrapResult, StatsError>
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    bca(&[samples], &|s: &[&[f64]]| statistic(s[0]), config)
}

/// BCa interval for a two-sample statistic, resampling both groups jointly
pub fn compute_bootstrap_two_sample<F>(
    first: &[f64],
    second: &[f64],
    statistic: F,
    config: &BootstrapConfig,
) -> BootstrapResult
where
    F: Fn(&[f64], &[f64]) -> f64 + Sync,
{
    let stat = |s: &[&[f64]]| statistic(s[0], s[1]);
    let value = point_or_nan(&[first, second], &stat);
    or_sentinel(
        bca(&[first, second], &stat, config),
        BootstrapResult::collapsed(value, config.confidence_level),
    )
}

/// Fallible form of [`compute_bootstrap_two_sample`]
pub fn try_compute_bootstrap_two_sample<F>(
    first: &[f64],
    second: &[f64],
    statistic: F,
    config: &BootstrapConfig,
) -> Result<BootstrapResult, StatsError>
where
    F: Fn(&[f64], &[f64]) -> f64 + Sync,
{
    bca(
        &[first, second],
        &|s: &[&[f64]]| statistic(s[0], s[1]),
        config,
    )
}

fn point_or_nan<S>(samples: &[&[f64]], statistic: &S) -> f64
where
    S: Fn(&[&[f64]]) -> f64,
{
    if samples.iter().any(|s| s.is_empty()) {
        f64::NAN
    } else {
        statistic(samples)
    }
}

fn bca<S>(
    samples: &[&[f64]],
    statistic: &S,
    config: &BootstrapConfig,
) -> Result<BootstrapResult, StatsError>
where
    S: Fn(&[&[f64]]) -> f64 + Sync,
{
    if !(config.confidence_level > 0.0 && config.confidence_level < 1.0) {
        return Err(StatsError::invalid(
            TEST,
            format!(
                "confidence level {} must be between 0 and 1",
                config.confidence_level
            ),
        ));
    }
    if config.resamples == 0 {
        return Err(StatsError::invalid(TEST, "resample count must be positive"));
    }
    for sample in samples {
        require_len(TEST, sample.len(), config.min_samples.max(1))?;
        require_finite(TEST, sample)?;
    }

    let level = config.confidence_level;
    let point_estimate = statistic(samples);

    if samples.iter().all(|s| is_constant(s)) {
        debug!("bootstrap: zero variance, interval collapsed");
        return Ok(BootstrapResult::collapsed(point_estimate, level));
    }

    let mut distribution = resample_distribution(samples, statistic, config);
    if let Some(bad) = distribution.iter().find(|v| !v.is_finite()) {
        return Err(StatsError::numerical(
            TEST,
            format!("statistic produced non-finite value {bad} on a resample"),
        ));
    }

    let b = distribution.len() as f64;
    let boot_mean = distribution.iter().sum::<f64>() / b;
    let standard_error = if distribution.len() > 1 {
        (distribution
            .iter()
            .map(|x| (x - boot_mean).powi(2))
            .sum::<f64>()
            / (b - 1.0))
            .sqrt()
    } else {
        0.0
    };

    // Bias correction factor (z0)
    let count_below = distribution.iter().filter(|&&x| x < point_estimate).count();
    let prop = count_below as f64 / b;
    let z0 = normal_quantile(prop.clamp(0.0001, 0.9999));

    let a = acceleration(samples, statistic);

    distribution.sort_by(|x, y| x.partial_cmp(y).unwrap_or(Ordering::Equal));
    if distribution[0] == distribution[distribution.len() - 1] {
        debug!("bootstrap: degenerate resample distribution, interval collapsed");
        return Ok(BootstrapResult::collapsed(point_estimate, level));
    }

    let alpha = (1.0 - level) / 2.0;
    let alpha1 = adjusted_level(z0, a, normal_quantile(alpha));
    let alpha2 = adjusted_level(z0, a, normal_quantile(1.0 - alpha));
    if !alpha1.is_finite() || !alpha2.is_finite() {
        return Err(StatsError::numerical(
            TEST,
            format!("adjusted percentile levels undefined (z0 = {z0}, a = {a})"),
        ));
    }

    let lower = percentile_of_sorted(&distribution, alpha1 * 100.0);
    let upper = percentile_of_sorted(&distribution, alpha2 * 100.0);

    debug!(
        "bootstrap: z0={z0:.4} a={a:.4} levels=({alpha1:.4}, {alpha2:.4}) ci=[{lower}, {upper}]"
    );

    Ok(BootstrapResult {
        point_estimate,
        confidence_interval: ConfidenceInterval {
            lower: lower.min(point_estimate),
            upper: upper.max(point_estimate),
            level,
        },
        standard_error,
        method: BootstrapMethod::Bca,
    })
}

/// `Φ(z0 + (z0 + z)/(1 - a(z0 + z)))`
fn adjusted_level(z0: f64, a: f64, z: f64) -> f64 {
    let shifted = z0 + z;
    normal_cdf(z0 + shifted / (1.0 - a * shifted))
}

fn is_constant(sample: &[f64]) -> bool {
    sample.windows(2).all(|w| w[0] == w[1])
}

fn resample_distribution<S>(samples: &[&[f64]], statistic: &S, config: &BootstrapConfig) -> Vec<f64>
where
    S: Fn(&[&[f64]]) -> f64 + Sync,
{
    let one = |i: usize| {
        let mut rng = rng_for(config.seed, i as u64);
        let resampled: Vec<Vec<f64>> = samples
            .iter()
            .map(|s| (0..s.len()).map(|_| s[rng.gen_range(0..s.len())]).collect())
            .collect();
        let views: Vec<&[f64]> = resampled.iter().map(Vec::as_slice).collect();
        statistic(&views)
    };

    if config.parallel {
        (0..config.resamples).into_par_iter().map(one).collect()
    } else {
        (0..config.resamples).map(one).collect()
    }
}

/// Acceleration factor from leave-one-out influence values, pooled across samples
fn acceleration<S>(samples: &[&[f64]], statistic: &S) -> f64
where
    S: Fn(&[&[f64]]) -> f64,
{
    let mut num = 0.0;
    let mut den = 0.0;

    for (j, sample) in samples.iter().enumerate() {
        let n = sample.len();
        if n < 2 {
            continue;
        }
        let jackknife: Vec<f64> = (0..n)
            .map(|i| {
                let left_out: Vec<f64> = sample
                    .iter()
                    .enumerate()
                    .filter(|(k, _)| *k != i)
                    .map(|(_, &v)| v)
                    .collect();
                let mut views: Vec<&[f64]> = samples.to_vec();
                views[j] = &left_out;
                statistic(&views)
            })
            .collect();

        let jack_mean = jackknife.iter().sum::<f64>() / n as f64;
        let nf = n as f64;
        let scale = nf - 1.0;
        num += jackknife
            .iter()
            .map(|x| (scale * (jack_mean - x)).powi(3))
            .sum::<f64>()
            / nf.powi(3);
        den += jackknife
            .iter()
            .map(|x| (scale * (jack_mean - x)).powi(2))
            .sum::<f64>()
            / nf.powi(2);
    }

    if den.abs() < 1e-300 || !num.is_finite() {
        0.0
    } else {
        num / (6.0 * den.powf(1.5))
    }
}
