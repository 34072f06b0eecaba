//! Correlation Tests
//!
//! Pearson's r and Spearman's rho with two-sided p-values from Student's t on
//! n-2 degrees of freedom. Samples below the minimum size or with a constant
//! variable yield `(NaN, NaN)`. Mismatched lengths panic.

use crate::DEFAULT_MIN_CORRELATION_SAMPLES;
use crate::distributions::students_t_two_sided;
use crate::error::{StatsError, or_sentinel, require_finite, require_len};
use crate::hypothesis::TestOutcome;
use crate::ranks::rank_average;

/// Pearson correlation with the default minimum size
pub fn pearson(x: &[f64], y: &[f64]) -> TestOutcome {
    or_sentinel(
        try_pearson(x, y, DEFAULT_MIN_CORRELATION_SAMPLES),
        TestOutcome::undefined(),
    )
}

/// Fallible Pearson correlation; `statistic` is r
pub fn try_pearson(x: &[f64], y: &[f64], min_samples: usize) -> Result<TestOutcome, StatsError> {
    correlate("pearson", x, y, min_samples)
}

/// Spearman rank correlation with the default minimum size
pub fn spearman(x: &[f64], y: &[f64]) -> TestOutcome {
    or_sentinel(
        try_spearman(x, y, DEFAULT_MIN_CORRELATION_SAMPLES),
        TestOutcome::undefined(),
    )
}

/// Fallible Spearman correlation; `statistic` is rho
pub fn try_spearman(x: &[f64], y: &[f64], min_samples: usize) -> Result<TestOutcome, StatsError> {
    assert_eq!(x.len(), y.len(), "spearman: x and y must have equal length");
    require_finite("spearman", x)?;
    require_finite("spearman", y)?;
    correlate("spearman", &rank_average(x), &rank_average(y), min_samples)
}

fn correlate(
    test: &'static str,
    x: &[f64],
    y: &[f64],
    min_samples: usize,
) -> Result<TestOutcome, StatsError> {
    assert_eq!(x.len(), y.len(), "{test}: x and y must have equal length");
    let n = x.len();
    require_len(test, n, min_samples.max(2))?;
    require_finite(test, x)?;
    require_finite(test, y)?;

    let nf = n as f64;
    let mean_x = x.iter().sum::<f64>() / nf;
    let mean_y = y.iter().sum::<f64>() / nf;
    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return Err(StatsError::degenerate(test, "input is constant"));
    }

    let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
    let df = nf - 2.0;
    if df <= 0.0 {
        return Ok(TestOutcome::new(r, 1.0));
    }
    let t = r * (df / ((1.0 - r) * (1.0 + r))).sqrt();
    let p_value = students_t_two_sided(t, df, test)?;
    Ok(TestOutcome::new(r, p_value))
}
