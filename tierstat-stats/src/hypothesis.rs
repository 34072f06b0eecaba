//! Hypothesis Tests
//!
//! Rank-based tests used to compare tiers without normality assumptions,
//! plus the Shapiro-Wilk normality check that justifies using them.
//!
//! Every test has a `try_*` form returning `Result<TestOutcome, StatsError>`
//! and a sentinel form:
//!
//! | test            | sentinel       |
//! |-----------------|----------------|
//! | Mann-Whitney U  | `(0.0, 1.0)`   |
//! | Kruskal-Wallis  | `(NaN, NaN)`   |
//! | Shapiro-Wilk    | `(NaN, NaN)`   |

use crate::distributions::{chi_squared_sf, normal_quantile, normal_sf};
use crate::error::{StatsError, or_sentinel, require_finite, require_len};
use crate::percentiles::sorted_copy;
use crate::ranks::Ranking;
use crate::{
    DEFAULT_MIN_KRUSKAL_WALLIS_SAMPLES, DEFAULT_MIN_MANN_WHITNEY_SAMPLES,
    DEFAULT_MIN_NORMALITY_SAMPLES,
};
use serde::Serialize;
use std::f64::consts::{FRAC_1_SQRT_2, PI};
use tracing::warn;

/// Largest smaller-group size for which the exact U distribution is used
pub const MANN_WHITNEY_EXACT_MAX: usize = 8;

/// Largest larger-group size for which the exact U distribution is used
pub const MANN_WHITNEY_EXACT_MAX_LARGER: usize = 64;

/// Whether a tie-free `n1` vs `n2` comparison uses the exact U distribution
///
/// The count table grows with `n1 · n2`, so both groups must be small.
pub(crate) fn uses_exact_u(n1: usize, n2: usize) -> bool {
    n1.min(n2) <= MANN_WHITNEY_EXACT_MAX && n1.max(n2) <= MANN_WHITNEY_EXACT_MAX_LARGER
}

/// Statistic and p-value of a test
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TestOutcome {
    /// Test statistic (U, H or W)
    pub statistic: f64,
    /// Two-sided p-value in [0, 1], or NaN when undefined
    pub p_value: f64,
}

impl TestOutcome {
    /// Outcome from a statistic and its p-value
    pub const fn new(statistic: f64, p_value: f64) -> Self {
        Self { statistic, p_value }
    }

    /// `(NaN, NaN)`, the sentinel of tests without a natural point estimate
    pub const fn undefined() -> Self {
        Self::new(f64::NAN, f64::NAN)
    }

    /// `(statistic, p_value)`
    pub fn as_tuple(&self) -> (f64, f64) {
        (self.statistic, self.p_value)
    }

    /// Whether the p-value is below `alpha`; false for an undefined p-value
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

// ---------------------------------------------------------------------------
// Mann-Whitney U
// ---------------------------------------------------------------------------

/// Two-sided Mann-Whitney U test with the default minimum group size
///
/// Returns `U` for `g1` and the two-sided p-value. Either group below two
/// observations, or a non-finite value, yields exactly `(0.0, 1.0)`.
///
/// # Examples
///
/// ```
/// # use tierstat_stats::mann_whitney_u;
/// let outcome = mann_whitney_u(&[1.0, 2.0, 3.0, 4.0, 5.0], &[6.0, 7.0, 8.0, 9.0, 10.0]);
/// assert!(outcome.p_value < 0.01);
/// ```
pub fn mann_whitney_u(g1: &[f64], g2: &[f64]) -> TestOutcome {
    or_sentinel(
        try_mann_whitney_u(g1, g2, DEFAULT_MIN_MANN_WHITNEY_SAMPLES),
        TestOutcome::new(0.0, 1.0),
    )
}

/// Fallible Mann-Whitney U test
///
/// The exact null distribution is used when there are no ties, the smaller
/// group has at most [`MANN_WHITNEY_EXACT_MAX`] observations and the larger
/// at most [`MANN_WHITNEY_EXACT_MAX_LARGER`]; otherwise the normal
/// approximation with tie and continuity corrections.
pub fn try_mann_whitney_u(
    g1: &[f64],
    g2: &[f64],
    min_samples: usize,
) -> Result<TestOutcome, StatsError> {
    mann_whitney_with(g1, g2, min_samples, None)
}

pub(crate) fn mann_whitney_with(
    g1: &[f64],
    g2: &[f64],
    min_samples: usize,
    exact: Option<&ExactUDistribution>,
) -> Result<TestOutcome, StatsError> {
    const TEST: &str = "mann_whitney_u";
    let min = min_samples.max(1);
    require_len(TEST, g1.len(), min)?;
    require_len(TEST, g2.len(), min)?;
    require_finite(TEST, g1)?;
    require_finite(TEST, g2)?;

    let n1 = g1.len();
    let n2 = g2.len();
    let pooled: Vec<f64> = g1.iter().chain(g2).copied().collect();
    let ranking = Ranking::of(&pooled);

    let r1: f64 = ranking.ranks[..n1].iter().sum();
    let n1f = n1 as f64;
    let n2f = n2 as f64;
    let u1 = r1 - n1f * (n1f + 1.0) / 2.0;
    let u2 = n1f * n2f - u1;

    if !ranking.has_ties() && uses_exact_u(n1, n2) {
        let owned;
        let dist = match exact {
            Some(d) if d.matches(n1, n2) => d,
            _ => {
                owned = ExactUDistribution::new(n1, n2);
                &owned
            }
        };
        return Ok(TestOutcome::new(u1, dist.two_sided_p(u1.min(u2))));
    }

    let n = n1f + n2f;
    let mu = n1f * n2f / 2.0;
    let sigma_sq = n1f * n2f / 12.0 * ((n + 1.0) - ranking.tie_term / (n * (n - 1.0)));
    if sigma_sq <= 0.0 {
        // every pooled value identical
        return Ok(TestOutcome::new(u1, 1.0));
    }

    let z = (u1.max(u2) - mu - 0.5) / sigma_sq.sqrt();
    let p_value = (2.0 * normal_sf(z)).clamp(0.0, 1.0);
    Ok(TestOutcome::new(u1, p_value))
}

/// Null distribution of U for two tie-free groups
///
/// Counts come from the Gaussian binomial coefficient `[m+n choose m]_q`,
/// built as `Π_{i=1..m} (1 - q^{n+i}) / (1 - q^i)` in a power series
/// truncated at degree `m·n`.
#[derive(Debug, Clone)]
pub(crate) struct ExactUDistribution {
    small: usize,
    large: usize,
    cdf: Vec<f64>,
}

impl ExactUDistribution {
    /// Table for groups of sizes `n1` and `n2`
    pub fn new(n1: usize, n2: usize) -> Self {
        let m = n1.min(n2);
        let n = n1.max(n2);
        let max_u = m * n;

        let mut counts = vec![0.0f64; max_u + 1];
        counts[0] = 1.0;
        for i in 1..=m {
            let shift = n + i;
            for k in (shift..=max_u).rev() {
                counts[k] -= counts[k - shift];
            }
            for k in i..=max_u {
                counts[k] += counts[k - i];
            }
        }

        let total: f64 = counts.iter().sum();
        let mut running = 0.0;
        let cdf = counts
            .iter()
            .map(|c| {
                running += c;
                (running / total).min(1.0)
            })
            .collect();

        Self {
            small: m,
            large: n,
            cdf,
        }
    }

    /// Whether the table was built for these group sizes
    pub fn matches(&self, n1: usize, n2: usize) -> bool {
        self.small == n1.min(n2) && self.large == n1.max(n2)
    }

    /// `P(U <= u)`
    pub fn cdf(&self, u: f64) -> f64 {
        if u < 0.0 {
            return 0.0;
        }
        let idx = (u.round() as usize).min(self.cdf.len() - 1);
        self.cdf[idx]
    }

    /// Two-sided p-value for the smaller of the two U statistics
    pub fn two_sided_p(&self, u_min: f64) -> f64 {
        (2.0 * self.cdf(u_min)).min(1.0)
    }
}

// ---------------------------------------------------------------------------
// Kruskal-Wallis H
// ---------------------------------------------------------------------------

/// Kruskal-Wallis H test with the default minimum group size
///
/// Any group below the minimum, fewer than two groups, or all values
/// identical yields `(NaN, NaN)`.
pub fn kruskal_wallis<G: AsRef<[f64]>>(groups: &[G]) -> TestOutcome {
    or_sentinel(
        try_kruskal_wallis(groups, DEFAULT_MIN_KRUSKAL_WALLIS_SAMPLES),
        TestOutcome::undefined(),
    )
}

/// Fallible Kruskal-Wallis H test (tie-corrected, χ² with k-1 df)
pub fn try_kruskal_wallis<G: AsRef<[f64]>>(
    groups: &[G],
    min_samples: usize,
) -> Result<TestOutcome, StatsError> {
    const TEST: &str = "kruskal_wallis";
    require_len(TEST, groups.len(), 2)?;
    for group in groups {
        require_len(TEST, group.as_ref().len(), min_samples.max(1))?;
        require_finite(TEST, group.as_ref())?;
    }

    let pooled: Vec<f64> = groups
        .iter()
        .flat_map(|g| g.as_ref().iter().copied())
        .collect();
    let ranking = Ranking::of(&pooled);
    let n = pooled.len() as f64;

    let mut offset = 0;
    let mut rank_term = 0.0;
    for group in groups {
        let len = group.as_ref().len();
        let rank_sum: f64 = ranking.ranks[offset..offset + len].iter().sum();
        rank_term += rank_sum * rank_sum / len as f64;
        offset += len;
    }

    let ties = 1.0 - ranking.tie_term / (n * n * n - n);
    if ties <= 0.0 {
        return Err(StatsError::degenerate(TEST, "all values are identical"));
    }

    let h = (12.0 / (n * (n + 1.0)) * rank_term - 3.0 * (n + 1.0)) / ties;
    let df = (groups.len() - 1) as f64;
    let p_value = chi_squared_sf(h, df, TEST)?;
    Ok(TestOutcome::new(h, p_value))
}

// ---------------------------------------------------------------------------
// Shapiro-Wilk W
// ---------------------------------------------------------------------------

/// Shapiro-Wilk normality test with the default minimum size
///
/// Fewer than three values, or a sample with zero range, yields `(NaN, NaN)`.
pub fn shapiro_wilk(sample: &[f64]) -> TestOutcome {
    or_sentinel(
        try_shapiro_wilk(sample, DEFAULT_MIN_NORMALITY_SAMPLES),
        TestOutcome::undefined(),
    )
}

/// Fallible Shapiro-Wilk test
///
/// Royston's approximation (AS R94) for n ≥ 4, the exact distribution of W
/// for n = 3. Accuracy of the p-value degrades above 5000 observations.
pub fn try_shapiro_wilk(sample: &[f64], min_samples: usize) -> Result<TestOutcome, StatsError> {
    const TEST: &str = "shapiro_wilk";
    let n = sample.len();
    require_len(TEST, n, min_samples.max(3))?;
    require_finite(TEST, sample)?;
    if n > 5000 {
        warn!("shapiro_wilk: n = {n} exceeds 5000, p-value may be inaccurate");
    }

    let x = sorted_copy(sample);
    if x[n - 1] - x[0] <= 0.0 {
        return Err(StatsError::degenerate(TEST, "sample has zero range"));
    }

    let mean = x.iter().sum::<f64>() / n as f64;
    let ss: f64 = x.iter().map(|v| (v - mean).powi(2)).sum();

    if n == 3 {
        let numerator = FRAC_1_SQRT_2 * (x[2] - x[0]);
        let w = (numerator * numerator / ss).clamp(0.75, 1.0);
        let p = 1.0 - (6.0 / PI) * w.sqrt().acos();
        return Ok(TestOutcome::new(w, p.clamp(0.0, 1.0)));
    }

    let a = sw_coefficients(n).ok_or_else(|| {
        StatsError::numerical(TEST, format!("coefficient normalization failed for n = {n}"))
    })?;

    let half = n / 2;
    let sa: f64 = (0..half).map(|i| a[i] * (x[n - 1 - i] - x[i])).sum();
    let w = (sa * sa / ss).min(1.0);

    Ok(TestOutcome::new(w, sw_p_value(w, n).clamp(0.0, 1.0)))
}

// Royston polynomial coefficients (AS R94)
const SW_C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const SW_C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const SW_C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const SW_C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const SW_C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const SW_C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const SW_G: [f64; 2] = [-2.273, 0.459];

/// `c[0] + c[1]·x + c[2]·x² + …`
fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &ci| acc * x + ci)
}

/// Coefficients `a_n, a_{n-1}, …` for the upper half of the order statistics
fn sw_coefficients(n: usize) -> Option<Vec<f64>> {
    let half = n / 2;
    let nf = n as f64;

    // Blom scores of the lower half (negative)
    let m: Vec<f64> = (0..half)
        .map(|i| normal_quantile((i as f64 + 1.0 - 0.375) / (nf + 0.25)))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / nf.sqrt();

    let a1 = poly(&SW_C1, rsn) - m[0] / ssumm2;
    let mut a = vec![0.0; half];
    a[0] = a1;

    let (corrected, fac_sq, one_minus) = if n <= 5 {
        (1, summ2 - 2.0 * m[0] * m[0], 1.0 - 2.0 * a1 * a1)
    } else {
        let a2 = -m[1] / ssumm2 + poly(&SW_C2, rsn);
        a[1] = a2;
        (
            2,
            summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1],
            1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2,
        )
    };
    if fac_sq <= 0.0 || one_minus <= 0.0 {
        return None;
    }
    let fac = (fac_sq / one_minus).sqrt();
    for i in corrected..half {
        a[i] = -m[i] / fac;
    }
    Some(a)
}

fn sw_p_value(w: f64, n: usize) -> f64 {
    let w1 = 1.0 - w;
    if w1 <= 0.0 {
        return 1.0;
    }
    let y = w1.ln();
    let nf = n as f64;

    if n <= 11 {
        let gamma = poly(&SW_G, nf);
        if y >= gamma {
            return 0.0;
        }
        let y2 = -(gamma - y).ln();
        let m = poly(&SW_C3, nf);
        let s = poly(&SW_C4, nf).exp();
        normal_sf((y2 - m) / s)
    } else {
        let ln_n = nf.ln();
        let m = poly(&SW_C5, ln_n);
        let s = poly(&SW_C6, ln_n).exp();
        normal_sf((y - m) / s)
    }
}
