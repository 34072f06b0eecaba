//! Ordinary least squares for one predictor

use crate::distributions::students_t_two_sided;
use crate::error::{StatsError, or_sentinel, require_finite, require_len};
use serde::Serialize;

const TEST: &str = "linear_regression";

/// Guards `1 ± r` against an exact zero in the t statistic
const TINY: f64 = 1e-20;

/// Fitted line `y = slope·x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionResult {
    /// Fitted slope
    pub slope: f64,
    /// Fitted intercept
    pub intercept: f64,
    /// Coefficient of determination
    pub r_squared: f64,
    /// Two-sided p-value for a zero slope
    pub p_value: f64,
    /// Standard error of the slope
    pub std_err: f64,
}

impl RegressionResult {
    /// Every field NaN
    pub const fn undefined() -> Self {
        Self {
            slope: f64::NAN,
            intercept: f64::NAN,
            r_squared: f64::NAN,
            p_value: f64::NAN,
            std_err: f64::NAN,
        }
    }

    /// Fitted value at `x`
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// OLS fit of `y` on `x`; failures yield [`RegressionResult::undefined`]
///
/// # Panics
///
/// Panics if `x` and `y` differ in length.
pub fn linear_regression(x: &[f64], y: &[f64]) -> RegressionResult {
    or_sentinel(try_linear_regression(x, y), RegressionResult::undefined())
}

/// Fallible OLS fit
///
/// A constant `x` is a numerical failure. With exactly two points the fit is
/// exact: the standard error is zero and the p-value is 0, or 1 when `y` is
/// constant.
pub fn try_linear_regression(x: &[f64], y: &[f64]) -> Result<RegressionResult, StatsError> {
    assert_eq!(x.len(), y.len(), "{TEST}: x and y must have equal length");
    require_len(TEST, x.len(), 2)?;
    require_finite(TEST, x)?;
    require_finite(TEST, y)?;

    let n = x.len() as f64;
    let x_mean = x.iter().sum::<f64>() / n;
    let y_mean = y.iter().sum::<f64>() / n;

    let (mut ssxm, mut ssym, mut ssxym) = (0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        ssxm += dx * dx;
        ssym += dy * dy;
        ssxym += dx * dy;
    }
    if ssxm == 0.0 {
        return Err(StatsError::numerical(TEST, "all x values are identical"));
    }

    let r = if ssym == 0.0 {
        0.0
    } else {
        (ssxym / (ssxm * ssym).sqrt()).clamp(-1.0, 1.0)
    };
    let slope = ssxym / ssxm;
    let intercept = y_mean - slope * x_mean;

    let (p_value, std_err) = if x.len() == 2 {
        let p = if y[0] == y[1] { 1.0 } else { 0.0 };
        (p, 0.0)
    } else {
        let df = n - 2.0;
        let t = r * (df / ((1.0 - r + TINY) * (1.0 + r + TINY))).sqrt();
        let p = students_t_two_sided(t, df, TEST)?;
        let se = ((1.0 - r * r) * ssym / ssxm / df).max(0.0).sqrt();
        (p, se)
    };

    Ok(RegressionResult {
        slope,
        intercept,
        r_squared: r * r,
        p_value,
        std_err,
    })
}
