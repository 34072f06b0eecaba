//! Reference distributions used to turn statistics into p-values

use crate::error::StatsError;
use statrs::distribution::{ChiSquared, ContinuousCDF, StudentsT};
use statrs::function::erf::{erfc, erfc_inv};
use std::f64::consts::SQRT_2;

/// Standard normal CDF
#[inline]
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Standard normal quantile (inverse CDF)
pub fn normal_quantile(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    -SQRT_2 * erfc_inv(2.0 * p)
}

/// Upper tail `P(X >= x)` of the standard normal
#[inline]
pub fn normal_sf(x: f64) -> f64 {
    0.5 * erfc(x / SQRT_2)
}

/// Upper tail of the chi-squared distribution with `df` degrees of freedom
pub fn chi_squared_sf(x: f64, df: f64, test: &'static str) -> Result<f64, StatsError> {
    if x.is_nan() {
        return Err(StatsError::numerical(test, "chi-squared statistic is NaN"));
    }
    if x <= 0.0 {
        return Ok(1.0);
    }
    let dist = ChiSquared::new(df).map_err(|e| StatsError::numerical(test, e))?;
    Ok(dist.sf(x).clamp(0.0, 1.0))
}

/// Two-sided p-value of a Student's t statistic with `df` degrees of freedom
pub fn students_t_two_sided(t: f64, df: f64, test: &'static str) -> Result<f64, StatsError> {
    if t.is_nan() {
        return Err(StatsError::numerical(test, "t statistic is NaN"));
    }
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| StatsError::numerical(test, e))?;
    Ok((2.0 * dist.sf(t.abs())).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_quantile() {
        assert!((normal_quantile(0.5) - 0.0).abs() < 1e-12);
        assert!((normal_quantile(0.975) - 1.959_963_985).abs() < 1e-6);
        assert!((normal_quantile(0.025) + 1.959_963_985).abs() < 1e-6);
        assert_eq!(normal_quantile(0.0), f64::NEG_INFINITY);
        assert_eq!(normal_quantile(1.0), f64::INFINITY);
    }

    #[test]
    fn test_normal_cdf() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-12);
        assert!((normal_cdf(1.96) - 0.975).abs() < 1e-3);
        assert!((normal_cdf(-1.96) - 0.025).abs() < 1e-3);
        assert!((normal_sf(1.96) - 0.025).abs() < 1e-3);
    }

    #[test]
    fn test_chi_squared_sf() {
        // 3.841 is the 95th percentile of chi2(1)
        let p = chi_squared_sf(3.841_458_8, 1.0, "t").unwrap();
        assert!((p - 0.05).abs() < 1e-5);
        assert_eq!(chi_squared_sf(0.0, 2.0, "t").unwrap(), 1.0);
        assert!(chi_squared_sf(1.0, 0.0, "t").is_err());
        assert!(chi_squared_sf(f64::NAN, 1.0, "t").is_err());
    }

    #[test]
    fn test_students_t_two_sided() {
        // t = 2.228 is the two-sided 5% critical value at 10 df
        let p = students_t_two_sided(2.228_138_9, 10.0, "t").unwrap();
        assert!((p - 0.05).abs() < 1e-4);
        let p0 = students_t_two_sided(0.0, 10.0, "t").unwrap();
        assert!((p0 - 1.0).abs() < 1e-12);
    }
}
