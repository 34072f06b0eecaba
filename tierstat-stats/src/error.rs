//! Error contract shared by every engine operation
//!
//! Each operation exists in two forms: a `try_*` function returning
//! `Result<_, StatsError>`, and a sentinel form that never fails. The sentinel
//! form routes its error through [`or_sentinel`], which logs degenerate input
//! as a warning and numerical failures as errors before substituting the
//! documented sentinel value.

use thiserror::Error;
use tracing::{error, warn};

/// Errors that can occur during statistical analysis
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    /// A sample is smaller than the configured minimum
    #[error("{test}: not enough samples: got {got}, need at least {min}")]
    InsufficientData {
        /// Operation that rejected the input
        test: &'static str,
        /// Observed size
        got: usize,
        /// Required size
        min: usize,
    },

    /// The input is well-formed but the statistic is undefined for it
    #[error("{test}: degenerate input: {reason}")]
    Degenerate {
        /// Operation that rejected the input
        test: &'static str,
        /// Why the statistic is undefined
        reason: String,
    },

    /// An underlying numerical routine failed
    #[error("{test}: numerical failure: {reason}")]
    Numerical {
        /// Operation that failed
        test: &'static str,
        /// Description of the failure
        reason: String,
    },

    /// A parameter is outside its valid domain
    #[error("{test}: invalid parameter: {reason}")]
    InvalidParameter {
        /// Operation that rejected the parameter
        test: &'static str,
        /// Which parameter and why
        reason: String,
    },
}

impl StatsError {
    /// Whether this error stems from the input rather than from a failing routine
    pub fn is_degenerate_input(&self) -> bool {
        !matches!(self, StatsError::Numerical { .. })
    }

    /// Emit this error through `tracing` at the level matching its class
    pub fn log(&self) {
        if self.is_degenerate_input() {
            warn!("{self}");
        } else {
            error!("{self}");
        }
    }

    pub(crate) fn numerical(test: &'static str, reason: impl ToString) -> Self {
        StatsError::Numerical {
            test,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn degenerate(test: &'static str, reason: impl Into<String>) -> Self {
        StatsError::Degenerate {
            test,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(test: &'static str, reason: impl Into<String>) -> Self {
        StatsError::InvalidParameter {
            test,
            reason: reason.into(),
        }
    }
}

/// Unwrap `result`, logging the error and returning `sentinel` on failure
pub fn or_sentinel<T>(result: Result<T, StatsError>, sentinel: T) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            err.log();
            sentinel
        }
    }
}

/// Fail with [`StatsError::InsufficientData`] if `got < min`
pub(crate) fn require_len(test: &'static str, got: usize, min: usize) -> Result<(), StatsError> {
    if got < min {
        Err(StatsError::InsufficientData { test, got, min })
    } else {
        Ok(())
    }
}

/// Fail with [`StatsError::Numerical`] if any value is NaN or infinite
pub(crate) fn require_finite(test: &'static str, values: &[f64]) -> Result<(), StatsError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(idx) => Err(StatsError::numerical(
            test,
            format!("non-finite value {} at index {idx}", values[idx]),
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_sentinel_passthrough() {
        assert_eq!(or_sentinel(Ok(3.0), f64::NAN), 3.0);
    }

    #[test]
    fn test_or_sentinel_substitutes() {
        let err = StatsError::InsufficientData {
            test: "demo",
            got: 1,
            min: 2,
        };
        assert_eq!(or_sentinel(Err(err), (0.0, 1.0)), (0.0, 1.0));
    }

    #[test]
    fn test_error_classes() {
        assert!(StatsError::degenerate("t", "constant").is_degenerate_input());
        assert!(StatsError::invalid("t", "alpha").is_degenerate_input());
        assert!(!StatsError::numerical("t", "overflow").is_degenerate_input());
    }

    #[test]
    fn test_require_helpers() {
        assert!(require_len("t", 1, 2).is_err());
        assert!(require_len("t", 2, 2).is_ok());
        assert!(require_finite("t", &[1.0, f64::NAN]).is_err());
        assert!(require_finite("t", &[1.0, 2.0]).is_ok());
    }

    #[test]
    fn test_display() {
        let err = StatsError::InsufficientData {
            test: "mann_whitney_u",
            got: 1,
            min: 2,
        };
        assert_eq!(
            err.to_string(),
            "mann_whitney_u: not enough samples: got 1, need at least 2"
        );
    }
}
