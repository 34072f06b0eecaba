//! Derived Metrics
//!
//! Cost and quality metrics computed from already-aggregated values.

use serde::{Deserialize, Serialize};

/// Expected spend per passing run: `mean_cost / pass_rate`
///
/// A pass rate of zero (or below) means no run ever passes: +∞.
pub fn cost_of_pass(mean_cost: f64, pass_rate: f64) -> f64 {
    if pass_rate > 0.0 {
        mean_cost / pass_rate
    } else {
        f64::INFINITY
    }
}

/// Best (minimum) finite Cost-of-Pass across configurations, or +∞
///
/// # Examples
///
/// ```
/// # use tierstat_stats::frontier_cop;
/// assert_eq!(frontier_cop(&[2.5, 1.75, 3.2]), 1.75);
/// assert_eq!(frontier_cop(&[f64::INFINITY]), f64::INFINITY);
/// ```
pub fn frontier_cop(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::INFINITY, f64::min)
}

/// A configuration in cost/score space; lower cost and higher score are better
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParetoPoint {
    /// Cost, minimized
    pub cost: f64,
    /// Score, maximized
    pub score: f64,
}

impl ParetoPoint {
    /// Point at `(cost, score)`
    pub const fn new(cost: f64, score: f64) -> Self {
        Self { cost, score }
    }

    /// Whether `self` dominates `other`: no worse on both axes, strictly
    /// better on at least one
    pub fn dominates(&self, other: &ParetoPoint) -> bool {
        self.cost <= other.cost
            && self.score >= other.score
            && (self.cost < other.cost || self.score > other.score)
    }
}

/// Efficiency mask aligned with `points`
///
/// A point is efficient when no *other* point dominates it. Identical points
/// cannot dominate each other, so duplicates on the frontier are all kept.
pub fn pareto_efficiency(points: &[ParetoPoint]) -> Vec<bool> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            !points
                .iter()
                .enumerate()
                .any(|(j, q)| i != j && q.dominates(p))
        })
        .collect()
}

/// The non-dominated points, in input order
pub fn pareto_frontier(points: &[ParetoPoint]) -> Vec<ParetoPoint> {
    points
        .iter()
        .zip(pareto_efficiency(points))
        .filter_map(|(p, efficient)| efficient.then_some(*p))
        .collect()
}

/// Fraction of rubric points achieved; NaN when there are no points to earn
pub fn implementation_rate(achieved: f64, max_points: f64) -> f64 {
    if max_points == 0.0 {
        f64::NAN
    } else {
        achieved / max_points
    }
}

/// `1 - std/mean` clamped to [0, 1]; a zero mean scores 0
///
/// # Examples
///
/// ```
/// # use tierstat_stats::consistency;
/// assert_eq!(consistency(10.0, 0.0), 1.0);
/// assert_eq!(consistency(10.0, 10.0), 0.0);
/// assert_eq!(consistency(0.0, 5.0), 0.0);
/// ```
pub fn consistency(mean: f64, std_dev: f64) -> f64 {
    if mean == 0.0 {
        return 0.0;
    }
    let value = 1.0 - std_dev / mean;
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
