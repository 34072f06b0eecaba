//! Scheirer-Ray-Hare Test
//!
//! Two-way non-parametric ANOVA on ranks. Every value is ranked across the
//! whole dataset (ties averaged), sums of squares of mean ranks are formed for
//! each factor and for every (A, B) cell, and the interaction sum of squares
//! is what remains of the cell sum after removing both main effects:
//!
//! ```text
//! SS_interaction = SS_cells - SS_A - SS_B
//! H_x            = SS_x / MS_total        MS_total = Σ (r - r̄)² / N
//! ```
//!
//! Each H is referred to χ² with `|A|-1`, `|B|-1` and `(|A|-1)(|B|-1)` degrees
//! of freedom.

use crate::distributions::chi_squared_sf;
use crate::error::{StatsError, or_sentinel, require_len};
use crate::ranks::rank_average;
use fxhash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::hash::Hash;

const TEST: &str = "scheirer_ray_hare";

/// Key of the interaction term in [`ScheirerRayHareResult::terms`]
pub const INTERACTION: &str = "interaction";

/// One observation of a two-factor design
#[derive(Debug, Clone, PartialEq)]
pub struct FactorialObservation {
    /// Observed score
    pub value: f64,
    /// Level of the first factor (e.g. the model)
    pub level_a: String,
    /// Level of the second factor (e.g. the tier)
    pub level_b: String,
}

impl FactorialObservation {
    /// Observation of `value` in cell `(level_a, level_b)`
    pub fn new(value: f64, level_a: impl Into<String>, level_b: impl Into<String>) -> Self {
        Self {
            value,
            level_a: level_a.into(),
            level_b: level_b.into(),
        }
    }
}

/// H statistic, degrees of freedom and p-value of one effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankAnovaTerm {
    /// `SS / MS_total`
    pub h_statistic: f64,
    /// Degrees of freedom of the χ² reference
    pub df: usize,
    /// Upper-tail χ² p-value; NaN when `df` is zero
    pub p_value: f64,
}

/// Terms keyed by factor A's name, factor B's name and [`INTERACTION`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheirerRayHareResult {
    /// Name of the first factor
    pub factor_a: String,
    /// Name of the second factor
    pub factor_b: String,
    /// Term per effect
    pub terms: BTreeMap<String, RankAnovaTerm>,
}

impl ScheirerRayHareResult {
    fn from_terms(
        factor_a: &str,
        factor_b: &str,
        a: RankAnovaTerm,
        b: RankAnovaTerm,
        interaction: RankAnovaTerm,
    ) -> Self {
        let mut terms = BTreeMap::new();
        terms.insert(factor_a.to_string(), a);
        terms.insert(factor_b.to_string(), b);
        terms.insert(INTERACTION.to_string(), interaction);
        Self {
            factor_a: factor_a.to_string(),
            factor_b: factor_b.to_string(),
            terms,
        }
    }

    /// Term by key
    pub fn get(&self, name: &str) -> Option<&RankAnovaTerm> {
        self.terms.get(name)
    }

    /// Term of the first factor
    pub fn main_effect_a(&self) -> &RankAnovaTerm {
        &self.terms[&self.factor_a]
    }

    /// Term of the second factor
    pub fn main_effect_b(&self) -> &RankAnovaTerm {
        &self.terms[&self.factor_b]
    }

    /// A × B interaction term
    pub fn interaction(&self) -> &RankAnovaTerm {
        &self.terms[INTERACTION]
    }
}

/// Scheirer-Ray-Hare test; failures yield NaN statistics and p-values
///
/// Degrees of freedom are still reported from the observed levels.
pub fn scheirer_ray_hare(
    records: &[FactorialObservation],
    factor_a: &str,
    factor_b: &str,
) -> ScheirerRayHareResult {
    let (df_a, df_b) = degrees_of_freedom(records);
    let undefined = |df| RankAnovaTerm {
        h_statistic: f64::NAN,
        df,
        p_value: f64::NAN,
    };
    or_sentinel(
        try_scheirer_ray_hare(records, factor_a, factor_b),
        ScheirerRayHareResult::from_terms(
            factor_a,
            factor_b,
            undefined(df_a),
            undefined(df_b),
            undefined(df_a * df_b),
        ),
    )
}

/// Fallible Scheirer-Ray-Hare test
///
/// A term with zero degrees of freedom (a single level) has a NaN p-value.
pub fn try_scheirer_ray_hare(
    records: &[FactorialObservation],
    factor_a: &str,
    factor_b: &str,
) -> Result<ScheirerRayHareResult, StatsError> {
    require_len(TEST, records.len(), 2)?;
    if let Some(bad) = records.iter().find(|r| !r.value.is_finite()) {
        return Err(StatsError::numerical(
            TEST,
            format!("non-finite value {}", bad.value),
        ));
    }

    let values: Vec<f64> = records.iter().map(|r| r.value).collect();
    let ranks = rank_average(&values);
    let n = ranks.len() as f64;
    let grand_mean = ranks.iter().sum::<f64>() / n;

    let ss_total: f64 = ranks.iter().map(|r| (r - grand_mean).powi(2)).sum();
    let ms_total = ss_total / n;
    if ms_total <= 0.0 {
        return Err(StatsError::degenerate(TEST, "all values are identical"));
    }

    let ss_a = between_sum_of_squares(records, &ranks, grand_mean, |r| r.level_a.as_str());
    let ss_b = between_sum_of_squares(records, &ranks, grand_mean, |r| r.level_b.as_str());
    let ss_cells = between_sum_of_squares(records, &ranks, grand_mean, |r| {
        (r.level_a.as_str(), r.level_b.as_str())
    });
    let ss_interaction = ss_cells - ss_a - ss_b;

    let (df_a, df_b) = degrees_of_freedom(records);
    let term = |ss: f64, df: usize| -> Result<RankAnovaTerm, StatsError> {
        let h = ss / ms_total;
        let p_value = if df == 0 {
            f64::NAN
        } else {
            chi_squared_sf(h, df as f64, TEST)?
        };
        Ok(RankAnovaTerm {
            h_statistic: h,
            df,
            p_value,
        })
    };

    Ok(ScheirerRayHareResult::from_terms(
        factor_a,
        factor_b,
        term(ss_a, df_a)?,
        term(ss_b, df_b)?,
        term(ss_interaction, df_a * df_b)?,
    ))
}

/// Σ over groups of `n_group · (mean_rank_group - grand_mean)²`
fn between_sum_of_squares<'a, K, F>(
    records: &'a [FactorialObservation],
    ranks: &[f64],
    grand_mean: f64,
    key: F,
) -> f64
where
    K: Eq + Hash,
    F: Fn(&'a FactorialObservation) -> K,
{
    let mut groups: FxHashMap<K, (usize, f64)> = FxHashMap::default();
    for (record, rank) in records.iter().zip(ranks) {
        let entry = groups.entry(key(record)).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += rank;
    }
    groups
        .values()
        .map(|&(count, rank_sum)| {
            let mean_rank = rank_sum / count as f64;
            count as f64 * (mean_rank - grand_mean).powi(2)
        })
        .sum()
}

fn degrees_of_freedom(records: &[FactorialObservation]) -> (usize, usize) {
    let mut levels_a: Vec<&str> = records.iter().map(|r| r.level_a.as_str()).collect();
    let mut levels_b: Vec<&str> = records.iter().map(|r| r.level_b.as_str()).collect();
    levels_a.sort_unstable();
    levels_a.dedup();
    levels_b.sort_unstable();
    levels_b.dedup();
    (
        levels_a.len().saturating_sub(1),
        levels_b.len().saturating_sub(1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2×2 crossover: (a1,b1)=0.9, (a2,b1)=0.1, (a1,b2)=0.1, (a2,b2)=0.9
    fn crossover(replicates: usize) -> Vec<FactorialObservation> {
        let mut records = Vec::new();
        for _ in 0..replicates {
            records.push(FactorialObservation::new(0.9, "a1", "b1"));
            records.push(FactorialObservation::new(0.1, "a2", "b1"));
            records.push(FactorialObservation::new(0.1, "a1", "b2"));
            records.push(FactorialObservation::new(0.9, "a2", "b2"));
        }
        records
    }

    #[test]
    fn test_crossover_interaction() {
        let result = scheirer_ray_hare(&crossover(3), "model", "tier");

        let interaction = result.interaction();
        // every cell sits at an extreme rank: H_interaction = N
        assert!((interaction.h_statistic - 12.0).abs() < 1e-9);
        assert_eq!(interaction.df, 1);
        assert!(interaction.p_value < 0.05);

        for name in ["model", "tier"] {
            let main = result.get(name).unwrap();
            assert!(main.h_statistic.abs() < 1e-9);
            assert!(main.p_value > 0.5);
        }
    }

    #[test]
    fn test_unreplicated_crossover_interaction() {
        let records = vec![
            FactorialObservation::new(0.9, "a1", "b1"),
            FactorialObservation::new(0.1, "a2", "b1"),
            FactorialObservation::new(0.1, "a1", "b2"),
            FactorialObservation::new(0.9, "a2", "b2"),
        ];
        let result = scheirer_ray_hare(&records, "model", "tier");

        // ranks 3.5, 1.5, 1.5, 3.5: SS_cells = 4, MS_total = 1
        let interaction = result.interaction();
        assert!((interaction.h_statistic - 4.0).abs() < 1e-9);
        assert!((interaction.p_value - 0.0455).abs() < 1e-4);
        assert!(interaction.p_value < 0.05);

        for main in [result.main_effect_a(), result.main_effect_b()] {
            assert_eq!(main.h_statistic, 0.0);
            assert!(main.p_value > 0.99);
        }
    }

    #[test]
    fn test_main_effect_only() {
        let mut records = Vec::new();
        for (value, a, b) in [
            (0.80, "strong", "t0"),
            (0.85, "strong", "t1"),
            (0.90, "strong", "t0"),
            (0.95, "strong", "t1"),
            (0.10, "weak", "t0"),
            (0.15, "weak", "t1"),
            (0.20, "weak", "t0"),
            (0.25, "weak", "t1"),
        ] {
            records.push(FactorialObservation::new(value, a, b));
        }
        let result = scheirer_ray_hare(&records, "model", "tier");
        // ranks 5..8 vs 1..4: SS_A = 32, MS_total = 42 / 8
        assert!((result.main_effect_a().h_statistic - 32.0 / 5.25).abs() < 1e-9);
        assert!(result.main_effect_a().p_value < 0.05);
        assert!(result.main_effect_b().h_statistic < result.main_effect_a().h_statistic);
        assert!(result.interaction().h_statistic >= -1e-9);
    }

    #[test]
    fn test_terms_are_keyed_by_factor_names() {
        let result = scheirer_ray_hare(&crossover(2), "model", "tier");
        let keys: Vec<&str> = result.terms.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["interaction", "model", "tier"]);
    }

    #[test]
    fn test_single_level_has_undefined_p() {
        let records = vec![
            FactorialObservation::new(0.1, "only", "b1"),
            FactorialObservation::new(0.5, "only", "b2"),
            FactorialObservation::new(0.3, "only", "b1"),
            FactorialObservation::new(0.9, "only", "b2"),
        ];
        let result = scheirer_ray_hare(&records, "model", "tier");
        assert_eq!(result.main_effect_a().df, 0);
        assert!(result.main_effect_a().p_value.is_nan());
        assert_eq!(result.interaction().df, 0);
        assert_eq!(result.main_effect_b().df, 1);
        assert!(result.main_effect_b().p_value.is_finite());
    }

    #[test]
    fn test_constant_values_are_undefined() {
        let records = vec![
            FactorialObservation::new(1.0, "a1", "b1"),
            FactorialObservation::new(1.0, "a2", "b2"),
        ];
        let result = scheirer_ray_hare(&records, "model", "tier");
        assert!(result.interaction().h_statistic.is_nan());
        assert_eq!(result.main_effect_a().df, 1);
        assert!(matches!(
            try_scheirer_ray_hare(&records, "model", "tier"),
            Err(StatsError::Degenerate { .. })
        ));
    }

    #[test]
    fn test_empty_records() {
        let result = scheirer_ray_hare(&[], "model", "tier");
        assert!(result.main_effect_a().p_value.is_nan());
        assert_eq!(result.main_effect_a().df, 0);
    }
}
