//! Average ranking with tie bookkeeping, shared by the rank-based tests

use std::cmp::Ordering;

/// Ranks of a pooled sample
#[derive(Debug, Clone)]
pub(crate) struct Ranking {
    /// 1-based ranks in input order; ties receive the mean of their positions
    pub ranks: Vec<f64>,
    /// Σ (t³ - t) over tie groups of size t
    pub tie_term: f64,
}

impl Ranking {
    /// Rank `values` (ties averaged)
    pub fn of(values: &[f64]) -> Self {
        let n = values.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            values[a]
                .partial_cmp(&values[b])
                .unwrap_or(Ordering::Equal)
        });

        let mut ranks = vec![0.0; n];
        let mut tie_term = 0.0;
        let mut i = 0;
        while i < n {
            let mut j = i + 1;
            while j < n && values[order[j]] == values[order[i]] {
                j += 1;
            }
            // Positions i..j are tied; average rank = (i+1 + j) / 2
            let avg_rank = (i + 1 + j) as f64 / 2.0;
            for &idx in &order[i..j] {
                ranks[idx] = avg_rank;
            }
            let t = (j - i) as f64;
            tie_term += t * t * t - t;
            i = j;
        }

        Self { ranks, tie_term }
    }

    /// Whether any value occurs more than once
    pub fn has_ties(&self) -> bool {
        self.tie_term > 0.0
    }
}

/// Ranks of `values` with ties averaged
pub fn rank_average(values: &[f64]) -> Vec<f64> {
    Ranking::of(values).ranks
}
