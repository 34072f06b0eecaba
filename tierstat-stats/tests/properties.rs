//! Property-based tests for the statistical engine
//!
//! Invariants every analysis relies on:
//! 1. Cliff's delta is antisymmetric and zero against itself
//! 2. Bootstrap intervals bracket the point estimate
//! 3. Corrected p-values stay in [0, 1]; Holm is monotone in raw order
//! 4. Rank tests return valid p-values and honor their sentinels
//! 5. Derived metrics stay in range and the Pareto frontier is non-dominated

use proptest::prelude::*;
use tierstat_stats::{
    BootstrapConfig, ParetoPoint, benjamini_hochberg_correction, bonferroni_correction,
    cliffs_delta, compute_bootstrap, consistency, frontier_cop, holm_bonferroni_correction,
    kruskal_wallis, mann_whitney_u, pareto_efficiency, pareto_frontier,
};

fn scores(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..1.0, 2..max_len)
}

fn small_bootstrap() -> BootstrapConfig {
    BootstrapConfig {
        resamples: 200,
        parallel: false,
        ..Default::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_cliffs_delta_antisymmetric(a in scores(20), b in scores(20)) {
        let forward = cliffs_delta(&a, &b);
        let backward = cliffs_delta(&b, &a);
        prop_assert_eq!(forward, -backward);
        prop_assert!((-1.0..=1.0).contains(&forward));
        prop_assert_eq!(cliffs_delta(&a, &a), 0.0);
    }

    #[test]
    fn prop_corrections_stay_in_unit_interval(p in prop::collection::vec(0.0f64..=1.0, 0..30)) {
        for corrected in [
            bonferroni_correction(&p),
            holm_bonferroni_correction(&p),
            benjamini_hochberg_correction(&p),
        ] {
            prop_assert_eq!(corrected.len(), p.len());
            for (raw, adj) in p.iter().zip(&corrected) {
                prop_assert!((0.0..=1.0).contains(adj));
                prop_assert!(adj >= raw);
            }
        }
    }

    #[test]
    fn prop_holm_monotone_in_raw_order(p in prop::collection::vec(0.0f64..=1.0, 1..30)) {
        let corrected = holm_bonferroni_correction(&p);
        let mut order: Vec<usize> = (0..p.len()).collect();
        order.sort_by(|&i, &j| p[i].total_cmp(&p[j]));
        for pair in order.windows(2) {
            prop_assert!(corrected[pair[0]] <= corrected[pair[1]]);
        }
    }

    #[test]
    fn prop_mann_whitney_valid(a in scores(15), b in scores(15)) {
        let forward = mann_whitney_u(&a, &b);
        let backward = mann_whitney_u(&b, &a);
        prop_assert!((0.0..=1.0).contains(&forward.p_value));
        let total = (a.len() * b.len()) as f64;
        prop_assert!((forward.statistic + backward.statistic - total).abs() < 1e-9);
        prop_assert!((forward.p_value - backward.p_value).abs() < 1e-12);
    }

    #[test]
    fn prop_mann_whitney_sentinel(a in prop::collection::vec(0.0f64..1.0, 0..2), b in scores(10)) {
        prop_assert_eq!(mann_whitney_u(&a, &b).as_tuple(), (0.0, 1.0));
        prop_assert_eq!(mann_whitney_u(&b, &a).as_tuple(), (0.0, 1.0));
    }

    #[test]
    fn prop_kruskal_wallis_p_in_range(groups in prop::collection::vec(scores(8), 2..5)) {
        let outcome = kruskal_wallis(&groups);
        prop_assert!(outcome.p_value.is_nan() || (0.0..=1.0).contains(&outcome.p_value));
    }

    #[test]
    fn prop_consistency_in_unit_interval(mean in -10.0f64..10.0, std in 0.0f64..10.0) {
        let c = consistency(mean, std);
        prop_assert!((0.0..=1.0).contains(&c));
    }

    #[test]
    fn prop_frontier_cop_is_minimum(values in prop::collection::vec(0.0f64..100.0, 1..20)) {
        let best = frontier_cop(&values);
        prop_assert!(values.iter().all(|&v| best <= v));
        prop_assert!(values.contains(&best));
    }

    #[test]
    fn prop_pareto_frontier_non_dominated(
        raw in prop::collection::vec((0u8..5, 0u8..5), 1..20),
    ) {
        // coarse grid so exact ties are common
        let points: Vec<ParetoPoint> = raw
            .iter()
            .map(|&(c, s)| ParetoPoint::new(f64::from(c), f64::from(s) / 4.0))
            .collect();
        let mask = pareto_efficiency(&points);
        prop_assert!(mask.iter().any(|&efficient| efficient));

        let frontier = pareto_frontier(&points);
        for p in &frontier {
            prop_assert!(!points.iter().any(|q| q.dominates(p)));
        }
        for (p, efficient) in points.iter().zip(&mask) {
            if !efficient {
                prop_assert!(frontier.iter().any(|q| q.dominates(p)));
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn prop_bootstrap_brackets_mean(sample in scores(15)) {
        let result = compute_bootstrap(&sample, &small_bootstrap());
        let (point, lower, upper) = result.as_tuple();
        prop_assert!(lower <= point, "{lower} > {point}");
        prop_assert!(upper >= point, "{upper} < {point}");
        prop_assert!(lower >= 0.0 && upper <= 1.0);
    }

    #[test]
    fn prop_bootstrap_constant_collapses(value in -5.0f64..5.0, n in 2usize..20) {
        let sample = vec![value; n];
        let (point, lower, upper) = compute_bootstrap(&sample, &small_bootstrap()).as_tuple();
        prop_assert!((point - value).abs() < 1e-12);
        prop_assert_eq!(lower, point);
        prop_assert_eq!(upper, point);
    }
}
