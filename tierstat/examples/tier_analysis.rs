//! Tier Analysis Example
//!
//! Walks through a small three-tier, two-model evaluation: pairwise tier
//! comparisons with Holm correction, an omnibus test, the model × tier rank
//! ANOVA and the cost metrics.
//!
//! Run with:
//!   cargo run --example tier_analysis

use std::collections::BTreeMap;
use tierstat::prelude::*;
use tierstat::stats::{frontier_cop, pareto_efficiency};

fn main() -> anyhow::Result<()> {
    let config = AnalysisConfig::discover().unwrap_or_default();
    config.validate()?;
    let session = AnalysisSession::new(config);

    // Scores per (model, tier), ten runs each
    let mut scores: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    scores.insert(
        "opus/T0".into(),
        vec![0.42, 0.55, 0.38, 0.61, 0.47, 0.50, 0.33, 0.58, 0.44, 0.49],
    );
    scores.insert(
        "opus/T1".into(),
        vec![0.62, 0.71, 0.58, 0.77, 0.66, 0.69, 0.54, 0.73, 0.61, 0.68],
    );
    scores.insert(
        "opus/T2".into(),
        vec![0.81, 0.88, 0.75, 0.92, 0.79, 0.85, 0.72, 0.90, 0.83, 0.86],
    );
    scores.insert(
        "haiku/T0".into(),
        vec![0.31, 0.40, 0.27, 0.45, 0.36, 0.38, 0.22, 0.43, 0.34, 0.37],
    );
    scores.insert(
        "haiku/T1".into(),
        vec![0.35, 0.44, 0.30, 0.49, 0.39, 0.42, 0.26, 0.47, 0.37, 0.41],
    );
    scores.insert(
        "haiku/T2".into(),
        vec![0.37, 0.47, 0.33, 0.51, 0.41, 0.45, 0.29, 0.49, 0.40, 0.43],
    );

    let level = 100.0 * session.config().bootstrap.confidence_level;
    println!("== Group means (BCa {level:.0}% CI) ==");
    for (group, result) in session.bootstrap_groups(&scores) {
        let (mean, lo, hi) = result.as_tuple();
        println!("{group:<10} {mean:.3}  [{lo:.3}, {hi:.3}]");
    }

    println!("\n== opus: tier transitions ({}) ==", session.config().correction);
    let pairs = [
        (&scores["opus/T0"][..], &scores["opus/T1"][..]),
        (&scores["opus/T1"][..], &scores["opus/T2"][..]),
        (&scores["opus/T0"][..], &scores["opus/T2"][..]),
    ];
    let labels = ["T0 -> T1", "T1 -> T2", "T0 -> T2"];
    for (label, cmp) in labels.iter().zip(session.compare_family(&pairs)) {
        println!(
            "{label}: U={:.1} p={:.4} p_adj={:.4} delta={:+.3} ({}) power={:.2}{}",
            cmp.u_statistic,
            cmp.p_value,
            cmp.corrected_p_value,
            cmp.effect.delta,
            cmp.magnitude,
            cmp.power,
            if cmp.significant { " *" } else { "" },
        );
    }

    println!("\n== opus: omnibus ==");
    let opus: Vec<&Vec<f64>> = ["opus/T0", "opus/T1", "opus/T2"]
        .iter()
        .map(|k| &scores[*k])
        .collect();
    let omnibus = session.omnibus(&opus);
    println!(
        "H={:.3} p={:.5} epsilon^2={:.3} power={:.2}",
        omnibus.test.statistic, omnibus.test.p_value, omnibus.epsilon_squared, omnibus.power
    );

    println!("\n== model x tier (Scheirer-Ray-Hare) ==");
    let records: Vec<FactorialObservation> = scores
        .iter()
        .flat_map(|(group, values)| {
            let (model, tier) = group.split_once('/').unwrap_or((group.as_str(), ""));
            values
                .iter()
                .map(move |&v| FactorialObservation::new(v, model, tier))
        })
        .collect();
    let srh = session.scheirer_ray_hare(&records, "model", "tier");
    for (term, result) in &srh.terms {
        println!(
            "{term:<12} H={:.3} df={} p={:.5}",
            result.h_statistic, result.df, result.p_value
        );
    }

    println!("\n== cost ==");
    let configurations = [
        ("opus/T0", 0.40, 0.45),
        ("opus/T2", 1.10, 0.85),
        ("haiku/T0", 0.05, 0.35),
        ("haiku/T2", 0.30, 0.41),
    ];
    let cops: Vec<f64> = configurations
        .iter()
        .map(|&(_, cost, pass_rate)| tierstat::stats::cost_of_pass(cost, pass_rate))
        .collect();
    let points: Vec<ParetoPoint> = configurations
        .iter()
        .map(|&(_, cost, pass_rate)| ParetoPoint::new(cost, pass_rate))
        .collect();
    for ((name, _, _), (cop, efficient)) in configurations
        .iter()
        .zip(cops.iter().zip(pareto_efficiency(&points)))
    {
        println!(
            "{name:<10} CoP={cop:.3}{}",
            if efficient { "  (pareto)" } else { "" }
        );
    }
    println!("frontier CoP = {:.3}", frontier_cop(&cops));

    Ok(())
}
