#![warn(missing_docs)]
//! # Tierstat
//!
//! Statistical evaluation for tiered LLM-agent benchmarks.
//!
//! Tierstat turns grouped per-run results into the numbers a benchmark report rests on:
//! - **Rank Tests**: Mann-Whitney U, Kruskal-Wallis H and the two-way Scheirer-Ray-Hare test
//! - **Multiplicity Control**: Bonferroni, Holm-Bonferroni and Benjamini-Hochberg
//! - **Effect Sizes**: Cliff's delta with BCa bootstrap confidence intervals
//! - **Power**: Monte-Carlo power for pairwise and omnibus tests
//! - **Cost and Quality**: Cost-of-Pass, Frontier CoP, Pareto frontier, Implementation Rate, Consistency
//! - **Reproducibility**: every resample and trial is seeded from `(seed, index)`
//!
//! ## Quick Start
//!
//! ```
//! use tierstat::prelude::*;
//!
//! let mut config = AnalysisConfig::default();
//! config.bootstrap.resamples = 1_000;
//! config.power.simulations = 200;
//! let session = AnalysisSession::new(config);
//!
//! let t0 = [0.2, 0.4, 0.3, 0.5, 0.1];
//! let t1 = [0.7, 0.9, 0.6, 0.8, 1.0];
//! let cmp = session.compare(&t0, &t1);
//! assert!(cmp.significant);
//! assert_eq!(cmp.magnitude, EffectMagnitude::Large);
//! ```
//!
//! ## Configuration
//!
//! Settings are read from `tierstat.toml` (see [`AnalysisConfig::default_toml`]):
//!
//! ```toml
//! alpha = 0.05
//! correction = "holm"
//!
//! [bootstrap]
//! resamples = 10000
//! ```

mod config;
mod session;

pub use config::{AnalysisConfig, BootstrapSettings, CONFIG_FILE_NAME, MinSamples, PowerSettings};
pub use session::{AnalysisSession, OmnibusResult, PairwiseComparison};

// Re-export the engine
pub use tierstat_stats as stats;
pub use tierstat_stats::{
    BootstrapConfig, BootstrapResult, CorrectionMethod, EffectMagnitude, EffectSizeResult,
    FactorialObservation, ParetoPoint, PowerConfig, RegressionResult, ScheirerRayHareResult,
    StatsError, SummaryStatistics, TestOutcome,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        AnalysisConfig, AnalysisSession, CorrectionMethod, EffectMagnitude, FactorialObservation,
        OmnibusResult, PairwiseComparison, ParetoPoint, TestOutcome,
    };
}
