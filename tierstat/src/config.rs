//! Configuration loading from tierstat.toml
//!
//! Analysis settings can be specified in a `tierstat.toml` file in the project root.
//! The configuration is discovered by walking up from the current directory.
//! Every field has a default, so a partial file only overrides what it names.

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tierstat_stats::{
    BootstrapConfig, CorrectionMethod, DEFAULT_ALPHA, DEFAULT_BOOTSTRAP_RESAMPLES,
    DEFAULT_CONFIDENCE_LEVEL, DEFAULT_MIN_BOOTSTRAP_SAMPLES, DEFAULT_MIN_CORRELATION_SAMPLES,
    DEFAULT_MIN_KRUSKAL_WALLIS_SAMPLES, DEFAULT_MIN_MANN_WHITNEY_SAMPLES,
    DEFAULT_MIN_NORMALITY_SAMPLES, DEFAULT_POWER_SIMULATIONS, DEFAULT_SEED, PowerConfig,
};

/// File name searched for by [`AnalysisConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "tierstat.toml";

/// Analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Significance level for every test
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Correction applied to families of pairwise comparisons
    #[serde(default)]
    pub correction: CorrectionMethod,
    /// Bootstrap configuration
    #[serde(default)]
    pub bootstrap: BootstrapSettings,
    /// Power simulation configuration
    #[serde(default)]
    pub power: PowerSettings,
    /// Minimum sample sizes per test
    #[serde(default)]
    pub min_samples: MinSamples,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            correction: CorrectionMethod::default(),
            bootstrap: BootstrapSettings::default(),
            power: PowerSettings::default(),
            min_samples: MinSamples::default(),
        }
    }
}

fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}

/// Bootstrap settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapSettings {
    /// Number of resamples
    #[serde(default = "default_resamples")]
    pub resamples: usize,
    /// Confidence level (e.g., 0.95 for 95%)
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
    /// Seed for resampling
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Run resamples on the rayon pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for BootstrapSettings {
    fn default() -> Self {
        Self {
            resamples: default_resamples(),
            confidence_level: default_confidence_level(),
            seed: default_seed(),
            parallel: default_parallel(),
        }
    }
}

fn default_resamples() -> usize {
    DEFAULT_BOOTSTRAP_RESAMPLES
}
fn default_confidence_level() -> f64 {
    DEFAULT_CONFIDENCE_LEVEL
}
fn default_seed() -> u64 {
    DEFAULT_SEED
}
fn default_parallel() -> bool {
    true
}

/// Power simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerSettings {
    /// Number of simulated trials
    #[serde(default = "default_simulations")]
    pub simulations: usize,
    /// Seed for simulation
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Run trials on the rayon pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for PowerSettings {
    fn default() -> Self {
        Self {
            simulations: default_simulations(),
            seed: default_seed(),
            parallel: default_parallel(),
        }
    }
}

fn default_simulations() -> usize {
    DEFAULT_POWER_SIMULATIONS
}

/// Minimum sample sizes below which a test returns its sentinel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinSamples {
    /// Bootstrap sample size
    #[serde(default = "default_min_bootstrap")]
    pub bootstrap: usize,
    /// Size of each Mann-Whitney group
    #[serde(default = "default_min_mann_whitney")]
    pub mann_whitney: usize,
    /// Shapiro-Wilk sample size
    #[serde(default = "default_min_normality")]
    pub normality: usize,
    /// Number of pairs for Pearson and Spearman
    #[serde(default = "default_min_correlation")]
    pub correlation: usize,
    /// Size of each Kruskal-Wallis group
    #[serde(default = "default_min_kruskal_wallis")]
    pub kruskal_wallis: usize,
}

impl Default for MinSamples {
    fn default() -> Self {
        Self {
            bootstrap: default_min_bootstrap(),
            mann_whitney: default_min_mann_whitney(),
            normality: default_min_normality(),
            correlation: default_min_correlation(),
            kruskal_wallis: default_min_kruskal_wallis(),
        }
    }
}

fn default_min_bootstrap() -> usize {
    DEFAULT_MIN_BOOTSTRAP_SAMPLES
}
fn default_min_mann_whitney() -> usize {
    DEFAULT_MIN_MANN_WHITNEY_SAMPLES
}
fn default_min_normality() -> usize {
    DEFAULT_MIN_NORMALITY_SAMPLES
}
fn default_min_correlation() -> usize {
    DEFAULT_MIN_CORRELATION_SAMPLES
}
fn default_min_kruskal_wallis() -> usize {
    DEFAULT_MIN_KRUSKAL_WALLIS_SAMPLES
}

impl AnalysisConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let dir = std::env::current_dir().ok()?;
        Self::discover_from(&dir)
    }

    /// Walk up from `start` looking for [`CONFIG_FILE_NAME`]
    ///
    /// The first file found wins; if it fails to load, the failure is logged
    /// and `None` is returned.
    pub fn discover_from(start: &Path) -> Option<Self> {
        let mut dir = start.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        tracing::warn!("ignoring {}: {e:#}", config_path.display());
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Reject settings no analysis can run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            bail!("alpha must be between 0 and 1, got {}", self.alpha);
        }
        let level = self.bootstrap.confidence_level;
        if !(level > 0.0 && level < 1.0) {
            bail!("bootstrap.confidence_level must be between 0 and 1, got {level}");
        }
        if self.bootstrap.resamples == 0 {
            bail!("bootstrap.resamples must be positive");
        }
        if self.power.simulations == 0 {
            bail!("power.simulations must be positive");
        }
        Ok(())
    }

    /// Engine bootstrap configuration
    pub fn bootstrap_config(&self) -> BootstrapConfig {
        BootstrapConfig {
            resamples: self.bootstrap.resamples,
            confidence_level: self.bootstrap.confidence_level,
            seed: self.bootstrap.seed,
            min_samples: self.min_samples.bootstrap,
            parallel: self.bootstrap.parallel,
        }
    }

    /// Engine power configuration, testing at [`alpha`](Self::alpha)
    pub fn power_config(&self) -> PowerConfig {
        PowerConfig {
            alpha: self.alpha,
            simulations: self.power.simulations,
            seed: self.power.seed,
            parallel: self.power.parallel,
        }
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Tierstat Configuration

# Significance level for every test
alpha = 0.05
# Multiple comparison correction: "none", "bonferroni", "holm" or "benjamini-hochberg"
correction = "holm"

[bootstrap]
# Number of resamples for BCa confidence intervals
resamples = 10000
# Confidence level (0.0 to 1.0)
confidence_level = 0.95
seed = 42
# Resample on all cores; results do not depend on thread count
parallel = true

[power]
# Monte-Carlo trials per power estimate
simulations = 10000
seed = 42
parallel = true

[min_samples]
# Below these sizes a test reports its sentinel value
bootstrap = 2
mann_whitney = 2
normality = 3
correlation = 3
kruskal_wallis = 2
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.alpha, 0.05);
        assert_eq!(config.correction, CorrectionMethod::Holm);
        assert_eq!(config.bootstrap.resamples, 10_000);
        assert_eq!(config.power.seed, 42);
        assert_eq!(config.min_samples.normality, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            alpha = 0.01
            correction = "benjamini-hochberg"

            [bootstrap]
            resamples = 2000

            [min_samples]
            mann_whitney = 5
        "#;

        let config: AnalysisConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.alpha, 0.01);
        assert_eq!(config.correction, CorrectionMethod::BenjaminiHochberg);
        assert_eq!(config.bootstrap.resamples, 2000);
        assert_eq!(config.min_samples.mann_whitney, 5);
        // Defaults should still apply
        assert_eq!(config.bootstrap.confidence_level, 0.95);
        assert_eq!(config.min_samples.correlation, 3);
        assert_eq!(config.power.simulations, 10_000);
    }

    #[test]
    fn test_default_toml_parses() {
        let config: AnalysisConfig = toml::from_str(&AnalysisConfig::default_toml()).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AnalysisConfig::default();
        config.alpha = 1.0;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.bootstrap.confidence_level = 0.0;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.power.simulations = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_engine_configs() {
        let mut config = AnalysisConfig::default();
        config.alpha = 0.1;
        config.min_samples.bootstrap = 4;
        config.power.seed = 7;

        let bootstrap = config.bootstrap_config();
        assert_eq!(bootstrap.min_samples, 4);
        assert_eq!(bootstrap.resamples, 10_000);

        let power = config.power_config();
        assert_eq!(power.alpha, 0.1);
        assert_eq!(power.seed, 7);
    }

    #[test]
    fn test_unknown_correction_is_rejected() {
        assert!(toml::from_str::<AnalysisConfig>(r#"correction = "sidak""#).is_err());
    }
}
