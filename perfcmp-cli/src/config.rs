//! Configuration loading from perfcmp.toml
//!
//! perfcmp configuration can be specified in a `perfcmp.toml` file in the project root.
//! The configuration is automatically discovered by walking up from the current directory.

use perfcmp_logic::{AggregationConfig, DEFAULT_WARMUP_RUNS};
use perfcmp_stats::DEFAULT_ALPHA;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file searched for by [`PerfcmpConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "perfcmp.toml";

/// perfcmp configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PerfcmpConfig {
    /// Statistics configuration
    #[serde(default)]
    pub stats: StatsConfig,
    /// Methodology validation configuration
    #[serde(default)]
    pub validate: ValidateConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Statistics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Significance level (0.01 gives 99% confidence intervals)
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Leading values dropped from each process run as warm-up
    #[serde(default = "default_warmup_runs")]
    pub warmup_runs: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            warmup_runs: default_warmup_runs(),
        }
    }
}

fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}
fn default_warmup_runs() -> usize {
    DEFAULT_WARMUP_RUNS
}

/// Methodology validation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidateConfig {
    /// Boots per group; should match the boots per revision of real comparisons
    #[serde(default)]
    pub group_size: Option<usize>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "human", "json" or "csv"
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}

impl PerfcmpConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> anyhow::Result<Option<Self>> {
        let Ok(mut dir) = std::env::current_dir() else {
            return Ok(None);
        };
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                tracing::debug!(path = %config_path.display(), "loading configuration");
                return Self::load(&config_path).map(Some);
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Aggregation settings derived from the `[stats]` table
    pub fn aggregation(&self) -> AggregationConfig {
        AggregationConfig {
            alpha: self.stats.alpha,
            warmup_runs: self.stats.warmup_runs,
        }
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# perfcmp Configuration

[stats]
# Significance level: probability that the true mean lies outside the
# reported confidence interval (0.01 gives 99% intervals)
alpha = 0.01
# Values dropped from the start of each process run as warm-up
warmup_runs = 1

[validate]
# Boots per group for validate-perfcompare (uncomment to enable)
# group_size = 5

[output]
# Default output format: human, json, csv
format = "human"
"#
        .to_string()
    }
}
