use std::path::Path;

use anyhow::{Context, Result};
use hydroskill_datamodel::MetricName;
use hydroskill_stats::SummaryStatistic;
use serde::Deserialize;

/// Top-level verification configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkillConfig {
    /// Base RNG seed. Pool `i` is evaluated with `seed + i`.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Metrics to compute.
    #[serde(default)]
    pub metrics: MetricsToml,

    /// Event thresholds for the dichotomous metrics.
    #[serde(default)]
    pub thresholds: ThresholdsToml,

    /// Timing-error summary settings.
    #[serde(default)]
    pub timing: TimingToml,
}

impl SkillConfig {
    /// Reads and parses a TOML configuration file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&toml_str).context("failed to parse TOML config")
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsToml {
    #[serde(default = "default_metric_names")]
    pub names: Vec<String>,
}

impl Default for MetricsToml {
    fn default() -> Self {
        Self {
            names: default_metric_names(),
        }
    }
}

/// Every metric that is computed directly from a pool.
fn default_metric_names() -> Vec<String> {
    MetricName::ALL
        .iter()
        .filter(|m| !m.is_summary_statistic())
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Real-valued and probability thresholds sharing one operator and side.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdsToml {
    #[serde(default)]
    pub values: Vec<f64>,
    /// Non-exceedence probabilities, resolved per pool from its climatology.
    #[serde(default)]
    pub probabilities: Vec<f64>,
    #[serde(default = "default_operator")]
    pub operator: String,
    #[serde(default = "default_side")]
    pub side: String,
    #[serde(default)]
    pub unit: Option<String>,
}

impl Default for ThresholdsToml {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            probabilities: Vec::new(),
            operator: default_operator(),
            side: default_side(),
            unit: None,
        }
    }
}

fn default_operator() -> String {
    "greater".to_string()
}
fn default_side() -> String {
    "left".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingToml {
    #[serde(default = "default_statistics")]
    pub statistics: Vec<String>,
}

impl Default for TimingToml {
    fn default() -> Self {
        Self {
            statistics: default_statistics(),
        }
    }
}

fn default_statistics() -> Vec<String> {
    SummaryStatistic::ALL
        .iter()
        .map(|s| s.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: SkillConfig = toml::from_str("").unwrap();
        assert_eq!(config.seed, None);
        assert_eq!(config.metrics.names.len(), 12);
        assert!(config.thresholds.values.is_empty());
        assert_eq!(config.thresholds.operator, "greater");
        assert_eq!(config.thresholds.side, "left");
        assert_eq!(config.timing.statistics.len(), 6);
    }

    #[test]
    fn test_full_config() {
        let config: SkillConfig = toml::from_str(
            r#"
            seed = 42

            [metrics]
            names = ["threat score", "continuous ranked probability score"]

            [thresholds]
            values = [10.0, 25.5]
            probabilities = [0.9]
            operator = "greater_equal"
            side = "left_and_right"
            unit = "CMS"

            [timing]
            statistics = ["mean", "median"]
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(
            config.metrics.names,
            vec!["threat score", "continuous ranked probability score"]
        );
        assert_eq!(config.thresholds.values, vec![10.0, 25.5]);
        assert_eq!(config.thresholds.probabilities, vec![0.9]);
        assert_eq!(config.thresholds.side, "left_and_right");
        assert_eq!(config.thresholds.unit.as_deref(), Some("CMS"));
        assert_eq!(config.timing.statistics, vec!["mean", "median"]);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<SkillConfig, _> = toml::from_str(
            r#"
            [metrics]
            nmaes = ["threat score"]
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = SkillConfig::from_path(Path::new("/nonexistent/skill.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read config file"));
    }
}
