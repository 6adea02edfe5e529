//! Pure conversion functions: TOML config structs -> crate API types.

use anyhow::{Context, Result, bail};
use hydroskill_datamodel::{
    MeasurementUnit, MetricName, Threshold, ThresholdOperator, ThresholdSide,
};
use hydroskill_stats::SummaryStatistic;
use tracing::warn;

use crate::config::{SkillConfig, ThresholdsToml, TimingToml};
use crate::evaluate::EvaluationPlan;

/// Parses a metric name such as `"threat score"` or `"THREAT_SCORE"`.
pub fn parse_metric_name(s: &str) -> Result<MetricName> {
    match s.parse::<MetricName>() {
        Ok(metric) => Ok(metric),
        Err(_) => bail!("unknown metric: {s:?}"),
    }
}

/// Parses a summary statistic name such as `"mean absolute"`.
pub fn parse_summary_statistic(s: &str) -> Result<SummaryStatistic> {
    match s.parse::<SummaryStatistic>() {
        Ok(statistic) => Ok(statistic),
        Err(_) => bail!("unknown summary statistic: {s:?}"),
    }
}

/// Parses a threshold operator name into the corresponding enum variant.
pub fn parse_operator(s: &str) -> Result<ThresholdOperator> {
    match s.to_lowercase().replace([' ', '-'], "_").as_str() {
        "greater" | ">" => Ok(ThresholdOperator::Greater),
        "greater_equal" | ">=" => Ok(ThresholdOperator::GreaterEqual),
        "less" | "<" => Ok(ThresholdOperator::Less),
        "less_equal" | "<=" => Ok(ThresholdOperator::LessEqual),
        "equal" | "==" => Ok(ThresholdOperator::Equal),
        other => bail!("unknown threshold operator: {other:?}"),
    }
}

/// Parses a threshold data side name into the corresponding enum variant.
pub fn parse_side(s: &str) -> Result<ThresholdSide> {
    match s.to_lowercase().replace([' ', '-'], "_").as_str() {
        "left" => Ok(ThresholdSide::Left),
        "right" => Ok(ThresholdSide::Right),
        "left_and_right" => Ok(ThresholdSide::LeftAndRight),
        other => bail!("unknown threshold side: {other:?}"),
    }
}

/// Builds the value thresholds followed by the probability thresholds.
pub fn build_thresholds(thresholds: &ThresholdsToml) -> Result<Vec<Threshold>> {
    let operator = parse_operator(&thresholds.operator)?;
    let side = parse_side(&thresholds.side)?;
    let unit = thresholds
        .unit
        .as_deref()
        .map(MeasurementUnit::new)
        .transpose()
        .context("invalid threshold unit")?;

    let values = thresholds
        .values
        .iter()
        .map(|&v| Threshold::value(v, operator, side));
    let probabilities = thresholds
        .probabilities
        .iter()
        .map(|&p| Threshold::probability(p, operator, side));

    values
        .chain(probabilities)
        .map(|threshold| -> Result<Threshold> {
            let threshold = threshold.context("invalid threshold")?;
            Ok(match &unit {
                Some(unit) => threshold.with_unit(unit.clone()),
                None => threshold,
            })
        })
        .collect()
}

/// Parses the `[timing]` statistics. At least one is required.
pub fn build_summary_statistics(timing: &TimingToml) -> Result<Vec<SummaryStatistic>> {
    if timing.statistics.is_empty() {
        bail!("[timing].statistics must name at least one summary statistic");
    }
    timing
        .statistics
        .iter()
        .map(|s| parse_summary_statistic(s))
        .collect()
}

/// Builds an [`EvaluationPlan`] from the full configuration.
pub fn build_plan(config: &SkillConfig) -> Result<EvaluationPlan> {
    if config.metrics.names.is_empty() {
        bail!("[metrics].names must name at least one metric");
    }
    let metrics = config
        .metrics
        .names
        .iter()
        .map(|s| parse_metric_name(s))
        .collect::<Result<Vec<_>>>()?;
    let thresholds = build_thresholds(&config.thresholds)?;
    if thresholds.is_empty() && metrics.iter().any(|m| m.is_dichotomous()) {
        warn!("dichotomous metrics requested without thresholds; they will not be computed");
    }

    let mut plan = EvaluationPlan::new(&metrics)
        .context("invalid metric selection")?
        .with_thresholds(thresholds);
    if metrics.iter().any(|m| m.is_summary_statistic()) {
        let statistics = build_summary_statistics(&config.timing)?;
        plan = plan
            .with_summary_statistics(&statistics)
            .context("invalid timing summary")?;
    }
    if let Some(seed) = config.seed {
        plan = plan.with_seed(seed);
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydroskill_datamodel::ThresholdValue;

    #[test]
    fn test_parse_metric_name() {
        assert_eq!(
            parse_metric_name("threat score").unwrap(),
            MetricName::ThreatScore
        );
        assert_eq!(
            parse_metric_name("TIME_TO_PEAK_ERROR").unwrap(),
            MetricName::TimeToPeakError
        );
        let err = parse_metric_name("brier score").unwrap_err();
        assert!(err.to_string().contains("unknown metric"));
    }

    #[test]
    fn test_parse_operator_and_side() {
        assert_eq!(parse_operator(">=").unwrap(), ThresholdOperator::GreaterEqual);
        assert_eq!(parse_operator("Less Equal").unwrap(), ThresholdOperator::LessEqual);
        assert!(parse_operator("between").is_err());
        assert_eq!(parse_side("left-and-right").unwrap(), ThresholdSide::LeftAndRight);
        assert!(parse_side("baseline").is_err());
    }

    #[test]
    fn test_build_thresholds() {
        let toml = ThresholdsToml {
            values: vec![10.0],
            probabilities: vec![0.9],
            operator: "greater".to_string(),
            side: "left".to_string(),
            unit: Some("CMS".to_string()),
        };
        let thresholds = build_thresholds(&toml).unwrap();
        assert_eq!(thresholds.len(), 2);
        assert_eq!(thresholds[0].threshold_value(), ThresholdValue::Value(10.0));
        assert_eq!(
            thresholds[1].threshold_value(),
            ThresholdValue::Probability(0.9)
        );
        assert_eq!(thresholds[0].unit().map(|u| u.name()), Some("CMS"));
    }

    #[test]
    fn test_build_thresholds_rejects_bad_probability() {
        let toml = ThresholdsToml {
            probabilities: vec![1.5],
            ..ThresholdsToml::default()
        };
        assert!(build_thresholds(&toml).is_err());
    }

    #[test]
    fn test_build_plan_from_toml() {
        let config: SkillConfig = toml::from_str(
            r#"
            seed = 7

            [metrics]
            names = ["probability of detection", "time to peak error statistic"]

            [thresholds]
            values = [5.0]

            [timing]
            statistics = ["mean", "standard deviation"]
            "#,
        )
        .unwrap();
        let plan = build_plan(&config).unwrap();
        assert_eq!(plan.seed(), Some(7));
        assert_eq!(
            plan.metrics(),
            &[
                MetricName::ProbabilityOfDetection,
                MetricName::TimeToPeakErrorStatistic
            ]
        );
        assert_eq!(plan.thresholds().len(), 1);
    }

    #[test]
    fn test_build_plan_rejects_unknown_metric() {
        let config: SkillConfig = toml::from_str(
            r#"
            [metrics]
            names = ["threat score", "sharpness"]
            "#,
        )
        .unwrap();
        let err = build_plan(&config).unwrap_err();
        assert!(err.to_string().contains("sharpness"));
    }

    #[test]
    fn test_build_plan_rejects_empty_timing_statistics() {
        let config: SkillConfig = toml::from_str(
            r#"
            [metrics]
            names = ["time to peak relative error statistic"]

            [timing]
            statistics = []
            "#,
        )
        .unwrap();
        assert!(build_plan(&config).is_err());
    }

    #[test]
    fn test_default_config_builds() {
        let plan = build_plan(&SkillConfig::default()).unwrap();
        assert_eq!(plan.metrics().len(), 12);
        assert!(plan.thresholds().is_empty());
    }
}
