//! Summary statistics over a collection of timing errors.

use chrono::TimeDelta;
use hydroskill_datamodel::{DurationComponent, DurationDiagram, DurationScore, MetricName};
use hydroskill_stats::SummaryStatistic;

use crate::Metric;
use crate::error::MetricError;

/// Summarises the durations of a timing-error diagram.
///
/// Durations are summarised in nanoseconds and rounded back to whole
/// nanoseconds, so relative timing errors keep their precision. A statistic
/// that cannot be computed (no durations, or fewer than two for the standard
/// deviation) or that falls outside the representable duration range is
/// missing.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingErrorSummaryStatistics {
    statistics: Vec<SummaryStatistic>,
    metric: MetricName,
}

impl TimingErrorSummaryStatistics {
    /// `metric` must be a summary-statistic metric, e.g.
    /// [`MetricName::TimeToPeakErrorStatistic`], and `statistics` must not be
    /// empty. Duplicates are dropped.
    pub fn new(statistics: &[SummaryStatistic], metric: MetricName) -> Result<Self, MetricError> {
        if !metric.is_summary_statistic() {
            return Err(MetricError::InvalidParameter {
                metric,
                reason: "not a timing-error summary statistic".to_string(),
            });
        }
        if statistics.is_empty() {
            return Err(MetricError::InvalidParameter {
                metric,
                reason: "at least one summary statistic is required".to_string(),
            });
        }
        let mut unique: Vec<SummaryStatistic> = Vec::with_capacity(statistics.len());
        for statistic in statistics {
            if !unique.contains(statistic) {
                unique.push(*statistic);
            }
        }
        Ok(Self {
            statistics: unique,
            metric,
        })
    }

    pub fn statistics(&self) -> &[SummaryStatistic] {
        &self.statistics
    }
}

impl Metric<DurationDiagram> for TimingErrorSummaryStatistics {
    type Output = DurationScore;

    fn name(&self) -> MetricName {
        self.metric
    }

    fn apply(&self, diagram: &DurationDiagram) -> Result<DurationScore, MetricError> {
        if self.metric.summarised_metric() != Some(diagram.metric()) {
            return Err(MetricError::ShapeMismatch {
                metric: self.metric,
                expected: self
                    .metric
                    .summarised_metric()
                    .map_or_else(String::new, |m| m.to_string()),
                actual: diagram.metric().to_string(),
            });
        }

        let nanos: Vec<f64> = diagram.durations().map(as_nanos).collect();
        let components = self
            .statistics
            .iter()
            .map(|&statistic| DurationComponent {
                name: statistic.into(),
                value: statistic.apply(&nanos).and_then(from_nanos),
            })
            .collect();
        Ok(DurationScore::new(
            self.metric,
            components,
            diagram.metadata().clone(),
        ))
    }
}

fn as_nanos(duration: TimeDelta) -> f64 {
    duration.num_seconds() as f64 * NANOS_PER_SECOND + f64::from(duration.subsec_nanos())
}

fn from_nanos(nanos: f64) -> Option<TimeDelta> {
    let seconds = (nanos / NANOS_PER_SECOND).trunc();
    if !seconds.is_finite() || seconds.abs() >= i64::MAX as f64 {
        return None;
    }
    let subsec = (nanos - seconds * NANOS_PER_SECOND).round();
    TimeDelta::try_seconds(seconds as i64)?.checked_add(&TimeDelta::nanoseconds(subsec as i64))
}

const NANOS_PER_SECOND: f64 = 1e9;
