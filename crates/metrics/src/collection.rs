//! Computes several dichotomous scores from one contingency table.

use hydroskill_datamodel::{DoubleScore, MetricName, Pool};
use tracing::debug;

use crate::contingency::{ContingencyTable, ContingencyTableMetric};
use crate::dichotomous::{
    EquitableThreatScore, FrequencyBias, PeirceSkillScore, ProbabilityOfDetection,
    ProbabilityOfFalseDetection, ThreatScore,
};
use crate::error::MetricError;
use crate::Collectable;

/// A set of dichotomous metrics that share one contingency table per pool.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricCollection {
    metrics: Vec<MetricName>,
}

impl MetricCollection {
    /// Creates a collection. Every metric must derive from a 2x2 contingency
    /// table; duplicates are dropped.
    pub fn new(metrics: &[MetricName]) -> Result<Self, MetricError> {
        if metrics.is_empty() {
            return Err(MetricError::InvalidParameter {
                metric: MetricName::ContingencyTable,
                reason: "a metric collection needs at least one metric".to_string(),
            });
        }
        if let Some(other) = metrics.iter().find(|m| !m.is_dichotomous()) {
            return Err(MetricError::InvalidParameter {
                metric: *other,
                reason: "not derived from a contingency table".to_string(),
            });
        }
        let mut unique: Vec<MetricName> = Vec::with_capacity(metrics.len());
        for metric in metrics {
            if !unique.contains(metric) {
                unique.push(*metric);
            }
        }
        Ok(Self { metrics: unique })
    }

    pub fn metrics(&self) -> &[MetricName] {
        &self.metrics
    }

    /// Counts the table once and derives every score from it, in the order
    /// the metrics were given.
    #[tracing::instrument(skip_all, fields(samples = pool.len(), metrics = self.metrics.len()))]
    pub fn apply(&self, pool: &Pool<(bool, bool)>) -> Result<Vec<DoubleScore>, MetricError> {
        let table = ContingencyTableMetric.intermediate(pool)?;
        self.aggregate(&table)
    }

    /// Derives every score from an already counted table.
    pub fn aggregate(&self, table: &ContingencyTable) -> Result<Vec<DoubleScore>, MetricError> {
        let scores = self
            .metrics
            .iter()
            .map(|metric| derive(*metric, table))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(scores = scores.len(), "derived scores from shared table");
        Ok(scores)
    }
}

fn derive(metric: MetricName, table: &ContingencyTable) -> Result<DoubleScore, MetricError> {
    match metric {
        MetricName::ContingencyTable => ContingencyTableMetric.aggregate(table),
        MetricName::ProbabilityOfDetection => ProbabilityOfDetection.aggregate(table),
        MetricName::ProbabilityOfFalseDetection => ProbabilityOfFalseDetection.aggregate(table),
        MetricName::ThreatScore => ThreatScore.aggregate(table),
        MetricName::EquitableThreatScore => EquitableThreatScore.aggregate(table),
        MetricName::FrequencyBias => FrequencyBias.aggregate(table),
        MetricName::PeirceSkillScore => PeirceSkillScore.aggregate(table),
        other => Err(MetricError::InvalidParameter {
            metric: other,
            reason: "not derived from a contingency table".to_string(),
        }),
    }
}
