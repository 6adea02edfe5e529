//! Verification statistics produced by metrics.
//!
//! Every statistic names the metric that produced it and carries the
//! [`PoolMetadata`] of the pool it was computed from. Missing values are
//! `None`, never `NaN`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use hydroskill_stats::SummaryStatistic;
use serde::Serialize;

use crate::error::UnknownMetric;
use crate::metadata::PoolMetadata;
use crate::time::duration_millis;

/// Identifies a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricName {
    ContingencyTable,
    ProbabilityOfDetection,
    ProbabilityOfFalseDetection,
    ThreatScore,
    EquitableThreatScore,
    FrequencyBias,
    PeirceSkillScore,
    ContinuousRankedProbabilityScore,
    ContinuousRankedProbabilitySkillScore,
    RankHistogram,
    TimeToPeakError,
    TimeToPeakRelativeError,
    TimeToPeakErrorStatistic,
    TimeToPeakRelativeErrorStatistic,
}

impl MetricName {
    pub const ALL: [MetricName; 14] = [
        MetricName::ContingencyTable,
        MetricName::ProbabilityOfDetection,
        MetricName::ProbabilityOfFalseDetection,
        MetricName::ThreatScore,
        MetricName::EquitableThreatScore,
        MetricName::FrequencyBias,
        MetricName::PeirceSkillScore,
        MetricName::ContinuousRankedProbabilityScore,
        MetricName::ContinuousRankedProbabilitySkillScore,
        MetricName::RankHistogram,
        MetricName::TimeToPeakError,
        MetricName::TimeToPeakRelativeError,
        MetricName::TimeToPeakErrorStatistic,
        MetricName::TimeToPeakRelativeErrorStatistic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricName::ContingencyTable => "CONTINGENCY_TABLE",
            MetricName::ProbabilityOfDetection => "PROBABILITY_OF_DETECTION",
            MetricName::ProbabilityOfFalseDetection => "PROBABILITY_OF_FALSE_DETECTION",
            MetricName::ThreatScore => "THREAT_SCORE",
            MetricName::EquitableThreatScore => "EQUITABLE_THREAT_SCORE",
            MetricName::FrequencyBias => "FREQUENCY_BIAS",
            MetricName::PeirceSkillScore => "PEIRCE_SKILL_SCORE",
            MetricName::ContinuousRankedProbabilityScore => "CONTINUOUS_RANKED_PROBABILITY_SCORE",
            MetricName::ContinuousRankedProbabilitySkillScore => {
                "CONTINUOUS_RANKED_PROBABILITY_SKILL_SCORE"
            }
            MetricName::RankHistogram => "RANK_HISTOGRAM",
            MetricName::TimeToPeakError => "TIME_TO_PEAK_ERROR",
            MetricName::TimeToPeakRelativeError => "TIME_TO_PEAK_RELATIVE_ERROR",
            MetricName::TimeToPeakErrorStatistic => "TIME_TO_PEAK_ERROR_STATISTIC",
            MetricName::TimeToPeakRelativeErrorStatistic => "TIME_TO_PEAK_RELATIVE_ERROR_STATISTIC",
        }
    }

    /// Scores derived from a 2x2 contingency table.
    pub fn is_dichotomous(self) -> bool {
        matches!(
            self,
            MetricName::ContingencyTable
                | MetricName::ProbabilityOfDetection
                | MetricName::ProbabilityOfFalseDetection
                | MetricName::ThreatScore
                | MetricName::EquitableThreatScore
                | MetricName::FrequencyBias
                | MetricName::PeirceSkillScore
        )
    }

    /// Summaries of a timing-error collection.
    pub fn is_summary_statistic(self) -> bool {
        matches!(
            self,
            MetricName::TimeToPeakErrorStatistic | MetricName::TimeToPeakRelativeErrorStatistic
        )
    }

    /// The metric whose output a summary statistic summarises.
    pub fn summarised_metric(self) -> Option<MetricName> {
        match self {
            MetricName::TimeToPeakErrorStatistic => Some(MetricName::TimeToPeakError),
            MetricName::TimeToPeakRelativeErrorStatistic => {
                Some(MetricName::TimeToPeakRelativeError)
            }
            _ => None,
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricName {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        MetricName::ALL
            .into_iter()
            .find(|metric| metric.as_str() == normalised)
            .ok_or_else(|| UnknownMetric {
                name: s.to_string(),
            })
    }
}

/// Names one component of a statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentName {
    Main,
    TruePositives,
    FalsePositives,
    FalseNegatives,
    TrueNegatives,
    RankOrder,
    ObservedRelativeFrequency,
    Mean,
    Median,
    Minimum,
    Maximum,
    MeanAbsolute,
    StandardDeviation,
}

impl ComponentName {
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentName::Main => "MAIN",
            ComponentName::TruePositives => "TRUE_POSITIVES",
            ComponentName::FalsePositives => "FALSE_POSITIVES",
            ComponentName::FalseNegatives => "FALSE_NEGATIVES",
            ComponentName::TrueNegatives => "TRUE_NEGATIVES",
            ComponentName::RankOrder => "RANK_ORDER",
            ComponentName::ObservedRelativeFrequency => "OBSERVED_RELATIVE_FREQUENCY",
            ComponentName::Mean => "MEAN",
            ComponentName::Median => "MEDIAN",
            ComponentName::Minimum => "MINIMUM",
            ComponentName::Maximum => "MAXIMUM",
            ComponentName::MeanAbsolute => "MEAN_ABSOLUTE",
            ComponentName::StandardDeviation => "STANDARD_DEVIATION",
        }
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<SummaryStatistic> for ComponentName {
    fn from(statistic: SummaryStatistic) -> Self {
        match statistic {
            SummaryStatistic::Mean => ComponentName::Mean,
            SummaryStatistic::Median => ComponentName::Median,
            SummaryStatistic::Minimum => ComponentName::Minimum,
            SummaryStatistic::Maximum => ComponentName::Maximum,
            SummaryStatistic::MeanAbsolute => ComponentName::MeanAbsolute,
            SummaryStatistic::StandardDeviation => ComponentName::StandardDeviation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreComponent {
    pub name: ComponentName,
    pub value: Option<f64>,
}

/// One or more named scalar values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoubleScore {
    metric: MetricName,
    components: Vec<ScoreComponent>,
    metadata: PoolMetadata,
}

impl DoubleScore {
    pub fn new(metric: MetricName, components: Vec<ScoreComponent>, metadata: PoolMetadata) -> Self {
        Self {
            metric,
            components,
            metadata,
        }
    }

    /// A score with a single [`ComponentName::Main`] component.
    pub fn main(metric: MetricName, value: Option<f64>, metadata: PoolMetadata) -> Self {
        Self::new(
            metric,
            vec![ScoreComponent {
                name: ComponentName::Main,
                value,
            }],
            metadata,
        )
    }

    pub fn metric(&self) -> MetricName {
        self.metric
    }

    pub fn components(&self) -> &[ScoreComponent] {
        &self.components
    }

    pub fn metadata(&self) -> &PoolMetadata {
        &self.metadata
    }

    /// Value of the named component; `None` if absent or missing.
    pub fn value(&self, name: ComponentName) -> Option<f64> {
        self.components
            .iter()
            .find(|c| c.name == name)
            .and_then(|c| c.value)
    }

    pub fn has_component(&self, name: ComponentName) -> bool {
        self.components.iter().any(|c| c.name == name)
    }

    pub fn component_names(&self) -> Vec<ComponentName> {
        self.components.iter().map(|c| c.name).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramComponent {
    pub name: ComponentName,
    pub values: Vec<Option<f64>>,
}

/// Named vectors of values, e.g. rank order against relative frequency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagram {
    metric: MetricName,
    components: Vec<DiagramComponent>,
    metadata: PoolMetadata,
}

impl Diagram {
    pub fn new(
        metric: MetricName,
        components: Vec<DiagramComponent>,
        metadata: PoolMetadata,
    ) -> Self {
        Self {
            metric,
            components,
            metadata,
        }
    }

    pub fn metric(&self) -> MetricName {
        self.metric
    }

    pub fn components(&self) -> &[DiagramComponent] {
        &self.components
    }

    pub fn metadata(&self) -> &PoolMetadata {
        &self.metadata
    }

    pub fn values(&self, name: ComponentName) -> Option<&[Option<f64>]> {
        self.components
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.values[..])
    }
}

/// A duration keyed by the reference time of the series it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DurationPair {
    pub reference_time: DateTime<Utc>,
    #[serde(with = "duration_millis")]
    pub duration: TimeDelta,
}

/// One duration per time series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationDiagram {
    metric: MetricName,
    pairs: Vec<DurationPair>,
    metadata: PoolMetadata,
}

impl DurationDiagram {
    pub fn new(metric: MetricName, pairs: Vec<DurationPair>, metadata: PoolMetadata) -> Self {
        Self {
            metric,
            pairs,
            metadata,
        }
    }

    pub fn metric(&self) -> MetricName {
        self.metric
    }

    pub fn pairs(&self) -> &[DurationPair] {
        &self.pairs
    }

    pub fn metadata(&self) -> &PoolMetadata {
        &self.metadata
    }

    pub fn durations(&self) -> impl Iterator<Item = TimeDelta> + '_ {
        self.pairs.iter().map(|p| p.duration)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationComponent {
    pub name: ComponentName,
    #[serde(serialize_with = "duration_millis::option::serialize")]
    pub value: Option<TimeDelta>,
}

/// Named scalar durations, e.g. the mean time-to-peak error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationScore {
    metric: MetricName,
    components: Vec<DurationComponent>,
    metadata: PoolMetadata,
}

impl DurationScore {
    pub fn new(
        metric: MetricName,
        components: Vec<DurationComponent>,
        metadata: PoolMetadata,
    ) -> Self {
        Self {
            metric,
            components,
            metadata,
        }
    }

    pub fn metric(&self) -> MetricName {
        self.metric
    }

    pub fn components(&self) -> &[DurationComponent] {
        &self.components
    }

    pub fn metadata(&self) -> &PoolMetadata {
        &self.metadata
    }

    pub fn value(&self, name: ComponentName) -> Option<TimeDelta> {
        self.components
            .iter()
            .find(|c| c.name == name)
            .and_then(|c| c.value)
    }
}

/// Any statistic a metric can produce.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Statistic {
    DoubleScore(DoubleScore),
    Diagram(Diagram),
    DurationDiagram(DurationDiagram),
    DurationScore(DurationScore),
}

impl Statistic {
    pub fn metric(&self) -> MetricName {
        match self {
            Statistic::DoubleScore(s) => s.metric(),
            Statistic::Diagram(s) => s.metric(),
            Statistic::DurationDiagram(s) => s.metric(),
            Statistic::DurationScore(s) => s.metric(),
        }
    }

    pub fn metadata(&self) -> &PoolMetadata {
        match self {
            Statistic::DoubleScore(s) => s.metadata(),
            Statistic::Diagram(s) => s.metadata(),
            Statistic::DurationDiagram(s) => s.metadata(),
            Statistic::DurationScore(s) => s.metadata(),
        }
    }
}

impl From<DoubleScore> for Statistic {
    fn from(score: DoubleScore) -> Self {
        Statistic::DoubleScore(score)
    }
}

impl From<Diagram> for Statistic {
    fn from(diagram: Diagram) -> Self {
        Statistic::Diagram(diagram)
    }
}

impl From<DurationDiagram> for Statistic {
    fn from(diagram: DurationDiagram) -> Self {
        Statistic::DurationDiagram(diagram)
    }
}

impl From<DurationScore> for Statistic {
    fn from(score: DurationScore) -> Self {
        Statistic::DurationScore(score)
    }
}
