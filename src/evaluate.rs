//! Multi-pool evaluation.
//!
//! Pools are independent, so they are evaluated in parallel. Pool `i` draws
//! its random numbers from its own `StdRng` seeded with `seed + i`; results
//! do not depend on thread scheduling.

use anyhow::{Context, Result};
use hydroskill_datamodel::{
    DurationDiagram, Ensemble, MetadataError, MetricName, Pool, PoolMetadata, Statistic,
    Threshold, TimeSeries, slicer,
};
use hydroskill_metrics::{
    ContinuousRankedProbabilityScore, ContinuousRankedProbabilitySkillScore, Metric,
    MetricCollection, MetricError, RandomizedMetric, RankHistogram, TimeToPeakError,
    TimeToPeakRelativeError, TimingErrorSummaryStatistics,
};
use hydroskill_stats::SummaryStatistic;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

/// A pool of any sample shape the metrics accept.
#[derive(Debug, Clone)]
pub enum PoolData {
    /// Observed and predicted single values.
    SingleValued(Pool<(f64, f64)>),
    /// Observations paired with ensemble forecasts.
    Ensemble(Pool<(f64, Ensemble)>),
    /// Paired time series, one per forecast issue.
    TimeSeries(Pool<TimeSeries<(f64, f64)>>),
}

impl PoolData {
    pub fn metadata(&self) -> &PoolMetadata {
        match self {
            PoolData::SingleValued(pool) => pool.metadata(),
            PoolData::Ensemble(pool) => pool.metadata(),
            PoolData::TimeSeries(pool) => pool.metadata(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PoolData::SingleValued(pool) => pool.len(),
            PoolData::Ensemble(pool) => pool.len(),
            PoolData::TimeSeries(pool) => pool.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Pool<(f64, f64)>> for PoolData {
    fn from(pool: Pool<(f64, f64)>) -> Self {
        PoolData::SingleValued(pool)
    }
}

impl From<Pool<(f64, Ensemble)>> for PoolData {
    fn from(pool: Pool<(f64, Ensemble)>) -> Self {
        PoolData::Ensemble(pool)
    }
}

impl From<Pool<TimeSeries<(f64, f64)>>> for PoolData {
    fn from(pool: Pool<TimeSeries<(f64, f64)>>) -> Self {
        PoolData::TimeSeries(pool)
    }
}

/// Statistics computed for one pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolStatistics {
    pub pool_id: u64,
    pub statistics: Vec<Statistic>,
}

/// The metrics to compute and how to compute them.
///
/// Metrics that do not apply to a pool's sample shape are skipped for that
/// pool: dichotomous scores apply to single-valued pools, CRPS and the rank
/// histogram to ensemble pools, and the timing errors to time-series pools.
#[derive(Debug, Clone)]
pub struct EvaluationPlan {
    metrics: Vec<MetricName>,
    collection: Option<MetricCollection>,
    thresholds: Vec<Threshold>,
    summaries: Vec<TimingErrorSummaryStatistics>,
    seed: Option<u64>,
}

impl EvaluationPlan {
    /// Creates a plan for `metrics`, dropping duplicates. Summary metrics
    /// use every [`SummaryStatistic`] until
    /// [`EvaluationPlan::with_summary_statistics`] narrows them.
    pub fn new(metrics: &[MetricName]) -> Result<Self, MetricError> {
        let mut unique: Vec<MetricName> = Vec::with_capacity(metrics.len());
        for metric in metrics {
            if !unique.contains(metric) {
                unique.push(*metric);
            }
        }
        let dichotomous: Vec<MetricName> =
            unique.iter().copied().filter(|m| m.is_dichotomous()).collect();
        let collection = if dichotomous.is_empty() {
            None
        } else {
            Some(MetricCollection::new(&dichotomous)?)
        };

        let plan = Self {
            metrics: unique,
            collection,
            thresholds: Vec::new(),
            summaries: Vec::new(),
            seed: None,
        };
        plan.with_summary_statistics(&SummaryStatistic::ALL)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Event thresholds for the dichotomous metrics. Probability thresholds
    /// are resolved per pool from its climatology.
    pub fn with_thresholds(mut self, thresholds: impl IntoIterator<Item = Threshold>) -> Self {
        self.thresholds = thresholds.into_iter().collect();
        self
    }

    pub fn with_summary_statistics(
        mut self,
        statistics: &[SummaryStatistic],
    ) -> Result<Self, MetricError> {
        self.summaries = self
            .metrics
            .iter()
            .filter(|m| m.is_summary_statistic())
            .map(|m| TimingErrorSummaryStatistics::new(statistics, *m))
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    pub fn metrics(&self) -> &[MetricName] {
        &self.metrics
    }

    pub fn thresholds(&self) -> &[Threshold] {
        &self.thresholds
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    fn requests(&self, metric: MetricName) -> bool {
        self.metrics.contains(&metric)
    }

    /// Applies every applicable metric to one pool.
    pub fn evaluate(
        &self,
        pool: &PoolData,
        rng: &mut impl Rng,
    ) -> Result<Vec<Statistic>, MetricError> {
        match pool {
            PoolData::SingleValued(pool) => self.evaluate_single_valued(pool),
            PoolData::Ensemble(pool) => self.evaluate_ensemble(pool, rng),
            PoolData::TimeSeries(pool) => self.evaluate_time_series(pool, rng),
        }
    }

    fn evaluate_single_valued(
        &self,
        pool: &Pool<(f64, f64)>,
    ) -> Result<Vec<Statistic>, MetricError> {
        let Some(collection) = &self.collection else {
            return Ok(Vec::new());
        };
        if self.thresholds.is_empty() {
            debug!(
                pool_id = pool.metadata().pool_id(),
                "no thresholds, skipping dichotomous metrics"
            );
            return Ok(Vec::new());
        }

        let mut statistics: Vec<Statistic> = Vec::new();
        for threshold in &self.thresholds {
            let threshold = resolve_threshold(pool, threshold)?;
            let events = slicer::to_dichotomous(pool, &threshold)?;
            statistics.extend(collection.apply(&events)?.into_iter().map(Statistic::from));
        }
        Ok(statistics)
    }

    fn evaluate_ensemble(
        &self,
        pool: &Pool<(f64, Ensemble)>,
        rng: &mut impl Rng,
    ) -> Result<Vec<Statistic>, MetricError> {
        let mut statistics: Vec<Statistic> = Vec::new();
        if self.requests(MetricName::ContinuousRankedProbabilityScore) {
            statistics.push(ContinuousRankedProbabilityScore.apply(pool)?.into());
        }
        if self.requests(MetricName::ContinuousRankedProbabilitySkillScore) {
            if pool.has_baseline() {
                statistics.push(ContinuousRankedProbabilitySkillScore.apply(pool)?.into());
            } else {
                debug!(
                    pool_id = pool.metadata().pool_id(),
                    "no baseline, skipping skill score"
                );
            }
        }
        if self.requests(MetricName::RankHistogram) {
            statistics.push(RankHistogram.apply(pool, rng)?.into());
        }
        Ok(statistics)
    }

    fn evaluate_time_series(
        &self,
        pool: &Pool<TimeSeries<(f64, f64)>>,
        rng: &mut impl Rng,
    ) -> Result<Vec<Statistic>, MetricError> {
        let mut statistics: Vec<Statistic> = Vec::new();
        if self.needs_timing(MetricName::TimeToPeakError) {
            let diagram = TimeToPeakError.apply(pool, rng)?;
            self.push_timing(diagram, &mut statistics)?;
        }
        if self.needs_timing(MetricName::TimeToPeakRelativeError) {
            let diagram = TimeToPeakRelativeError.apply(pool, rng)?;
            self.push_timing(diagram, &mut statistics)?;
        }
        Ok(statistics)
    }

    /// A timing diagram is computed when requested itself or summarised.
    fn needs_timing(&self, metric: MetricName) -> bool {
        self.requests(metric)
            || self
                .summaries
                .iter()
                .any(|s| s.name().summarised_metric() == Some(metric))
    }

    fn push_timing(
        &self,
        diagram: DurationDiagram,
        statistics: &mut Vec<Statistic>,
    ) -> Result<(), MetricError> {
        let summaries = self
            .summaries
            .iter()
            .filter(|s| s.name().summarised_metric() == Some(diagram.metric()))
            .map(|s| s.apply(&diagram).map(Statistic::from))
            .collect::<Result<Vec<_>, _>>()?;
        if self.requests(diagram.metric()) {
            statistics.push(diagram.into());
        }
        statistics.extend(summaries);
        Ok(())
    }
}

/// Resolves a probability threshold through the climatology of the pool's
/// first left feature.
fn resolve_threshold(
    pool: &Pool<(f64, f64)>,
    threshold: &Threshold,
) -> Result<Threshold, MetadataError> {
    if !threshold.is_probability() {
        return Ok(threshold.clone());
    }
    let pool_id = pool.metadata().pool_id();
    let climatology = pool
        .climatology()
        .ok_or_else(|| MetadataError::InvalidThreshold {
            reason: format!("pool {pool_id} has no climatology to resolve {threshold}"),
        })?;
    let feature = pool
        .metadata()
        .feature_group()
        .and_then(|group| group.left_features().next())
        .ok_or_else(|| MetadataError::InvalidThreshold {
            reason: format!("pool {pool_id} has no feature to resolve {threshold}"),
        })?;
    slicer::value_threshold_from_climatology(climatology, feature, threshold)
}

/// Evaluates every pool in parallel, in input order.
///
/// Without a seed in the plan a base seed is drawn from the OS and logged so
/// the run can be repeated.
#[tracing::instrument(skip_all, fields(pools = pools.len()))]
pub fn evaluate_pools(pools: &[PoolData], plan: &EvaluationPlan) -> Result<Vec<PoolStatistics>> {
    let seed = plan.seed().unwrap_or_else(rand::random);
    info!(seed, metrics = plan.metrics().len(), "evaluating pools");

    let results = pools
        .par_iter()
        .enumerate()
        .map(|(index, pool)| -> Result<PoolStatistics> {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(index as u64));
            let pool_id = pool.metadata().pool_id();
            let statistics = plan
                .evaluate(pool, &mut rng)
                .with_context(|| format!("failed to evaluate pool {pool_id}"))?;
            debug!(
                pool_id,
                samples = pool.len(),
                statistics = statistics.len(),
                "pool evaluated"
            );
            Ok(PoolStatistics {
                pool_id,
                statistics,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!(pools = results.len(), "evaluation complete");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydroskill_datamodel::{
        Climatology, Evaluation, Feature, FeatureGroup, FeatureTuple, MeasurementUnit,
        PoolDescription, ThresholdOperator, ThresholdSide,
    };

    fn single_valued() -> Pool<(f64, f64)> {
        Pool::builder()
            .add_data([(12.0, 15.0), (3.0, 11.0), (14.0, 2.0), (1.0, 4.0)])
            .set_metadata(PoolMetadata::dimensionless())
            .build()
            .unwrap()
    }

    fn ensemble(baseline: bool) -> Pool<(f64, Ensemble)> {
        let mut builder = Pool::builder()
            .add_data([(2.0, Ensemble::new(&[1.0, 2.0, 3.0, 4.0]))])
            .set_metadata(PoolMetadata::dimensionless());
        if baseline {
            builder = builder
                .add_data_for_baseline([(2.0, Ensemble::new(&[3.0, 4.0, 5.0, 6.0]))])
                .set_metadata_for_baseline(
                    PoolMetadata::dimensionless().with_baseline_flag(true),
                );
        }
        builder.build().unwrap()
    }

    fn greater_than(value: f64) -> Threshold {
        Threshold::value(value, ThresholdOperator::Greater, ThresholdSide::Left).unwrap()
    }

    #[test]
    fn test_plan_dedupes_and_builds_collection() {
        let plan = EvaluationPlan::new(&[
            MetricName::ThreatScore,
            MetricName::ThreatScore,
            MetricName::RankHistogram,
        ])
        .unwrap();
        assert_eq!(
            plan.metrics(),
            &[MetricName::ThreatScore, MetricName::RankHistogram]
        );
        assert!(plan.collection.is_some());
        assert!(plan.summaries.is_empty());
    }

    #[test]
    fn test_plan_rejects_empty_summary_statistics() {
        let plan = EvaluationPlan::new(&[MetricName::TimeToPeakErrorStatistic]).unwrap();
        assert_eq!(plan.summaries.len(), 1);
        assert!(plan.with_summary_statistics(&[]).is_err());
    }

    #[test]
    fn test_single_valued_scores_per_threshold() {
        let plan = EvaluationPlan::new(&[MetricName::ThreatScore, MetricName::FrequencyBias])
            .unwrap()
            .with_thresholds([greater_than(10.0), greater_than(0.0)]);
        let mut rng = StdRng::seed_from_u64(0);
        let statistics = plan
            .evaluate(&single_valued().into(), &mut rng)
            .unwrap();
        assert_eq!(statistics.len(), 4);
        assert_eq!(statistics[0].metric(), MetricName::ThreatScore);
        assert_eq!(statistics[1].metric(), MetricName::FrequencyBias);
        assert_eq!(
            statistics[2].metadata().thresholds().unwrap().event(),
            &greater_than(0.0)
        );
    }

    #[test]
    fn test_single_valued_without_thresholds_is_empty() {
        let plan = EvaluationPlan::new(&[MetricName::ThreatScore]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(
            plan.evaluate(&single_valued().into(), &mut rng)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_probability_threshold_resolved_from_climatology() {
        let gauge = Feature::new("DRRC2");
        let metadata = PoolMetadata::new(
            Evaluation::new(MeasurementUnit::dimensionless()),
            PoolDescription::new(7).with_feature_group(FeatureGroup::single(FeatureTuple::new(
                gauge.clone(),
                gauge.clone(),
            ))),
        );
        let climatology = Climatology::builder(MeasurementUnit::dimensionless())
            .add(gauge, [0.0, 10.0, 20.0, 30.0, 40.0])
            .build();
        let pool = Pool::builder()
            .add_data([(35.0, 25.0), (5.0, 15.0)])
            .set_metadata(metadata)
            .set_climatology(climatology)
            .build()
            .unwrap();
        let median = Threshold::probability(0.5, ThresholdOperator::Greater, ThresholdSide::Left)
            .unwrap();

        let resolved = resolve_threshold(&pool, &median).unwrap();
        assert_eq!(resolved, greater_than(20.0));
    }

    #[test]
    fn test_probability_threshold_without_climatology_fails() {
        let plan = EvaluationPlan::new(&[MetricName::ThreatScore])
            .unwrap()
            .with_thresholds([Threshold::probability(
                0.5,
                ThresholdOperator::Greater,
                ThresholdSide::Left,
            )
            .unwrap()]);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            plan.evaluate(&single_valued().into(), &mut rng),
            Err(MetricError::DataModel(MetadataError::InvalidThreshold { .. }))
        ));
    }

    #[test]
    fn test_skill_score_skipped_without_baseline() {
        let plan = EvaluationPlan::new(&[
            MetricName::ContinuousRankedProbabilityScore,
            MetricName::ContinuousRankedProbabilitySkillScore,
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let without = plan.evaluate(&ensemble(false).into(), &mut rng).unwrap();
        assert_eq!(without.len(), 1);

        let with = plan.evaluate(&ensemble(true).into(), &mut rng).unwrap();
        assert_eq!(with.len(), 2);
        assert_eq!(
            with[1].metric(),
            MetricName::ContinuousRankedProbabilitySkillScore
        );
    }

    #[test]
    fn test_dichotomous_metrics_ignored_for_ensembles() {
        let plan = EvaluationPlan::new(&[MetricName::ThreatScore, MetricName::RankHistogram])
            .unwrap()
            .with_thresholds([greater_than(1.0)]);
        let mut rng = StdRng::seed_from_u64(0);
        let statistics = plan.evaluate(&ensemble(false).into(), &mut rng).unwrap();
        assert_eq!(statistics.len(), 1);
        assert_eq!(statistics[0].metric(), MetricName::RankHistogram);
    }
}
