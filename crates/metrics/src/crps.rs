//! Continuous ranked probability score and its skill score.
//!
//! The score is computed exactly from the ensemble members with the
//! decomposition of Hersbach (2000), Weather and Forecasting 15, 559-570.
//! The decomposition assumes one member count, so pairs are grouped by
//! member count and the group scores combined with weights proportional to
//! group size.
//!
//! At the interior intervals both bounds are inclusive: an observation
//! equal to the upper member counts entirely as exceeding the interval, one
//! equal to the lower member counts entirely as below it. The published
//! formulation leaves that boundary ambiguous.

use hydroskill_datamodel::{DoubleScore, Ensemble, MetricName, Pool, slicer};
use tracing::debug;

use crate::error::MetricError;
use crate::{Metric, finite_or_missing};

/// Alpha and beta accumulators for one member count.
///
/// Position `i` in `0..=N` weights its terms with `p = i / N`. Position 0
/// only collects beta (observation below every member) and position `N`
/// only collects alpha (observation above every member).
#[derive(Debug, Clone, PartialEq)]
pub struct HersbachDecomposition {
    alpha: Vec<f64>,
    beta: Vec<f64>,
    pairs: usize,
}

impl HersbachDecomposition {
    pub fn new(members: usize) -> Self {
        Self {
            alpha: vec![0.0; members + 1],
            beta: vec![0.0; members + 1],
            pairs: 0,
        }
    }

    pub fn members(&self) -> usize {
        self.alpha.len() - 1
    }

    pub fn pairs(&self) -> usize {
        self.pairs
    }

    pub fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    pub fn beta(&self) -> &[f64] {
        &self.beta
    }

    /// Adds one pair. `sorted` must be ascending with
    /// [`HersbachDecomposition::members`] finite values.
    pub fn accumulate(&mut self, observed: f64, sorted: &[f64]) {
        let n = sorted.len();
        debug_assert_eq!(n, self.members());
        if n == 0 {
            return;
        }

        if observed < sorted[0] {
            self.beta[0] += sorted[0] - observed;
        }
        if observed > sorted[n - 1] {
            self.alpha[n] += observed - sorted[n - 1];
        }

        for i in 1..n {
            let lower = sorted[i - 1];
            let upper = sorted[i];
            if observed >= upper {
                self.alpha[i] += upper - lower;
            } else if observed <= lower {
                self.beta[i] += upper - lower;
            } else {
                self.alpha[i] += observed - lower;
                self.beta[i] += upper - observed;
            }
        }
        self.pairs += 1;
    }

    /// Mean CRPS over the accumulated pairs; `None` when there are none.
    pub fn crps(&self) -> Option<f64> {
        if self.pairs == 0 {
            return None;
        }
        let n = self.members() as f64;
        let total: f64 = self
            .alpha
            .iter()
            .zip(&self.beta)
            .enumerate()
            .map(|(i, (alpha, beta))| {
                let p = i as f64 / n;
                alpha * p * p + beta * (1.0 - p) * (1.0 - p)
            })
            .sum();
        Some(total / self.pairs as f64)
    }
}

/// Mean CRPS of ensemble pairs.
///
/// Non-finite members are dropped, then pairs with a non-finite observation
/// or no members. Returns `None` when nothing is left.
pub fn crps(samples: &[(f64, Ensemble)]) -> Option<f64> {
    let finite: Vec<(f64, Ensemble)> = samples
        .iter()
        .filter(|(observed, _)| observed.is_finite())
        .map(|(observed, ensemble)| (*observed, ensemble.finite_only()))
        .filter(|(_, ensemble)| ensemble.size() > 0)
        .collect();

    let mut weighted = 0.0;
    let mut total_pairs = 0usize;
    for (members, group) in slicer::group_by_member_count(&finite) {
        let mut decomposition = HersbachDecomposition::new(members);
        for (observed, ensemble) in group {
            decomposition.accumulate(*observed, &ensemble.sorted_members());
        }
        if let Some(score) = decomposition.crps() {
            debug!(members, pairs = decomposition.pairs(), score, "crps for member group");
            weighted += score * decomposition.pairs() as f64;
            total_pairs += decomposition.pairs();
        }
    }

    (total_pairs > 0).then(|| weighted / total_pairs as f64)
}

/// Continuous ranked probability score of the pool's main samples.
///
/// Perfect score 0. Missing for a pool without usable pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContinuousRankedProbabilityScore;

impl Metric<Pool<(f64, Ensemble)>> for ContinuousRankedProbabilityScore {
    type Output = DoubleScore;

    fn name(&self) -> MetricName {
        MetricName::ContinuousRankedProbabilityScore
    }

    #[tracing::instrument(skip_all, fields(samples = pool.len()))]
    fn apply(&self, pool: &Pool<(f64, Ensemble)>) -> Result<DoubleScore, MetricError> {
        let score = crps(pool.samples()).and_then(finite_or_missing);
        Ok(DoubleScore::main(
            MetricName::ContinuousRankedProbabilityScore,
            score,
            pool.metadata().clone(),
        ))
    }
}

/// `1 - CRPS(main) / CRPS(baseline)`.
///
/// Perfect score 1; positive values beat the baseline. Fails without a
/// baseline. Missing when either score is missing or the baseline scores 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContinuousRankedProbabilitySkillScore;

impl Metric<Pool<(f64, Ensemble)>> for ContinuousRankedProbabilitySkillScore {
    type Output = DoubleScore;

    fn name(&self) -> MetricName {
        MetricName::ContinuousRankedProbabilitySkillScore
    }

    #[tracing::instrument(skip_all, fields(samples = pool.len()))]
    fn apply(&self, pool: &Pool<(f64, Ensemble)>) -> Result<DoubleScore, MetricError> {
        let metric = MetricName::ContinuousRankedProbabilitySkillScore;
        let baseline = pool
            .baseline_samples()
            .ok_or(MetricError::MissingBaseline { metric })?;

        let main_score = crps(pool.samples());
        let baseline_score = crps(baseline);
        debug!(
            main_pairs = pool.len(),
            baseline_pairs = baseline.len(),
            main_score,
            baseline_score,
            "crpss inputs"
        );

        let skill = match (main_score, baseline_score) {
            (Some(main), Some(base)) if base != 0.0 => finite_or_missing(1.0 - main / base),
            _ => None,
        };
        Ok(DoubleScore::main(metric, skill, pool.metadata().clone()))
    }
}
