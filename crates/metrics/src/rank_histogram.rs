//! Rank histogram (Talagrand diagram).

use hydroskill_datamodel::{
    ComponentName, Diagram, DiagramComponent, Ensemble, MetricName, Pool, slicer,
};
use rand::Rng;
use tracing::debug;

use crate::RandomizedMetric;
use crate::error::MetricError;

/// Relative frequency of the observation falling in each of the `N + 1`
/// rank positions of an `N`-member ensemble.
///
/// Non-finite members and observations are dropped first. When member
/// counts then differ, only the largest group sharing one count is used
/// (the larger count wins a tie in group size). An observation tied with
/// one or more members takes a rank drawn uniformly from the tied
/// positions; observations below the smallest member or at or above the
/// largest take the first or last rank without a draw.
///
/// An empty pool gives a diagram whose components each hold one missing
/// value.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankHistogram;

impl RandomizedMetric<Pool<(f64, Ensemble)>> for RankHistogram {
    type Output = Diagram;

    fn name(&self) -> MetricName {
        MetricName::RankHistogram
    }

    #[tracing::instrument(skip_all, fields(samples = pool.len()))]
    fn apply(
        &self,
        pool: &Pool<(f64, Ensemble)>,
        rng: &mut impl Rng,
    ) -> Result<Diagram, MetricError> {
        let finite = slicer::filter_finite_ensemble_members(pool);
        let groups = slicer::group_by_member_count(finite.samples());

        let Some((members, pairs)) = groups
            .into_iter()
            .max_by_key(|(members, pairs)| (pairs.len(), *members))
        else {
            debug!("no usable pairs for rank histogram");
            return Ok(Diagram::new(
                MetricName::RankHistogram,
                vec![
                    DiagramComponent {
                        name: ComponentName::RankOrder,
                        values: vec![None],
                    },
                    DiagramComponent {
                        name: ComponentName::ObservedRelativeFrequency,
                        values: vec![None],
                    },
                ],
                pool.metadata().clone(),
            ));
        };
        if pairs.len() < finite.len() {
            debug!(
                members,
                used = pairs.len(),
                dropped = finite.len() - pairs.len(),
                "ensemble sizes differ, using the largest group"
            );
        }

        let mut counts = vec![0u64; members + 1];
        for (observed, ensemble) in &pairs {
            let rank = rank_position(*observed, &ensemble.sorted_members(), rng);
            counts[rank] += 1;
        }

        let total = pairs.len() as f64;
        let rank_order = (1..=members + 1).map(|rank| Some(rank as f64)).collect();
        let frequency = counts.iter().map(|&c| Some(c as f64 / total)).collect();
        Ok(Diagram::new(
            MetricName::RankHistogram,
            vec![
                DiagramComponent {
                    name: ComponentName::RankOrder,
                    values: rank_order,
                },
                DiagramComponent {
                    name: ComponentName::ObservedRelativeFrequency,
                    values: frequency,
                },
            ],
            pool.metadata().clone(),
        ))
    }
}

/// Zero-based rank of `observed` among ascending `sorted` members.
fn rank_position(observed: f64, sorted: &[f64], rng: &mut impl Rng) -> usize {
    let n = sorted.len();
    if observed < sorted[0] {
        return 0;
    }
    if observed > sorted[n - 1] {
        return n;
    }
    let below = sorted.partition_point(|&m| m < observed);
    let equal = sorted[below..].partition_point(|&m| m == observed);
    if equal == 0 {
        below
    } else {
        rng.random_range(below..=below + equal)
    }
}
