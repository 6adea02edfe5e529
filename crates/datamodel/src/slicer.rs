//! Filtering, transforming and grouping of pools.
//!
//! Every function returns a new pool; the input is never modified. Functions
//! that act on samples act on the baseline in the same way and keep the
//! climatology.

use std::collections::BTreeMap;

use hydroskill_stats::quantile_type7;
use tracing::debug;

use crate::climatology::Climatology;
use crate::ensemble::Ensemble;
use crate::error::MetadataError;
use crate::feature::Feature;
use crate::pool::Pool;
use crate::threshold::{OneOrTwoThresholds, Threshold, ThresholdValue};

/// Keeps the samples for which `keep` returns `true`.
pub fn filter<T: Clone>(pool: &Pool<T>, keep: impl Fn(&T) -> bool) -> Pool<T> {
    filter_map(pool, |sample| keep(sample).then(|| sample.clone()))
}

/// Maps every sample through `f`.
pub fn transform<T, U>(pool: &Pool<T>, f: impl Fn(&T) -> U) -> Pool<U> {
    filter_map(pool, |sample| Some(f(sample)))
}

/// Maps every sample through `f`, dropping those for which it returns `None`.
pub fn filter_map<T, U>(pool: &Pool<T>, f: impl Fn(&T) -> Option<U>) -> Pool<U> {
    let samples: Vec<U> = pool.samples().iter().filter_map(&f).collect();
    let baseline = pool
        .baseline_samples()
        .zip(pool.baseline_metadata())
        .map(|(samples, metadata)| {
            let samples: Vec<U> = samples.iter().filter_map(&f).collect();
            (samples, metadata.clone())
        });
    Pool::from_parts(
        samples,
        pool.metadata().clone(),
        baseline,
        pool.climatology_handle(),
    )
}

/// Drops pairs where either side is not finite.
pub fn filter_finite_pairs(pool: &Pool<(f64, f64)>) -> Pool<(f64, f64)> {
    filter(pool, |(left, right)| left.is_finite() && right.is_finite())
}

/// Drops non-finite ensemble members, then drops pairs whose observation is
/// not finite or whose ensemble has no members left.
pub fn filter_finite_ensemble_members(pool: &Pool<(f64, Ensemble)>) -> Pool<(f64, Ensemble)> {
    filter_map(pool, |(observed, ensemble)| {
        if !observed.is_finite() {
            return None;
        }
        let finite = ensemble.finite_only();
        (finite.size() > 0).then_some((*observed, finite))
    })
}

/// Converts real-valued pairs into (observed, predicted) event occurrences.
///
/// Pairs with a non-finite side are dropped first. The threshold must hold a
/// real value; resolve probability thresholds with
/// [`value_threshold_from_climatology`] before calling this. The returned
/// pool's metadata carries the threshold.
pub fn to_dichotomous(
    pool: &Pool<(f64, f64)>,
    threshold: &Threshold,
) -> Result<Pool<(bool, bool)>, MetadataError> {
    if threshold.is_probability() {
        return Err(MetadataError::InvalidThreshold {
            reason: format!("probability threshold {threshold} must be resolved to a value first"),
        });
    }

    let convert = |(left, right): &(f64, f64)| {
        (left.is_finite() && right.is_finite())
            .then(|| (threshold.test(*left), threshold.test(*right)))
    };
    let dichotomous = filter_map(pool, convert);

    let thresholds = OneOrTwoThresholds::one(threshold.clone());
    let (samples, metadata, baseline, climatology) = dichotomous.into_parts();
    let baseline = baseline.map(|(samples, metadata)| {
        let metadata = metadata.with_thresholds(thresholds.clone());
        (samples, metadata)
    });
    Ok(Pool::from_parts(
        samples,
        metadata.with_thresholds(thresholds),
        baseline,
        climatology,
    ))
}

/// Groups ensemble pairs by member count, ascending.
pub fn group_by_member_count(samples: &[(f64, Ensemble)]) -> BTreeMap<usize, Vec<&(f64, Ensemble)>> {
    let mut groups: BTreeMap<usize, Vec<&(f64, Ensemble)>> = BTreeMap::new();
    for pair in samples {
        groups.entry(pair.1.size()).or_default().push(pair);
    }
    groups
}

/// Resolves a probability threshold to a real value using the type 7
/// quantile of the feature's climatology. Real-valued thresholds are
/// returned unchanged.
pub fn value_threshold_from_climatology(
    climatology: &Climatology,
    feature: &Feature,
    threshold: &Threshold,
) -> Result<Threshold, MetadataError> {
    let probability = match threshold.threshold_value() {
        ThresholdValue::Value(_) => return Ok(threshold.clone()),
        ThresholdValue::Probability(p) => p,
    };

    let values = climatology.get(feature).unwrap_or(&[]);
    let Some(bound) = quantile_type7(values, probability) else {
        return Err(MetadataError::InvalidThreshold {
            reason: format!("no climatology for feature {feature} to resolve {threshold}"),
        });
    };

    debug!(%feature, probability, bound, "resolved probability threshold");
    threshold.resolved(bound)
}
