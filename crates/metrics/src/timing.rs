//! Timing errors of forecast peaks.

use chrono::{DateTime, TimeDelta, Utc};
use hydroskill_datamodel::{DurationDiagram, DurationPair, Event, MetricName, Pool, TimeSeries};
use rand::Rng;
use tracing::debug;

use crate::RandomizedMetric;
use crate::error::MetricError;

/// Time of the largest finite value, ties drawn uniformly at random.
fn peak_time<T>(
    events: &[Event<T>],
    value: impl Fn(&T) -> f64,
    rng: &mut impl Rng,
) -> Option<DateTime<Utc>> {
    let mut peak = f64::NEG_INFINITY;
    let mut times: Vec<DateTime<Utc>> = Vec::new();
    for event in events {
        let v = value(&event.value);
        if !v.is_finite() {
            continue;
        }
        if v > peak {
            peak = v;
            times.clear();
            times.push(event.valid_time);
        } else if v == peak {
            times.push(event.valid_time);
        }
    }
    match times.len() {
        0 => None,
        1 => Some(times[0]),
        n => Some(times[rng.random_range(0..n)]),
    }
}

/// Observed and predicted peak times of one series. The observed peak is
/// drawn first so that seeded runs are reproducible.
fn peaks(
    series: &TimeSeries<(f64, f64)>,
    rng: &mut impl Rng,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let observed = peak_time(series.events(), |(left, _)| *left, rng)?;
    let predicted = peak_time(series.events(), |(_, right)| *right, rng)?;
    Some((observed, predicted))
}

fn reference_time(
    metric: MetricName,
    series: &TimeSeries<(f64, f64)>,
) -> Result<DateTime<Utc>, MetricError> {
    series
        .first_reference_time()
        .ok_or(MetricError::MissingReferenceTime { metric })
}

/// Predicted peak time minus observed peak time, per time series.
///
/// Negative when the predicted peak comes first. Series without a finite
/// value on either side are skipped. Each error is keyed by the series'
/// first reference time.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeToPeakError;

impl RandomizedMetric<Pool<TimeSeries<(f64, f64)>>> for TimeToPeakError {
    type Output = DurationDiagram;

    fn name(&self) -> MetricName {
        MetricName::TimeToPeakError
    }

    #[tracing::instrument(skip_all, fields(series = pool.len()))]
    fn apply(
        &self,
        pool: &Pool<TimeSeries<(f64, f64)>>,
        rng: &mut impl Rng,
    ) -> Result<DurationDiagram, MetricError> {
        let metric = MetricName::TimeToPeakError;
        let mut pairs = Vec::with_capacity(pool.len());
        for series in pool.samples() {
            let Some((observed, predicted)) = peaks(series, rng) else {
                debug!("skipping time series without finite values");
                continue;
            };
            pairs.push(DurationPair {
                reference_time: reference_time(metric, series)?,
                duration: predicted - observed,
            });
        }
        Ok(DurationDiagram::new(metric, pairs, pool.metadata().clone()))
    }
}

/// Time-to-peak error divided by the time from the reference time to the
/// observed peak.
///
/// The ratio is stored as a duration in which one second stands for 1.0, so
/// an error of half the lead time to the peak is 0.5 s. Ratios are kept to
/// nanosecond resolution (nine decimal places) through the summary
/// statistics and serialised output. Series whose observed peak falls on the
/// reference time are left out.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeToPeakRelativeError;

impl RandomizedMetric<Pool<TimeSeries<(f64, f64)>>> for TimeToPeakRelativeError {
    type Output = DurationDiagram;

    fn name(&self) -> MetricName {
        MetricName::TimeToPeakRelativeError
    }

    #[tracing::instrument(skip_all, fields(series = pool.len()))]
    fn apply(
        &self,
        pool: &Pool<TimeSeries<(f64, f64)>>,
        rng: &mut impl Rng,
    ) -> Result<DurationDiagram, MetricError> {
        let metric = MetricName::TimeToPeakRelativeError;
        let mut pairs = Vec::with_capacity(pool.len());
        for series in pool.samples() {
            let Some((observed, predicted)) = peaks(series, rng) else {
                debug!("skipping time series without finite values");
                continue;
            };
            let reference = reference_time(metric, series)?;
            let horizon = (observed - reference).num_milliseconds();
            if horizon == 0 {
                debug!(%reference, "observed peak at reference time, relative error undefined");
                continue;
            }
            let ratio = (predicted - observed).num_milliseconds() as f64 / horizon as f64;
            pairs.push(DurationPair {
                reference_time: reference,
                duration: ratio_to_duration(ratio),
            });
        }
        Ok(DurationDiagram::new(metric, pairs, pool.metadata().clone()))
    }
}

fn ratio_to_duration(ratio: f64) -> TimeDelta {
    TimeDelta::nanoseconds((ratio * 1e9).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hydroskill_datamodel::{PoolMetadata, ReferenceTimeType};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn t(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(1985, 1, 1, hour, 0, 0).unwrap()
    }

    fn series(reference: Option<u32>, events: &[(u32, f64, f64)]) -> TimeSeries<(f64, f64)> {
        let mut builder = TimeSeries::builder();
        if let Some(hour) = reference {
            builder = builder.reference_time(ReferenceTimeType::T0, t(hour));
        }
        for &(hour, left, right) in events {
            builder = builder.event(t(hour), (left, right));
        }
        builder.build().unwrap()
    }

    fn pool(series: Vec<TimeSeries<(f64, f64)>>) -> Pool<TimeSeries<(f64, f64)>> {
        Pool::builder()
            .add_data(series)
            .set_metadata(PoolMetadata::dimensionless())
            .build()
            .unwrap()
    }

    #[test]
    fn test_peak_time_without_ties_ignores_rng() {
        let events = vec![Event::new(t(1), 1.0), Event::new(t(2), 5.0), Event::new(t(3), 2.0)];
        let mut rng = StdRng::seed_from_u64(9);
        assert_eq!(peak_time(&events, |v| *v, &mut rng), Some(t(2)));
    }

    #[test]
    fn test_peak_time_skips_non_finite() {
        let events = vec![Event::new(t(1), f64::NAN), Event::new(t(2), f64::INFINITY)];
        let mut rng = StdRng::seed_from_u64(9);
        assert_eq!(peak_time(&events, |v| *v, &mut rng), None);
    }

    #[test]
    fn test_peak_ties_resolved_among_tied_times() {
        let events = vec![Event::new(t(1), 5.0), Event::new(t(2), 1.0), Event::new(t(3), 5.0)];
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let peak = peak_time(&events, |v| *v, &mut rng).unwrap();
            assert!(peak == t(1) || peak == t(3));
        }
    }

    #[test]
    fn test_missing_reference_time_fails() {
        let pool = pool(vec![series(None, &[(1, 1.0, 2.0)])]);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            TimeToPeakError.apply(&pool, &mut rng),
            Err(MetricError::MissingReferenceTime { .. })
        ));
    }

    #[test]
    fn test_relative_error_excludes_zero_horizon() {
        // Observed peak at the reference time in the first series.
        let pool = pool(vec![
            series(Some(0), &[(0, 9.0, 1.0), (2, 1.0, 9.0)]),
            series(Some(0), &[(4, 9.0, 1.0), (6, 1.0, 9.0)]),
        ]);
        let mut rng = StdRng::seed_from_u64(0);
        let diagram = TimeToPeakRelativeError.apply(&pool, &mut rng).unwrap();
        assert_eq!(diagram.pairs().len(), 1);
        // Two hours late against a four hour horizon.
        assert_eq!(diagram.pairs()[0].duration, TimeDelta::milliseconds(500));
    }

    #[test]
    fn test_ratio_encoding() {
        assert_eq!(ratio_to_duration(1.0), TimeDelta::seconds(1));
        assert_eq!(ratio_to_duration(-0.25), TimeDelta::milliseconds(-250));
    }
}
