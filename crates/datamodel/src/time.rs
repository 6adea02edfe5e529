//! Time windows, time scales and time series.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::error::MetadataError;
use crate::feature::Feature;
use crate::units::MeasurementUnit;

/// Serializes durations as milliseconds: an integer when the duration is a
/// whole number of milliseconds, otherwise a fraction.
pub(crate) mod duration_millis {
    use chrono::TimeDelta;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        let whole = value.num_milliseconds();
        let remainder = value.subsec_nanos() % 1_000_000;
        if remainder == 0 {
            serializer.serialize_i64(whole)
        } else {
            serializer.serialize_f64(whole as f64 + f64::from(remainder) / 1e6)
        }
    }

    pub mod option {
        use chrono::TimeDelta;
        use serde::Serializer;

        pub fn serialize<S: Serializer>(
            value: &Option<TimeDelta>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(delta) => super::serialize(delta, serializer),
                None => serializer.serialize_none(),
            }
        }
    }
}

/// Bounds on reference times, valid times and lead durations.
///
/// Each pair is inclusive and ordered (earliest <= latest). An unbounded
/// window uses the extreme representable values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TimeWindow {
    earliest_reference_time: DateTime<Utc>,
    latest_reference_time: DateTime<Utc>,
    earliest_valid_time: DateTime<Utc>,
    latest_valid_time: DateTime<Utc>,
    #[serde(with = "duration_millis")]
    earliest_lead: TimeDelta,
    #[serde(with = "duration_millis")]
    latest_lead: TimeDelta,
}

impl TimeWindow {
    /// A window that admits every time and lead duration.
    pub fn unbounded() -> Self {
        Self {
            earliest_reference_time: DateTime::<Utc>::MIN_UTC,
            latest_reference_time: DateTime::<Utc>::MAX_UTC,
            earliest_valid_time: DateTime::<Utc>::MIN_UTC,
            latest_valid_time: DateTime::<Utc>::MAX_UTC,
            earliest_lead: TimeDelta::MIN,
            latest_lead: TimeDelta::MAX,
        }
    }

    /// Bounds the reference (issue) times.
    pub fn with_reference_times(
        mut self,
        earliest: DateTime<Utc>,
        latest: DateTime<Utc>,
    ) -> Result<Self, MetadataError> {
        check_order("reference time", &earliest, &latest)?;
        self.earliest_reference_time = earliest;
        self.latest_reference_time = latest;
        Ok(self)
    }

    /// Bounds the valid times.
    pub fn with_valid_times(
        mut self,
        earliest: DateTime<Utc>,
        latest: DateTime<Utc>,
    ) -> Result<Self, MetadataError> {
        check_order("valid time", &earliest, &latest)?;
        self.earliest_valid_time = earliest;
        self.latest_valid_time = latest;
        Ok(self)
    }

    /// Bounds the lead durations.
    pub fn with_lead_durations(
        mut self,
        earliest: TimeDelta,
        latest: TimeDelta,
    ) -> Result<Self, MetadataError> {
        if earliest > latest {
            return Err(MetadataError::InvalidTimeWindow {
                facet: "lead duration",
                earliest: format!("{}ms", earliest.num_milliseconds()),
                latest: format!("{}ms", latest.num_milliseconds()),
            });
        }
        self.earliest_lead = earliest;
        self.latest_lead = latest;
        Ok(self)
    }

    pub fn earliest_reference_time(&self) -> DateTime<Utc> {
        self.earliest_reference_time
    }

    pub fn latest_reference_time(&self) -> DateTime<Utc> {
        self.latest_reference_time
    }

    pub fn earliest_valid_time(&self) -> DateTime<Utc> {
        self.earliest_valid_time
    }

    pub fn latest_valid_time(&self) -> DateTime<Utc> {
        self.latest_valid_time
    }

    pub fn earliest_lead(&self) -> TimeDelta {
        self.earliest_lead
    }

    pub fn latest_lead(&self) -> TimeDelta {
        self.latest_lead
    }
}

fn check_order(
    facet: &'static str,
    earliest: &DateTime<Utc>,
    latest: &DateTime<Utc>,
) -> Result<(), MetadataError> {
    if earliest > latest {
        return Err(MetadataError::InvalidTimeWindow {
            facet,
            earliest: earliest.to_rfc3339(),
            latest: latest.to_rfc3339(),
        });
    }
    Ok(())
}

/// How values were aggregated over a time scale period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeScaleFunction {
    Mean,
    Total,
    Minimum,
    Maximum,
    Unknown,
}

/// The period and aggregation function of a value, e.g. a 24-hour mean.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TimeScale {
    #[serde(with = "duration_millis")]
    period: TimeDelta,
    function: TimeScaleFunction,
}

impl TimeScale {
    pub fn new(period: TimeDelta, function: TimeScaleFunction) -> Result<Self, MetadataError> {
        if period <= TimeDelta::zero() {
            return Err(MetadataError::InvalidTimeScale {
                millis: period.num_milliseconds(),
            });
        }
        Ok(Self { period, function })
    }

    pub fn period(&self) -> TimeDelta {
        self.period
    }

    pub fn function(&self) -> TimeScaleFunction {
        self.function
    }

    /// Periods of one minute or less are instantaneous.
    pub fn is_instantaneous(&self) -> bool {
        self.period.num_seconds() <= 60
    }
}

/// Kinds of reference time a forecast can carry. Ordering determines which
/// reference time counts as "first".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferenceTimeType {
    T0,
    AnalysisStartTime,
    IssuedTime,
    LatestObservation,
    Unknown,
}

impl fmt::Display for ReferenceTimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReferenceTimeType::T0 => "T0",
            ReferenceTimeType::AnalysisStartTime => "ANALYSIS START TIME",
            ReferenceTimeType::IssuedTime => "ISSUED TIME",
            ReferenceTimeType::LatestObservation => "LATEST OBSERVATION",
            ReferenceTimeType::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// One value at one valid time.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<T> {
    pub valid_time: DateTime<Utc>,
    pub value: T,
}

impl<T> Event<T> {
    pub fn new(valid_time: DateTime<Utc>, value: T) -> Self {
        Self { valid_time, value }
    }
}

/// A time-ordered sequence of events with zero or more reference times.
///
/// Valid times are strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries<T> {
    reference_times: BTreeMap<ReferenceTimeType, DateTime<Utc>>,
    events: Vec<Event<T>>,
    time_scale: Option<TimeScale>,
    feature: Option<Feature>,
    unit: Option<MeasurementUnit>,
}

impl<T> TimeSeries<T> {
    pub fn builder() -> TimeSeriesBuilder<T> {
        TimeSeriesBuilder::default()
    }

    pub fn events(&self) -> &[Event<T>] {
        &self.events
    }

    pub fn reference_times(&self) -> &BTreeMap<ReferenceTimeType, DateTime<Utc>> {
        &self.reference_times
    }

    /// The reference time of the lowest-ordered [`ReferenceTimeType`].
    pub fn first_reference_time(&self) -> Option<DateTime<Utc>> {
        self.reference_times.values().next().copied()
    }

    pub fn time_scale(&self) -> Option<&TimeScale> {
        self.time_scale.as_ref()
    }

    pub fn feature(&self) -> Option<&Feature> {
        self.feature.as_ref()
    }

    pub fn unit(&self) -> Option<&MeasurementUnit> {
        self.unit.as_ref()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Accumulates events and reference times for a [`TimeSeries`].
#[derive(Debug)]
pub struct TimeSeriesBuilder<T> {
    reference_times: BTreeMap<ReferenceTimeType, DateTime<Utc>>,
    events: Vec<Event<T>>,
    time_scale: Option<TimeScale>,
    feature: Option<Feature>,
    unit: Option<MeasurementUnit>,
}

impl<T> Default for TimeSeriesBuilder<T> {
    fn default() -> Self {
        Self {
            reference_times: BTreeMap::new(),
            events: Vec::new(),
            time_scale: None,
            feature: None,
            unit: None,
        }
    }
}

impl<T> TimeSeriesBuilder<T> {
    pub fn reference_time(mut self, kind: ReferenceTimeType, time: DateTime<Utc>) -> Self {
        self.reference_times.insert(kind, time);
        self
    }

    pub fn event(mut self, valid_time: DateTime<Utc>, value: T) -> Self {
        self.events.push(Event::new(valid_time, value));
        self
    }

    pub fn events(mut self, events: impl IntoIterator<Item = Event<T>>) -> Self {
        self.events.extend(events);
        self
    }

    pub fn time_scale(mut self, time_scale: TimeScale) -> Self {
        self.time_scale = Some(time_scale);
        self
    }

    pub fn feature(mut self, feature: Feature) -> Self {
        self.feature = Some(feature);
        self
    }

    pub fn unit(mut self, unit: MeasurementUnit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Sorts the events by valid time and rejects duplicate valid times.
    pub fn build(mut self) -> Result<TimeSeries<T>, MetadataError> {
        self.events.sort_by_key(|e| e.valid_time);
        if let Some(pair) = self
            .events
            .windows(2)
            .find(|pair| pair[0].valid_time == pair[1].valid_time)
        {
            return Err(MetadataError::DuplicateValidTime {
                valid_time: pair[0].valid_time.to_rfc3339(),
            });
        }
        Ok(TimeSeries {
            reference_times: self.reference_times,
            events: self.events,
            time_scale: self.time_scale,
            feature: self.feature,
            unit: self.unit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(1985, 1, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_time_window_rejects_inverted_bounds() {
        let err = TimeWindow::unbounded()
            .with_valid_times(t(6), t(1))
            .unwrap_err();
        assert!(matches!(
            err,
            MetadataError::InvalidTimeWindow {
                facet: "valid time",
                ..
            }
        ));
    }

    #[test]
    fn test_time_window_leads() {
        let window = TimeWindow::unbounded()
            .with_lead_durations(TimeDelta::hours(1), TimeDelta::hours(6))
            .unwrap();
        assert_eq!(window.earliest_lead(), TimeDelta::hours(1));
        assert_eq!(window.latest_lead(), TimeDelta::hours(6));
        assert_eq!(window.earliest_valid_time(), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_time_scale_validation() {
        assert!(TimeScale::new(TimeDelta::zero(), TimeScaleFunction::Mean).is_err());
        let scale = TimeScale::new(TimeDelta::hours(24), TimeScaleFunction::Mean).unwrap();
        assert!(!scale.is_instantaneous());
        let instant = TimeScale::new(TimeDelta::seconds(1), TimeScaleFunction::Unknown).unwrap();
        assert!(instant.is_instantaneous());
    }

    #[test]
    fn test_series_sorted_on_build() {
        let series = TimeSeries::builder()
            .event(t(3), 3.0)
            .event(t(1), 1.0)
            .event(t(2), 2.0)
            .build()
            .unwrap();
        let values: Vec<f64> = series.events().iter().map(|e| e.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_series_rejects_duplicate_valid_time() {
        let err = TimeSeries::builder()
            .event(t(1), 1.0)
            .event(t(1), 2.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, MetadataError::DuplicateValidTime { .. }));
    }

    #[test]
    fn test_first_reference_time_follows_type_order() {
        let series = TimeSeries::<f64>::builder()
            .reference_time(ReferenceTimeType::IssuedTime, t(5))
            .reference_time(ReferenceTimeType::T0, t(0))
            .build()
            .unwrap();
        assert_eq!(series.first_reference_time(), Some(t(0)));
    }
}
