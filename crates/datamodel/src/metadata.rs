//! Descriptions of an evaluation and of the pools within it.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::feature::FeatureGroup;
use crate::threshold::OneOrTwoThresholds;
use crate::time::{TimeScale, TimeWindow};
use crate::units::MeasurementUnit;

/// Facts shared by every pool of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Evaluation {
    measurement_unit: MeasurementUnit,
    #[serde(skip_serializing_if = "Option::is_none")]
    left_data_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    right_data_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    baseline_data_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    variable_name: Option<String>,
}

impl Evaluation {
    pub fn new(measurement_unit: MeasurementUnit) -> Self {
        Self {
            measurement_unit,
            left_data_name: None,
            right_data_name: None,
            baseline_data_name: None,
            variable_name: None,
        }
    }

    pub fn with_left_data_name(mut self, name: impl Into<String>) -> Self {
        self.left_data_name = Some(name.into());
        self
    }

    pub fn with_right_data_name(mut self, name: impl Into<String>) -> Self {
        self.right_data_name = Some(name.into());
        self
    }

    pub fn with_baseline_data_name(mut self, name: impl Into<String>) -> Self {
        self.baseline_data_name = Some(name.into());
        self
    }

    pub fn with_variable_name(mut self, name: impl Into<String>) -> Self {
        self.variable_name = Some(name.into());
        self
    }

    pub fn measurement_unit(&self) -> &MeasurementUnit {
        &self.measurement_unit
    }

    pub fn left_data_name(&self) -> Option<&str> {
        self.left_data_name.as_deref()
    }

    pub fn right_data_name(&self) -> Option<&str> {
        self.right_data_name.as_deref()
    }

    pub fn baseline_data_name(&self) -> Option<&str> {
        self.baseline_data_name.as_deref()
    }

    pub fn variable_name(&self) -> Option<&str> {
        self.variable_name.as_deref()
    }
}

/// Facts specific to one pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PoolDescription {
    pool_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_window: Option<TimeWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_scale: Option<TimeScale>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thresholds: Option<OneOrTwoThresholds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    feature_group: Option<FeatureGroup>,
    is_baseline_pool: bool,
}

impl PoolDescription {
    pub fn new(pool_id: u64) -> Self {
        Self {
            pool_id,
            ..Self::default()
        }
    }

    pub fn with_time_window(mut self, time_window: TimeWindow) -> Self {
        self.time_window = Some(time_window);
        self
    }

    pub fn with_time_scale(mut self, time_scale: TimeScale) -> Self {
        self.time_scale = Some(time_scale);
        self
    }

    pub fn with_thresholds(mut self, thresholds: OneOrTwoThresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    pub fn with_feature_group(mut self, feature_group: FeatureGroup) -> Self {
        self.feature_group = Some(feature_group);
        self
    }

    pub fn with_baseline_flag(mut self, is_baseline_pool: bool) -> Self {
        self.is_baseline_pool = is_baseline_pool;
        self
    }
}

/// Immutable description of a pool: the shared [`Evaluation`] plus the
/// pool-specific [`PoolDescription`].
///
/// The `with_*` methods derive a new instance that differs in exactly one
/// facet; the receiver is never modified. The evaluation is reference
/// counted, so deriving is cheap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolMetadata {
    evaluation: Arc<Evaluation>,
    pool: PoolDescription,
}

impl PoolMetadata {
    pub fn new(evaluation: impl Into<Arc<Evaluation>>, pool: PoolDescription) -> Self {
        Self {
            evaluation: evaluation.into(),
            pool,
        }
    }

    /// Dimensionless metadata with a default pool description.
    pub fn dimensionless() -> Self {
        Self::new(
            Evaluation::new(MeasurementUnit::dimensionless()),
            PoolDescription::default(),
        )
    }

    pub fn with_time_window(&self, time_window: TimeWindow) -> Self {
        self.derive(|pool| pool.time_window = Some(time_window))
    }

    pub fn with_time_scale(&self, time_scale: TimeScale) -> Self {
        self.derive(|pool| pool.time_scale = Some(time_scale))
    }

    pub fn with_thresholds(&self, thresholds: OneOrTwoThresholds) -> Self {
        self.derive(|pool| pool.thresholds = Some(thresholds))
    }

    pub fn with_feature_group(&self, feature_group: FeatureGroup) -> Self {
        self.derive(|pool| pool.feature_group = Some(feature_group))
    }

    pub fn with_time_window_and_thresholds(
        &self,
        time_window: TimeWindow,
        thresholds: OneOrTwoThresholds,
    ) -> Self {
        self.derive(|pool| {
            pool.time_window = Some(time_window);
            pool.thresholds = Some(thresholds);
        })
    }

    pub fn with_baseline_flag(&self, is_baseline_pool: bool) -> Self {
        self.derive(|pool| pool.is_baseline_pool = is_baseline_pool)
    }

    fn derive(&self, apply: impl FnOnce(&mut PoolDescription)) -> Self {
        let mut pool = self.pool.clone();
        apply(&mut pool);
        Self {
            evaluation: Arc::clone(&self.evaluation),
            pool,
        }
    }

    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }

    pub fn measurement_unit(&self) -> &MeasurementUnit {
        self.evaluation.measurement_unit()
    }

    pub fn pool_id(&self) -> u64 {
        self.pool.pool_id
    }

    pub fn time_window(&self) -> Option<&TimeWindow> {
        self.pool.time_window.as_ref()
    }

    pub fn time_scale(&self) -> Option<&TimeScale> {
        self.pool.time_scale.as_ref()
    }

    pub fn thresholds(&self) -> Option<&OneOrTwoThresholds> {
        self.pool.thresholds.as_ref()
    }

    pub fn feature_group(&self) -> Option<&FeatureGroup> {
        self.pool.feature_group.as_ref()
    }

    pub fn is_baseline_pool(&self) -> bool {
        self.pool.is_baseline_pool
    }
}

impl Default for PoolMetadata {
    fn default() -> Self {
        Self::dimensionless()
    }
}

impl fmt::Display for PoolMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool {} [{}", self.pool_id(), self.measurement_unit())?;
        if let Some(group) = self.feature_group().and_then(FeatureGroup::name) {
            write!(f, ", features: {group}")?;
        }
        if let Some(thresholds) = self.thresholds() {
            write!(f, ", threshold: {}", thresholds.event())?;
        }
        if self.is_baseline_pool() {
            f.write_str(", baseline")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{Feature, FeatureTuple};
    use crate::threshold::{Threshold, ThresholdOperator, ThresholdSide};
    use crate::time::TimeScaleFunction;
    use chrono::TimeDelta;

    fn base() -> PoolMetadata {
        PoolMetadata::new(
            Evaluation::new(MeasurementUnit::new("CMS").unwrap()).with_variable_name("QINE"),
            PoolDescription::new(7),
        )
    }

    #[test]
    fn test_derivation_leaves_original_untouched() {
        let original = base();
        let scale = TimeScale::new(TimeDelta::hours(6), TimeScaleFunction::Mean).unwrap();
        let derived = original.with_time_scale(scale.clone());

        assert!(original.time_scale().is_none());
        assert_eq!(derived.time_scale(), Some(&scale));
        assert_eq!(derived.measurement_unit(), original.measurement_unit());
        assert_eq!(derived.pool_id(), 7);
    }

    #[test]
    fn test_derivation_overrides_one_facet() {
        let threshold =
            Threshold::value(10.0, ThresholdOperator::Greater, ThresholdSide::Left).unwrap();
        let window = TimeWindow::unbounded();
        let with_window = base().with_time_window(window.clone());
        let both = with_window.with_thresholds(OneOrTwoThresholds::one(threshold.clone()));

        assert_eq!(both.time_window(), Some(&window));
        assert_eq!(both.thresholds().unwrap().event(), &threshold);
        assert_ne!(with_window, both);
    }

    #[test]
    fn test_baseline_flag() {
        let baseline = base().with_baseline_flag(true);
        assert!(baseline.is_baseline_pool());
        assert!(!base().is_baseline_pool());
        assert_ne!(baseline, base());
    }

    #[test]
    fn test_dimensionless_default() {
        let metadata = PoolMetadata::default();
        assert!(metadata.measurement_unit().is_dimensionless());
        assert!(metadata.feature_group().is_none());
    }

    #[test]
    fn test_display() {
        let tuple = FeatureTuple::new(Feature::new("DRRC2"), Feature::new("DRRC2"));
        let metadata = base().with_feature_group(FeatureGroup::single(tuple));
        assert_eq!(metadata.to_string(), "pool 7 [CMS, features: DRRC2]");
    }
}
