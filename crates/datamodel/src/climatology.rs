//! Historical reference data per feature.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use crate::feature::Feature;
use crate::units::MeasurementUnit;

/// Sorted, finite historical values for each feature, in one unit.
///
/// Built once through [`ClimatologyBuilder`] and immutable afterwards. A
/// feature whose contributions were all missing is kept with an empty
/// array; [`Climatology::features_without_data`] lists them.
#[derive(Debug, Clone, PartialEq)]
pub struct Climatology {
    by_feature: BTreeMap<Feature, Arc<[f64]>>,
    unit: MeasurementUnit,
}

impl Climatology {
    pub fn builder(unit: MeasurementUnit) -> ClimatologyBuilder {
        ClimatologyBuilder {
            raw: BTreeMap::new(),
            unit,
        }
    }

    /// Returns the sorted finite values for `feature`.
    pub fn get(&self, feature: &Feature) -> Option<&[f64]> {
        self.by_feature.get(feature).map(|values| &values[..])
    }

    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.by_feature.keys()
    }

    pub fn unit(&self) -> &MeasurementUnit {
        &self.unit
    }

    /// Total number of finite values across all features.
    pub fn len(&self) -> usize {
        self.by_feature.values().map(|v| v.len()).sum()
    }

    /// Returns `true` when no feature holds any finite value.
    pub fn is_empty(&self) -> bool {
        self.by_feature.values().all(|v| v.is_empty())
    }

    /// Features whose values were all missing.
    pub fn features_without_data(&self) -> Vec<&Feature> {
        self.by_feature
            .iter()
            .filter(|(_, values)| values.is_empty())
            .map(|(feature, _)| feature)
            .collect()
    }
}

/// Accumulates raw climatological values per feature.
#[derive(Debug)]
pub struct ClimatologyBuilder {
    raw: BTreeMap<Feature, Vec<f64>>,
    unit: MeasurementUnit,
}

impl ClimatologyBuilder {
    /// Appends values for a feature. Repeated calls for the same feature merge.
    pub fn add(mut self, feature: Feature, values: impl IntoIterator<Item = f64>) -> Self {
        self.raw.entry(feature).or_default().extend(values);
        self
    }

    /// Filters missing values and sorts each feature's merged values once.
    pub fn build(self) -> Climatology {
        let mut by_feature = BTreeMap::new();
        for (feature, mut values) in self.raw {
            values.retain(|v| v.is_finite());
            values.sort_by(f64::total_cmp);
            if values.is_empty() {
                warn!(feature = %feature, "climatology has no finite values for feature");
            }
            by_feature.insert(feature, Arc::from(values));
        }
        Climatology {
            by_feature,
            unit: self.unit,
        }
    }
}
