//! Geographic features and groups of features.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::error::MetadataError;

/// A named geographic location, e.g. a stream gauge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Feature {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl Feature {
    /// Creates a feature with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// Attaches a free-text description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The observed (left), predicted (right) and optional baseline features
/// that describe one location across data sources.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FeatureTuple {
    left: Feature,
    right: Feature,
    #[serde(skip_serializing_if = "Option::is_none")]
    baseline: Option<Feature>,
}

impl FeatureTuple {
    pub fn new(left: Feature, right: Feature) -> Self {
        Self {
            left,
            right,
            baseline: None,
        }
    }

    /// Sets the baseline feature.
    pub fn with_baseline(mut self, baseline: Feature) -> Self {
        self.baseline = Some(baseline);
        self
    }

    pub fn left(&self) -> &Feature {
        &self.left
    }

    pub fn right(&self) -> &Feature {
        &self.right
    }

    pub fn baseline(&self) -> Option<&Feature> {
        self.baseline.as_ref()
    }
}

/// A non-empty set of feature tuples evaluated together, optionally named
/// (e.g. a region).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FeatureGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    tuples: BTreeSet<FeatureTuple>,
}

impl FeatureGroup {
    /// Creates a group from one or more tuples.
    pub fn new(
        name: Option<String>,
        tuples: impl IntoIterator<Item = FeatureTuple>,
    ) -> Result<Self, MetadataError> {
        let tuples: BTreeSet<FeatureTuple> = tuples.into_iter().collect();
        if tuples.is_empty() {
            return Err(MetadataError::EmptyFeatureGroup);
        }
        Ok(Self { name, tuples })
    }

    /// A singleton group named after its left feature.
    pub fn single(tuple: FeatureTuple) -> Self {
        let name = Some(tuple.left().name().to_string());
        Self {
            name,
            tuples: BTreeSet::from([tuple]),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn tuples(&self) -> &BTreeSet<FeatureTuple> {
        &self.tuples
    }

    /// Left features of every tuple, in order.
    pub fn left_features(&self) -> impl Iterator<Item = &Feature> {
        self.tuples.iter().map(FeatureTuple::left)
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    /// Always `false`: groups are non-empty by construction.
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }
}
