//! Error types for the hydroskill-datamodel crate.

/// Errors raised while building a [`Pool`](crate::Pool).
///
/// These indicate a defect in whatever assembled the pool, so they are never
/// retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PoolError {
    /// Returned when `build()` is called before metadata was set.
    #[error("cannot build a pool without metadata for the main samples")]
    MissingMetadata,

    /// Returned when only one of baseline samples and baseline metadata was supplied.
    #[error(
        "baseline samples and baseline metadata must both be present or both absent \
         (samples present: {has_samples}, metadata present: {has_metadata})"
    )]
    BaselineMismatch {
        /// Whether baseline samples were supplied.
        has_samples: bool,
        /// Whether baseline metadata was supplied.
        has_metadata: bool,
    },

    /// Returned when a climatology with no values is attached to a non-empty pool.
    #[error("climatology is empty but the pool contains {samples} sample(s)")]
    EmptyClimatology {
        /// Number of main samples in the pool.
        samples: usize,
    },

    /// Returned when a merged pool's metadata differs from the builder's.
    #[error("cannot merge pools with different metadata: expected {expected}, found {found}")]
    MetadataMismatch {
        /// Metadata already held by the builder.
        expected: String,
        /// Metadata of the pool being merged.
        found: String,
    },
}

/// Errors raised while constructing descriptive metadata.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetadataError {
    /// Returned when a measurement unit name is empty or whitespace.
    #[error("measurement unit name must not be blank")]
    BlankUnit,

    /// Returned when a time window bound pair is inverted.
    #[error("invalid time window: earliest {facet} {earliest} is later than latest {latest}")]
    InvalidTimeWindow {
        /// Which pair of bounds is inverted.
        facet: &'static str,
        /// Formatted earliest bound.
        earliest: String,
        /// Formatted latest bound.
        latest: String,
    },

    /// Returned when a time scale period is not positive.
    #[error("time scale period must be positive, got {millis} ms")]
    InvalidTimeScale {
        /// The rejected period in milliseconds.
        millis: i64,
    },

    /// Returned when a threshold value is not acceptable.
    #[error("invalid threshold: {reason}")]
    InvalidThreshold {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a feature group has no feature tuples.
    #[error("feature group must contain at least one feature tuple")]
    EmptyFeatureGroup,

    /// Returned when a time series has two events at the same valid time.
    #[error("time series contains more than one event at {valid_time}")]
    DuplicateValidTime {
        /// The duplicated valid time, formatted as RFC 3339.
        valid_time: String,
    },
}

/// Errors raised while constructing an [`Ensemble`](crate::Ensemble).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EnsembleError {
    /// Returned when the label count does not match the member count.
    #[error("ensemble has {members} member(s) but {labels} label(s)")]
    LabelCountMismatch {
        /// Number of members.
        members: usize,
        /// Number of labels.
        labels: usize,
    },
}

/// Error returned when parsing an unknown [`MetricName`](crate::MetricName).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown metric: {name:?}")]
pub struct UnknownMetric {
    /// The name that failed to parse.
    pub name: String,
}
