//! Error types for the hydroskill-metrics crate.

use hydroskill_datamodel::{MetadataError, MetricName};

/// Errors raised while constructing or applying a metric.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricError {
    /// Returned when an intermediate statistic does not have the shape a score requires.
    #[error("{metric} expects components [{expected}] but received [{actual}]")]
    ShapeMismatch {
        /// The metric that rejected its input.
        metric: MetricName,
        /// The expected component names or shape.
        expected: String,
        /// The received component names or shape.
        actual: String,
    },

    /// Returned when a skill score is applied to a pool without a baseline.
    #[error("{metric} requires a baseline but the pool has none")]
    MissingBaseline {
        /// The metric that needs a baseline.
        metric: MetricName,
    },

    /// Returned when a metric is constructed with an invalid parameter.
    #[error("invalid parameter for {metric}: {reason}")]
    InvalidParameter {
        /// The metric being constructed.
        metric: MetricName,
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a timing error is computed for a series without a reference time.
    #[error("{metric} requires a reference time but a time series has none")]
    MissingReferenceTime {
        /// The timing metric.
        metric: MetricName,
    },

    /// Returned when a contingency table has a non-positive total.
    #[error("{metric} requires a positive sample total, got {total}")]
    NonPositiveMarginal {
        /// The metric that rejected the table.
        metric: MetricName,
        /// The table total.
        total: f64,
    },

    /// Propagated from the data model, e.g. while resolving a threshold.
    #[error(transparent)]
    DataModel(#[from] MetadataError),
}
