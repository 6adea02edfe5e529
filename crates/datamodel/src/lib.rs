//! Immutable verification samples for hydrological forecast evaluation.
//!
//! A [`Pool`] is one atomic unit of comparable data: a list of samples
//! (observed/predicted pairs, ensemble pairs, or paired time series), the
//! [`PoolMetadata`] describing them, an optional baseline with its own
//! metadata, and an optional [`Climatology`]. Metrics consume pools and
//! produce [`Statistic`] values.
//!
//! # Quick start
//!
//! ```
//! use hydroskill_datamodel::{Ensemble, Pool, PoolMetadata};
//!
//! let pool = Pool::builder()
//!     .add_datum((2.0, Ensemble::new(&[1.0, 2.0, 3.0])))
//!     .set_metadata(PoolMetadata::dimensionless())
//!     .build()
//!     .unwrap();
//! assert_eq!(pool.len(), 1);
//! assert!(!pool.has_baseline());
//! ```
//!
//! # Layout
//!
//! ```text
//! units.rs        MeasurementUnit
//! ensemble.rs     Ensemble, Labels (interned, sorted-member cache)
//! feature.rs      Feature, FeatureTuple, FeatureGroup
//! time.rs         TimeWindow, TimeScale, TimeSeries
//! threshold.rs    Threshold, OneOrTwoThresholds
//! climatology.rs  Climatology + builder
//! metadata.rs     Evaluation, PoolDescription, PoolMetadata
//! pool.rs         Pool + builder
//! slicer.rs       filtering, transforming, grouping
//! statistics.rs   metric outputs
//! ```

pub mod climatology;
pub mod ensemble;
pub mod error;
pub mod feature;
pub mod metadata;
pub mod pool;
pub mod slicer;
pub mod statistics;
pub mod threshold;
pub mod time;
pub mod units;

pub use climatology::{Climatology, ClimatologyBuilder};
pub use ensemble::{Ensemble, Labels};
pub use error::{EnsembleError, MetadataError, PoolError, UnknownMetric};
pub use feature::{Feature, FeatureGroup, FeatureTuple};
pub use metadata::{Evaluation, PoolDescription, PoolMetadata};
pub use pool::{Pool, PoolBuilder};
pub use statistics::{
    ComponentName, Diagram, DiagramComponent, DoubleScore, DurationComponent, DurationDiagram,
    DurationPair, DurationScore, MetricName, ScoreComponent, Statistic,
};
pub use threshold::{OneOrTwoThresholds, Threshold, ThresholdOperator, ThresholdSide, ThresholdValue};
pub use time::{
    Event, ReferenceTimeType, TimeScale, TimeScaleFunction, TimeSeries, TimeSeriesBuilder,
    TimeWindow,
};
pub use units::{DIMENSIONLESS, MeasurementUnit};
