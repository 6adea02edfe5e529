//! Verification metrics over [`Pool`](hydroskill_datamodel::Pool)s.
//!
//! | Family | Input samples | Output |
//! |--------|---------------|--------|
//! | Contingency table and dichotomous scores | `(bool, bool)` | [`DoubleScore`] |
//! | CRPS, CRPSS | `(f64, Ensemble)` | [`DoubleScore`] |
//! | Rank histogram | `(f64, Ensemble)` | [`Diagram`](hydroskill_datamodel::Diagram) |
//! | Time-to-peak error, relative error | `TimeSeries<(f64, f64)>` | [`DurationDiagram`](hydroskill_datamodel::DurationDiagram) |
//! | Timing-error summaries | `DurationDiagram` | [`DurationScore`](hydroskill_datamodel::DurationScore) |
//!
//! Metrics hold no state between calls. The rank histogram and the timing
//! errors break ties at random, so they take the generator as an argument
//! ([`RandomizedMetric`]); pass a seeded generator for reproducible output
//! and give each thread its own generator.
//!
//! # Quick start
//!
//! ```
//! use hydroskill_datamodel::{Ensemble, Pool, PoolMetadata};
//! use hydroskill_metrics::{ContinuousRankedProbabilityScore, Metric};
//!
//! let pool = Pool::builder()
//!     .add_datum((2.0, Ensemble::new(&[1.0, 2.0, 3.0, 4.0])))
//!     .set_metadata(PoolMetadata::dimensionless())
//!     .build()
//!     .unwrap();
//! let score = ContinuousRankedProbabilityScore.apply(&pool).unwrap();
//! assert_eq!(score.value(hydroskill_datamodel::ComponentName::Main), Some(0.375));
//! ```

pub mod collection;
pub mod contingency;
pub mod crps;
pub mod dichotomous;
pub mod error;
pub mod rank_histogram;
pub mod timing;
pub mod timing_summary;

use hydroskill_datamodel::MetricName;
use rand::Rng;

pub use collection::MetricCollection;
pub use contingency::{ContingencyTable, ContingencyTableMetric};
pub use crps::{
    ContinuousRankedProbabilityScore, ContinuousRankedProbabilitySkillScore, HersbachDecomposition,
    crps,
};
pub use dichotomous::{
    EquitableThreatScore, FrequencyBias, PeirceSkillScore, ProbabilityOfDetection,
    ProbabilityOfFalseDetection, ThreatScore,
};
pub use error::MetricError;
pub use rank_histogram::RankHistogram;
pub use timing::{TimeToPeakError, TimeToPeakRelativeError};
pub use timing_summary::TimingErrorSummaryStatistics;

/// A deterministic metric.
pub trait Metric<I: ?Sized> {
    type Output;

    fn name(&self) -> MetricName;

    fn apply(&self, input: &I) -> Result<Self::Output, MetricError>;
}

/// A metric that breaks ties at random.
///
/// The generator is an explicit argument so that a seeded generator gives
/// bit-identical output. Sharing one generator between threads is the
/// caller's concern.
pub trait RandomizedMetric<I: ?Sized> {
    type Output;

    fn name(&self) -> MetricName;

    fn apply(&self, input: &I, rng: &mut impl Rng) -> Result<Self::Output, MetricError>;
}

/// A metric computed in two stages so that the first stage can be shared.
///
/// [`Collectable::intermediate`] computes the expensive part once, e.g. a
/// contingency table; [`Collectable::aggregate`] derives the score from it.
/// `apply(input)` must equal `aggregate(&intermediate(input)?)`.
pub trait Collectable<I: ?Sized>: Metric<I> {
    type Intermediate;

    /// The metric whose output is the intermediate.
    fn collection_of(&self) -> MetricName;

    fn intermediate(&self, input: &I) -> Result<Self::Intermediate, MetricError>;

    fn aggregate(&self, intermediate: &Self::Intermediate) -> Result<Self::Output, MetricError>;
}

/// Replaces non-finite results with a missing value.
pub(crate) fn finite_or_missing(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
