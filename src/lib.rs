//! Verification statistics for hydrological forecasts.
//!
//! This crate ties the workspace together: it re-exports the data model and
//! metric crates, reads a TOML configuration, and evaluates many pools in
//! parallel with reproducible random tie-breaking.
//!
//! # Quick start
//!
//! ```
//! use hydroskill::{EvaluationPlan, PoolData, evaluate_pools};
//! use hydroskill::datamodel::{Ensemble, MetricName, Pool, PoolMetadata};
//!
//! let pool = Pool::builder()
//!     .add_datum((2.0, Ensemble::new(&[1.0, 2.0, 3.0, 4.0])))
//!     .set_metadata(PoolMetadata::dimensionless())
//!     .build()
//!     .unwrap();
//! let plan = EvaluationPlan::new(&[
//!     MetricName::ContinuousRankedProbabilityScore,
//!     MetricName::RankHistogram,
//! ])
//! .unwrap()
//! .with_seed(42);
//!
//! let results = evaluate_pools(&[PoolData::from(pool)], &plan).unwrap();
//! assert_eq!(results[0].statistics.len(), 2);
//! ```
//!
//! # Layout
//!
//! ```text
//! hydroskill            config, conversion, multi-pool evaluation, JSON output
//! ├── hydroskill-metrics    contingency scores, CRPS, rank histogram, timing errors
//! ├── hydroskill-datamodel  pools, metadata, ensembles, climatology, statistics
//! └── hydroskill-stats      summary statistics with a missing-value policy
//! ```

pub mod config;
pub mod convert;
pub mod evaluate;
pub mod logging;
pub mod output;

pub use hydroskill_datamodel as datamodel;
pub use hydroskill_metrics as metrics;
pub use hydroskill_stats as stats;

pub use config::SkillConfig;
pub use convert::build_plan;
pub use evaluate::{EvaluationPlan, PoolData, PoolStatistics, evaluate_pools};
pub use output::statistics_to_json;
