//! JSON rendering of evaluation results.

use anyhow::{Context, Result};

use crate::evaluate::PoolStatistics;

/// Serialize per-pool statistics to a pretty-printed JSON string.
pub fn statistics_to_json(results: &[PoolStatistics]) -> Result<String> {
    serde_json::to_string_pretty(results).context("failed to serialize statistics")
}
