//! Slice-level summary statistics for forecast verification.
//!
//! Every function here follows the same missing-value policy: an input that
//! cannot support the statistic (empty, or too short for a sample variance)
//! yields `None` rather than `NaN` or a panic, so that one degenerate pool
//! never poisons a whole evaluation.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Error returned when parsing an unknown [`SummaryStatistic`] name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown summary statistic: {name:?}")]
pub struct UnknownStatistic {
    /// The name that failed to parse.
    pub name: String,
}

/// A scalar summary of a collection of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SummaryStatistic {
    Mean,
    Median,
    Minimum,
    Maximum,
    MeanAbsolute,
    StandardDeviation,
}

impl SummaryStatistic {
    /// All statistics, in declaration order.
    pub const ALL: [SummaryStatistic; 6] = [
        SummaryStatistic::Mean,
        SummaryStatistic::Median,
        SummaryStatistic::Minimum,
        SummaryStatistic::Maximum,
        SummaryStatistic::MeanAbsolute,
        SummaryStatistic::StandardDeviation,
    ];

    /// Applies the statistic to `data`.
    ///
    /// Non-finite values are ignored. Returns `None` when no finite values
    /// remain, or when fewer than two remain for the standard deviation.
    pub fn apply(self, data: &[f64]) -> Option<f64> {
        let finite: Vec<f64> = data.iter().copied().filter(|v| v.is_finite()).collect();
        match self {
            SummaryStatistic::Mean => mean(&finite),
            SummaryStatistic::Median => {
                let mut sorted = finite;
                sorted.sort_by(f64::total_cmp);
                median(&sorted)
            }
            SummaryStatistic::Minimum => minimum(&finite),
            SummaryStatistic::Maximum => maximum(&finite),
            SummaryStatistic::MeanAbsolute => mean_absolute(&finite),
            SummaryStatistic::StandardDeviation => sd(&finite),
        }
    }

    /// Upper-case name used in configuration and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            SummaryStatistic::Mean => "MEAN",
            SummaryStatistic::Median => "MEDIAN",
            SummaryStatistic::Minimum => "MINIMUM",
            SummaryStatistic::Maximum => "MAXIMUM",
            SummaryStatistic::MeanAbsolute => "MEAN_ABSOLUTE",
            SummaryStatistic::StandardDeviation => "STANDARD_DEVIATION",
        }
    }
}

impl fmt::Display for SummaryStatistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummaryStatistic {
    type Err = UnknownStatistic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        SummaryStatistic::ALL
            .into_iter()
            .find(|stat| stat.as_str() == normalised)
            .ok_or_else(|| UnknownStatistic {
                name: s.to_string(),
            })
    }
}

/// Arithmetic mean. Returns `None` if empty.
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Mean of absolute values. Returns `None` if empty.
pub fn mean_absolute(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().map(|v| v.abs()).sum::<f64>() / data.len() as f64)
}

/// Smallest value. Returns `None` if empty.
pub fn minimum(data: &[f64]) -> Option<f64> {
    data.iter().copied().reduce(f64::min)
}

/// Largest value. Returns `None` if empty.
pub fn maximum(data: &[f64]) -> Option<f64> {
    data.iter().copied().reduce(f64::max)
}

/// Sample variance with N-1 denominator.
/// Returns `None` if fewer than 2 elements.
pub fn variance(data: &[f64]) -> Option<f64> {
    let n = data.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let mean = data.iter().sum::<f64>() / nf;
    Some(data.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / (nf - 1.0))
}

/// Sample standard deviation with N-1 denominator.
/// Returns `None` if fewer than 2 elements.
pub fn sd(data: &[f64]) -> Option<f64> {
    variance(data).map(f64::sqrt)
}

/// Quantile by linear interpolation between order statistics (Hyndman and
/// Fan type 7).
///
/// **Expects pre-sorted input** (caller's responsibility). Returns `None` if
/// `sorted` is empty or `p` lies outside `[0, 1]`.
pub fn quantile_type7(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }
    let n = sorted.len();
    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    Some(sorted[lo] + (h - h.floor()) * (sorted[hi] - sorted[lo]))
}

/// Median of pre-sorted data. For even length, averages the middle two values.
pub fn median(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&data).unwrap(), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_is_missing() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean_absolute(&[]), None);
        assert_eq!(minimum(&[]), None);
        assert_eq!(maximum(&[]), None);
        assert_eq!(median(&[]), None);
        assert_eq!(quantile_type7(&[], 0.5), None);
    }

    #[test]
    fn test_sd() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(sd(&data).unwrap(), 2.138090, epsilon = 1e-6);
    }

    #[test]
    fn test_sd_single_is_missing() {
        assert_eq!(sd(&[5.0]), None);
    }

    #[test]
    fn test_variance_two() {
        // [3.0, 7.0]: mean=5, sum_sq=8, var=8/1=8
        assert_relative_eq!(variance(&[3.0, 7.0]).unwrap(), 8.0, epsilon = 1e-10);
    }

    #[test]
    fn test_mean_absolute_mixed_signs() {
        assert_relative_eq!(
            mean_absolute(&[-3.0, 1.0, -2.0]).unwrap(),
            2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_min_max() {
        let data = [3.0, -1.0, 7.5, 2.0];
        assert_eq!(minimum(&data), Some(-1.0));
        assert_eq!(maximum(&data), Some(7.5));
    }

    #[test]
    fn test_median_odd_even() {
        assert_relative_eq!(median(&[1.0, 2.0, 3.0]).unwrap(), 2.0);
        assert_relative_eq!(median(&[1.0, 2.0, 3.0, 4.0]).unwrap(), 2.5);
    }

    #[test]
    fn test_quantile_type7_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        // p=0.1 → h=0.4, lo=0, hi=1 → 1 + 0.4*(2-1) = 1.4
        assert_relative_eq!(quantile_type7(&sorted, 0.1).unwrap(), 1.4, epsilon = 1e-10);
        assert_relative_eq!(quantile_type7(&sorted, 1.0).unwrap(), 5.0, epsilon = 1e-10);
    }

    #[test]
    fn test_quantile_type7_out_of_range() {
        assert_eq!(quantile_type7(&[1.0, 2.0], 1.5), None);
        assert_eq!(quantile_type7(&[1.0, 2.0], -0.1), None);
    }

    #[test]
    fn test_summary_statistic_ignores_non_finite() {
        let data = [1.0, f64::NAN, 3.0, f64::INFINITY];
        assert_relative_eq!(SummaryStatistic::Mean.apply(&data).unwrap(), 2.0);
        assert_relative_eq!(SummaryStatistic::Maximum.apply(&data).unwrap(), 3.0);
    }

    #[test]
    fn test_summary_statistic_median_unsorted_input() {
        let data = [9.0, 1.0, 5.0];
        assert_relative_eq!(SummaryStatistic::Median.apply(&data).unwrap(), 5.0);
    }

    #[test]
    fn test_summary_statistic_parse() {
        assert_eq!(
            "mean absolute".parse::<SummaryStatistic>().unwrap(),
            SummaryStatistic::MeanAbsolute
        );
        assert_eq!(
            "STANDARD_DEVIATION".parse::<SummaryStatistic>().unwrap(),
            SummaryStatistic::StandardDeviation
        );
        let err = "mode".parse::<SummaryStatistic>().unwrap_err();
        assert_eq!(err.to_string(), "unknown summary statistic: \"mode\"");
    }
}
