//! Thresholds that define events, e.g. "flow above flood stage".

use std::fmt;

use serde::Serialize;

use crate::error::MetadataError;
use crate::units::MeasurementUnit;

/// Comparison applied between a value and a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThresholdOperator {
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Equal,
}

impl ThresholdOperator {
    /// Returns `true` when `value` satisfies the operator against `bound`.
    pub fn test(self, value: f64, bound: f64) -> bool {
        match self {
            ThresholdOperator::Greater => value > bound,
            ThresholdOperator::GreaterEqual => value >= bound,
            ThresholdOperator::Less => value < bound,
            ThresholdOperator::LessEqual => value <= bound,
            ThresholdOperator::Equal => value == bound,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            ThresholdOperator::Greater => ">",
            ThresholdOperator::GreaterEqual => ">=",
            ThresholdOperator::Less => "<",
            ThresholdOperator::LessEqual => "<=",
            ThresholdOperator::Equal => "=",
        }
    }
}

/// Which side of a pair a threshold is applied to when filtering pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThresholdSide {
    Left,
    Right,
    LeftAndRight,
}

/// A real-valued threshold or a non-exceedence probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThresholdValue {
    Value(f64),
    Probability(f64),
}

/// An event threshold: a bound, an operator and the side it applies to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Threshold {
    value: ThresholdValue,
    operator: ThresholdOperator,
    side: ThresholdSide,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<MeasurementUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl Threshold {
    /// A real-valued threshold. Infinite bounds are allowed; `NaN` is not.
    pub fn value(
        value: f64,
        operator: ThresholdOperator,
        side: ThresholdSide,
    ) -> Result<Self, MetadataError> {
        if value.is_nan() {
            return Err(MetadataError::InvalidThreshold {
                reason: "threshold value must not be NaN".to_string(),
            });
        }
        Ok(Self {
            value: ThresholdValue::Value(value),
            operator,
            side,
            unit: None,
            name: None,
        })
    }

    /// A probability threshold in `[0, 1]`.
    pub fn probability(
        probability: f64,
        operator: ThresholdOperator,
        side: ThresholdSide,
    ) -> Result<Self, MetadataError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(MetadataError::InvalidThreshold {
                reason: format!("probability must be in [0, 1], got {probability}"),
            });
        }
        Ok(Self {
            value: ThresholdValue::Probability(probability),
            operator,
            side,
            unit: None,
            name: None,
        })
    }

    /// The threshold that admits all finite data.
    pub fn all_data() -> Self {
        Self {
            value: ThresholdValue::Value(f64::NEG_INFINITY),
            operator: ThresholdOperator::Greater,
            side: ThresholdSide::LeftAndRight,
            unit: None,
            name: Some("ALL DATA".to_string()),
        }
    }

    pub fn with_unit(mut self, unit: MeasurementUnit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn threshold_value(&self) -> ThresholdValue {
        self.value
    }

    pub fn operator(&self) -> ThresholdOperator {
        self.operator
    }

    pub fn side(&self) -> ThresholdSide {
        self.side
    }

    pub fn unit(&self) -> Option<&MeasurementUnit> {
        self.unit.as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_probability(&self) -> bool {
        matches!(self.value, ThresholdValue::Probability(_))
    }

    /// Tests a real value against a real-valued threshold.
    ///
    /// Probability thresholds must first be resolved to real values, so
    /// they never match here. Non-finite values never match.
    pub fn test(&self, value: f64) -> bool {
        match self.value {
            ThresholdValue::Value(bound) => value.is_finite() && self.operator.test(value, bound),
            ThresholdValue::Probability(_) => false,
        }
    }

    /// Returns a real-valued copy with the given bound, keeping the
    /// operator, side, unit and name.
    pub fn resolved(&self, bound: f64) -> Result<Self, MetadataError> {
        let mut resolved = Self::value(bound, self.operator, self.side)?;
        resolved.unit = self.unit.clone();
        resolved.name = self.name.clone();
        Ok(resolved)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            ThresholdValue::Value(v) => write!(f, "{} {}", self.operator.symbol(), v)?,
            ThresholdValue::Probability(p) => write!(f, "Pr {} {}", self.operator.symbol(), p)?,
        }
        if let Some(unit) = &self.unit {
            write!(f, " {unit}")?;
        }
        Ok(())
    }
}

/// An event threshold plus an optional decision threshold, e.g. a
/// probability above which an ensemble forecast counts as a warning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OneOrTwoThresholds {
    event: Threshold,
    #[serde(skip_serializing_if = "Option::is_none")]
    decision: Option<Threshold>,
}

impl OneOrTwoThresholds {
    pub fn one(event: Threshold) -> Self {
        Self {
            event,
            decision: None,
        }
    }

    pub fn two(event: Threshold, decision: Threshold) -> Self {
        Self {
            event,
            decision: Some(decision),
        }
    }

    pub fn event(&self) -> &Threshold {
        &self.event
    }

    pub fn decision(&self) -> Option<&Threshold> {
        self.decision.as_ref()
    }

    pub fn has_two(&self) -> bool {
        self.decision.is_some()
    }
}
