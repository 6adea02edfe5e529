//! Measurement unit tag.

use std::fmt;

use serde::Serialize;

use crate::error::MetadataError;

/// Reserved unit name for dimensionless quantities.
pub const DIMENSIONLESS: &str = "DIMENSIONLESS";

/// A validated physical-unit tag, e.g. `"CMS"` or `"ft"`.
///
/// Equality and ordering follow the name. The name is never blank.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MeasurementUnit {
    name: String,
}

impl MeasurementUnit {
    /// Creates a unit, rejecting blank names.
    pub fn new(name: impl Into<String>) -> Result<Self, MetadataError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(MetadataError::BlankUnit);
        }
        Ok(Self { name })
    }

    /// The dimensionless unit.
    pub fn dimensionless() -> Self {
        Self {
            name: DIMENSIONLESS.to_string(),
        }
    }

    /// Returns the unit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` for the reserved dimensionless unit.
    pub fn is_dimensionless(&self) -> bool {
        self.name == DIMENSIONLESS
    }
}

impl fmt::Display for MeasurementUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_rejected() {
        assert_eq!(MeasurementUnit::new("  "), Err(MetadataError::BlankUnit));
        assert_eq!(MeasurementUnit::new(""), Err(MetadataError::BlankUnit));
    }

    #[test]
    fn test_dimensionless() {
        let unit = MeasurementUnit::dimensionless();
        assert!(unit.is_dimensionless());
        assert_eq!(unit, MeasurementUnit::new(DIMENSIONLESS).unwrap());
        assert!(!MeasurementUnit::new("CMS").unwrap().is_dimensionless());
    }

    #[test]
    fn test_ordering_by_name() {
        let a = MeasurementUnit::new("CFS").unwrap();
        let b = MeasurementUnit::new("CMS").unwrap();
        assert!(a < b);
        assert_eq!(a.to_string(), "CFS");
    }
}
