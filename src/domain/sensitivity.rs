//! Sensitivity bounds: how far one record can move a query's output.

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Positive, finite sensitivity bound.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sensitivity(f64);

impl Sensitivity {
    /// Unit sensitivity: counts, and the fallback for degenerate ranges.
    pub const UNIT: Sensitivity = Sensitivity(1.0);

    /// A caller-declared bound.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidSensitivity`] unless `value` is
    /// positive and finite.
    pub fn declared(value: f64) -> Result<Self, ValidationError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(ValidationError::InvalidSensitivity(value))
        }
    }

    /// `max - min` of the observed values, or 1 when that range is zero or
    /// there is nothing to measure.
    #[must_use]
    pub fn from_range(values: &[f64]) -> Self {
        let (min, max) = values
            .iter()
            .copied()
            .filter(|x| x.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| (lo.min(x), hi.max(x)));
        let range = max - min;
        if range.is_finite() && range > 0.0 {
            Self(range)
        } else {
            Self::UNIT
        }
    }

    /// The observed range unless the caller overrides it.
    ///
    /// # Errors
    /// Returns error if the override is not a valid sensitivity.
    pub fn resolve(values: &[f64], declared: Option<f64>) -> Result<Self, ValidationError> {
        match declared {
            Some(value) => Self::declared(value),
            None => Ok(Self::from_range(values)),
        }
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self::UNIT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_sensitivity() {
        assert_eq!(Sensitivity::from_range(&[5.0, 7.0, 3.0, 9.0]).value(), 6.0);
        assert_eq!(Sensitivity::from_range(&[4.0, 4.0]), Sensitivity::UNIT);
        assert_eq!(Sensitivity::from_range(&[]), Sensitivity::UNIT);
    }

    #[test]
    fn test_declared_sensitivity() {
        assert_eq!(Sensitivity::declared(10.0).map(|s| s.value()), Ok(10.0));
        assert!(Sensitivity::declared(0.0).is_err());
        assert!(Sensitivity::declared(f64::NAN).is_err());
        assert_eq!(
            Sensitivity::resolve(&[1.0, 100.0], Some(2.0)).map(|s| s.value()),
            Ok(2.0)
        );
    }
}
