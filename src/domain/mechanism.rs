//! Mechanism kinds and aggregate operations, as named by callers.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Noise mechanism selected by the caller.
///
/// `Exponential` is the caller-facing name for the biased-choice randomized
/// response used on categorical data (see [`crate::domain::BiasedChoice`]).
/// On numeric data it falls back to Laplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MechanismKind {
    /// Additive Laplace noise, ε-DP
    Laplace,
    /// Additive Gaussian noise, (ε, δ)-DP
    Gaussian,
    /// Biased-choice randomized response on categories
    Exponential,
}

impl MechanismKind {
    /// The name callers use for this mechanism.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Laplace => "laplace",
            Self::Gaussian => "gaussian",
            Self::Exponential => "exponential",
        }
    }

    /// Parse a mechanism name, rejecting unknown names.
    ///
    /// # Errors
    /// Returns [`ValidationError::UnknownMechanism`] for unrecognized names.
    pub fn parse_strict(name: &str) -> Result<Self, ValidationError> {
        name.parse()
    }

    /// Parse a mechanism name, defaulting unknown names to Laplace.
    ///
    /// This is the bulk column path's behaviour.
    #[must_use]
    pub fn parse_lenient(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            tracing::debug!(mechanism = name, "unrecognized mechanism, using laplace");
            Self::Laplace
        })
    }

    /// The additive mechanism actually used for numeric data.
    #[must_use]
    pub fn numeric(&self) -> Self {
        match self {
            Self::Exponential => Self::Laplace,
            other => *other,
        }
    }
}

impl FromStr for MechanismKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "laplace" => Ok(Self::Laplace),
            "gaussian" => Ok(Self::Gaussian),
            "exponential" => Ok(Self::Exponential),
            _ => Err(ValidationError::UnknownMechanism(s.to_string())),
        }
    }
}

impl std::fmt::Display for MechanismKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Aggregate operation understood by the query dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Mean,
    Sum,
    Count,
    Histogram,
    FullColumn,
}

impl Operation {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Sum => "sum",
            Self::Count => "count",
            Self::Histogram => "histogram",
            Self::FullColumn => "full_column",
        }
    }

    /// Whether the operation is only defined over numeric columns.
    ///
    /// Count works on anything; histogram counts distinct values and so
    /// accepts categorical columns too.
    #[must_use]
    pub fn requires_numeric(&self) -> bool {
        matches!(self, Self::Mean | Self::Sum | Self::FullColumn)
    }
}

impl FromStr for Operation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(Self::Mean),
            "sum" => Ok(Self::Sum),
            "count" => Ok(Self::Count),
            "histogram" => Ok(Self::Histogram),
            "full_column" => Ok(Self::FullColumn),
            _ => Err(ValidationError::UnknownOperation(s.to_string())),
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_parse() {
        assert_eq!(MechanismKind::parse_strict(" Gaussian "), Ok(MechanismKind::Gaussian));
        assert_eq!(
            MechanismKind::parse_strict("geometric"),
            Err(ValidationError::UnknownMechanism("geometric".to_string()))
        );
    }

    #[test]
    fn test_lenient_parse_defaults_to_laplace() {
        assert_eq!(MechanismKind::parse_lenient("geometric"), MechanismKind::Laplace);
        assert_eq!(MechanismKind::parse_lenient("exponential"), MechanismKind::Exponential);
    }

    #[test]
    fn test_exponential_numeric_fallback() {
        assert_eq!(MechanismKind::Exponential.numeric(), MechanismKind::Laplace);
        assert_eq!(MechanismKind::Gaussian.numeric(), MechanismKind::Gaussian);
    }

    #[test]
    fn test_operation_names_round_trip() {
        for op in [
            Operation::Mean,
            Operation::Sum,
            Operation::Count,
            Operation::Histogram,
            Operation::FullColumn,
        ] {
            assert_eq!(op.name().parse::<Operation>(), Ok(op));
        }
        assert!("median".parse::<Operation>().is_err());
    }
}
