//! Query results returned by the dispatcher.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{MechanismKind, Operation};

/// The shape of a query answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    /// count, sum, mean
    Scalar(f64),
    /// distinct value -> count
    Histogram(BTreeMap<String, f64>),
    /// full-column release
    Series(Vec<f64>),
}

impl QueryValue {
    #[must_use]
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(x) => Some(*x),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_histogram(&self) -> Option<&BTreeMap<String, f64>> {
        match self {
            Self::Histogram(h) => Some(h),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_series(&self) -> Option<&[f64]> {
        match self {
            Self::Series(s) => Some(s),
            _ => None,
        }
    }
}

/// True and noised answers to one aggregate query, with the parameters used.
///
/// `true_value` is kept for audit/comparison by the caller and must never be
/// released where only the noised value is allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Queried column
    pub column: String,

    /// Operation performed
    pub operation: Operation,

    /// Mechanism requested by the caller
    pub mechanism: MechanismKind,

    /// Requested epsilon (before flooring)
    pub epsilon: f64,

    /// Requested delta (before flooring)
    pub delta: f64,

    /// Sensitivity used for calibration
    pub sensitivity: f64,

    /// Exact answer over non-missing values
    pub true_value: QueryValue,

    /// Differentially private answer
    pub noised_value: QueryValue,
}
