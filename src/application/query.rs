//! Query dispatcher: per-aggregate release of a single statistic.
//!
//! Computes the true answer over non-missing values and routes it through the
//! requested mechanism. Mechanism names are parsed strictly here: an unknown
//! name is a validation error, not a silent Laplace.
//!
//! Histogram and full-column releases noise every entry under the same ε with
//! no budget splitting, so the effective privacy loss of one such query grows
//! with the number of entries released.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::DpConfig;
use crate::domain::{
    number_key, Column, Dataset, Floors, MechanismKind, Operation, PrivacyParameters, QueryResult,
    QueryValue, Sensitivity, ValidationError,
};
use crate::ports::NoiseSource;
use crate::Result;

use super::mechanism::Mechanism;

/// An aggregate query as named by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// mean, sum, count, histogram or full_column
    pub operation: String,

    /// laplace, gaussian or exponential
    pub mechanism: String,

    /// Epsilon (config default when absent)
    pub epsilon: Option<f64>,

    /// Delta (config default when absent)
    pub delta: Option<f64>,

    /// Sensitivity override (observed range when absent)
    pub sensitivity: Option<f64>,
}

impl QueryRequest {
    pub fn new(operation: impl Into<String>, mechanism: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            mechanism: mechanism.into(),
            epsilon: None,
            delta: None,
            sensitivity: None,
        }
    }

    #[must_use]
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = Some(epsilon);
        self
    }

    #[must_use]
    pub fn delta(mut self, delta: f64) -> Self {
        self.delta = Some(delta);
        self
    }

    #[must_use]
    pub fn sensitivity(mut self, sensitivity: f64) -> Self {
        self.sensitivity = Some(sensitivity);
        self
    }
}

/// Service for aggregate DP queries.
pub struct QueryService<N: ?Sized> {
    noise: Arc<N>,
    floors: Floors,
    default_epsilon: f64,
    default_delta: f64,
}

impl<N: NoiseSource + ?Sized> QueryService<N> {
    /// Create a query service with the process-wide configuration.
    pub fn new(noise: Arc<N>) -> Self {
        Self::with_config(noise, DpConfig::process())
    }

    /// Create a query service with custom configuration.
    pub fn with_config(noise: Arc<N>, config: &DpConfig) -> Self {
        Self {
            noise,
            floors: config.mechanism_floors,
            default_epsilon: config.default_epsilon,
            default_delta: config.default_delta,
        }
    }

    /// Run a query against a column of a dataset.
    ///
    /// # Errors
    /// Returns a validation error if the column does not exist, plus every
    /// error [`QueryService::run`] can return.
    pub fn run_on_dataset(&self, dataset: &Dataset, column: &str, request: &QueryRequest) -> Result<QueryResult> {
        let column = dataset
            .column(column)
            .ok_or_else(|| ValidationError::ColumnNotFound(column.to_string()))?;
        self.run(column, request)
    }

    /// Run a query against a column.
    ///
    /// # Errors
    /// Returns a validation error for an unknown operation or mechanism, a
    /// non-numeric column where numeric data is required, or an invalid
    /// sensitivity override. Returns a privacy error if the noise source fails.
    pub fn run(&self, column: &Column, request: &QueryRequest) -> Result<QueryResult> {
        let operation: Operation = request.operation.parse()?;
        if operation.requires_numeric() && !column.is_numeric() {
            return Err(ValidationError::NonNumericColumn {
                column: column.name().to_string(),
                operation: operation.name().to_string(),
            }
            .into());
        }

        let values = if column.is_numeric() {
            column.numeric_values()
        } else {
            Vec::new()
        };
        let sensitivity = Sensitivity::resolve(&values, request.sensitivity)?;
        let kind = MechanismKind::parse_strict(&request.mechanism)?;
        let params = PrivacyParameters::new(
            request.epsilon.unwrap_or(self.default_epsilon),
            request.delta.unwrap_or(self.default_delta),
        )
        .with_floors(self.floors);
        let mechanism = Mechanism::new(kind, params, sensitivity);
        let noise = &*self.noise;

        let (true_value, noised_value) = match operation {
            Operation::Count => {
                // Numeric columns count only the cells that enter the other aggregates.
                let present = if column.is_numeric() {
                    values.len()
                } else {
                    column.non_missing_count()
                };
                let count = present as f64;
                let noised = mechanism.with_sensitivity(Sensitivity::UNIT).randomize(count, noise)?;
                (QueryValue::Scalar(count), QueryValue::Scalar(noised))
            }
            Operation::Sum => {
                let sum: f64 = values.iter().sum();
                (QueryValue::Scalar(sum), QueryValue::Scalar(mechanism.randomize(sum, noise)?))
            }
            Operation::Mean => {
                // Same full-range sensitivity as sum; not scaled by 1/n.
                let mean = if values.is_empty() {
                    0.0
                } else {
                    values.iter().sum::<f64>() / values.len() as f64
                };
                (QueryValue::Scalar(mean), QueryValue::Scalar(mechanism.randomize(mean, noise)?))
            }
            Operation::Histogram => {
                let counts = histogram(column, &values);
                let noised = counts
                    .iter()
                    .map(|(key, count)| -> Result<(String, f64)> {
                        Ok((key.clone(), mechanism.randomize(*count, noise)?))
                    })
                    .collect::<Result<BTreeMap<_, _>>>()?;
                (QueryValue::Histogram(counts), QueryValue::Histogram(noised))
            }
            Operation::FullColumn => {
                let noised = values
                    .iter()
                    .map(|x| mechanism.randomize(*x, noise))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                (QueryValue::Series(values), QueryValue::Series(noised))
            }
        };

        tracing::info!(
            column = %column.name(),
            operation = %operation,
            mechanism = %kind,
            epsilon = params.epsilon,
            delta = params.delta,
            "answered DP query"
        );

        Ok(QueryResult {
            column: column.name().to_string(),
            operation,
            mechanism: kind,
            epsilon: params.epsilon,
            delta: params.delta,
            sensitivity: mechanism.sensitivity().value(),
            true_value,
            noised_value,
        })
    }
}

/// Distinct non-missing value -> number of occurrences.
///
/// Numeric columns are keyed by their coerced `values`, so `"2"` and `2` fall
/// into the same bucket; cells that cannot be coerced are excluded.
fn histogram(column: &Column, values: &[f64]) -> BTreeMap<String, f64> {
    let mut counts = BTreeMap::new();
    if column.is_numeric() {
        for x in values {
            *counts.entry(number_key(*x)).or_insert(0.0) += 1.0;
        }
    } else {
        for key in column.values().iter().filter_map(|v| v.key()) {
            *counts.entry(key).or_insert(0.0) += 1.0;
        }
    }
    counts
}
