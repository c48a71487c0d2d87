//! Column privatizer: per-value release over whole columns.
//!
//! Every cell is privatized independently, so the output keeps the input's
//! length and the position of every missing cell. The input is never
//! modified; a new column is returned.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::DpConfig;
use crate::domain::{
    BiasedChoice, Column, Dataset, Floors, MechanismKind, NumericCell, PrivacyParameters, Sensitivity,
    Value,
};
use crate::ports::{DpError, NoiseSource};
use crate::Result;

use super::mechanism::{randomize_category, Mechanism};

/// Which columns of a dataset to privatize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Every column
    WholeFile,
    /// The named columns; unknown names are skipped, an empty list means the
    /// first column
    Columns(Vec<String>),
}

impl Default for Scope {
    fn default() -> Self {
        Self::Columns(Vec::new())
    }
}

/// Parameters for a dataset privatization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivatizeRequest {
    /// Mechanism name; unknown names fall back to Laplace
    pub mechanism: String,

    /// Epsilon (config default when absent)
    pub epsilon: Option<f64>,

    /// Delta (config default when absent)
    pub delta: Option<f64>,

    /// Per-value sensitivity for numeric columns (1 when absent)
    pub sensitivity: Option<f64>,

    /// Columns to process
    #[serde(default)]
    pub scope: Scope,
}

impl PrivatizeRequest {
    pub fn new(mechanism: impl Into<String>) -> Self {
        Self {
            mechanism: mechanism.into(),
            epsilon: None,
            delta: None,
            sensitivity: None,
            scope: Scope::default(),
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

    #[must_use]
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }
}

/// A privatized dataset and the columns that were actually processed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrivatizedDataset {
    pub dataset: Dataset,
    pub columns_processed: Vec<String>,
}

/// Service for per-value column release.
pub struct ColumnPrivatizer<N: ?Sized> {
    noise: Arc<N>,
    choice: BiasedChoice,
    floors: Floors,
    default_epsilon: f64,
    default_delta: f64,
}

impl<N: NoiseSource + ?Sized> ColumnPrivatizer<N> {
    /// Create a privatizer with the process-wide configuration.
    pub fn new(noise: Arc<N>) -> Self {
        Self::with_config(noise, DpConfig::process())
    }

    /// Create a privatizer with custom configuration.
    pub fn with_config(noise: Arc<N>, config: &DpConfig) -> Self {
        Self {
            noise,
            choice: BiasedChoice::new(config.category_keep_probability),
            floors: config.mechanism_floors,
            default_epsilon: config.default_epsilon,
            default_delta: config.default_delta,
        }
    }

    /// Privatize one column, naming the mechanism as a caller would.
    ///
    /// Unknown mechanism names fall back to Laplace on this path.
    ///
    /// # Errors
    /// Returns error only if the noise source fails.
    pub fn privatize_column(&self, column: &Column, mechanism: &str, epsilon: f64, delta: f64) -> Result<Column> {
        let kind = MechanismKind::parse_lenient(mechanism);
        let params = PrivacyParameters::new(epsilon, delta).with_floors(self.floors);
        Ok(self.privatize_column_with(column, kind, params, Sensitivity::UNIT)?)
    }

    /// Privatize one column with a resolved mechanism and sensitivity.
    ///
    /// # Errors
    /// Returns error only if the noise source fails.
    pub fn privatize_column_with(
        &self,
        column: &Column,
        kind: MechanismKind,
        params: PrivacyParameters,
        sensitivity: Sensitivity,
    ) -> std::result::Result<Column, DpError> {
        let values = if column.is_numeric() {
            self.privatize_numeric(column, &Mechanism::new(kind, params, sensitivity))?
        } else {
            self.privatize_categorical(column)?
        };
        tracing::debug!(
            column = %column.name(),
            kind = %column.kind(),
            mechanism = %kind,
            rows = column.len(),
            "privatized column"
        );
        Ok(column.with_values(values))
    }

    fn privatize_numeric(&self, column: &Column, mechanism: &Mechanism) -> std::result::Result<Vec<Value>, DpError> {
        let mut invalid = 0usize;
        let mut out = Vec::with_capacity(column.len());
        for value in column.values() {
            out.push(match value.to_numeric() {
                NumericCell::Finite(x) => Value::Number(mechanism.randomize(x, &*self.noise)?),
                NumericCell::Missing => value.clone(),
                NumericCell::Invalid => {
                    invalid += 1;
                    value.clone()
                }
            });
        }
        if invalid > 0 {
            tracing::warn!(column = %column.name(), invalid, "non-numeric cells left unmodified");
        }
        Ok(out)
    }

    fn privatize_categorical(&self, column: &Column) -> std::result::Result<Vec<Value>, DpError> {
        let candidates = column.categories();
        column
            .values()
            .iter()
            .map(|value| {
                if value.is_missing() {
                    return Ok(value.clone());
                }
                randomize_category(value, &candidates, &self.choice, &*self.noise).cloned()
            })
            .collect()
    }

    /// Privatize the selected columns of a dataset.
    ///
    /// Unselected columns are copied unchanged. The result has the same
    /// columns in the same order as the input.
    ///
    /// # Errors
    /// Returns a validation error for an invalid sensitivity, or error if the
    /// noise source fails.
    pub fn privatize_dataset(&self, dataset: &Dataset, request: &PrivatizeRequest) -> Result<PrivatizedDataset> {
        let kind = MechanismKind::parse_lenient(&request.mechanism);
        let params = PrivacyParameters::new(
            request.epsilon.unwrap_or(self.default_epsilon),
            request.delta.unwrap_or(self.default_delta),
        )
        .with_floors(self.floors);
        let sensitivity = match request.sensitivity {
            Some(s) => Sensitivity::declared(s)?,
            None => Sensitivity::UNIT,
        };

        let selected = select_columns(dataset, &request.scope);
        let mut output = dataset.clone();
        let mut columns_processed = Vec::with_capacity(selected.len());

        for name in selected {
            let Some(column) = dataset.column(&name) else {
                tracing::debug!(column = %name, "selected column not in dataset, skipping");
                continue;
            };
            output.insert(self.privatize_column_with(column, kind, params, sensitivity)?);
            columns_processed.push(name);
        }

        tracing::info!(
            mechanism = %kind,
            epsilon = params.epsilon,
            columns = columns_processed.len(),
            "privatized dataset"
        );

        Ok(PrivatizedDataset {
            dataset: output,
            columns_processed,
        })
    }
}

fn select_columns(dataset: &Dataset, scope: &Scope) -> Vec<String> {
    match scope {
        Scope::WholeFile => dataset.column_names().into_iter().map(String::from).collect(),
        Scope::Columns(names) if names.is_empty() => dataset
            .column_names()
            .first()
            .map(|first| vec![(*first).to_string()])
            .unwrap_or_default(),
        Scope::Columns(names) => {
            let mut unique: Vec<String> = Vec::with_capacity(names.len());
            for name in names {
                if !unique.contains(name) {
                    unique.push(name.clone());
                }
            }
            unique
        }
    }
}
