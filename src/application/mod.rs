//! Application layer: Mechanisms and the services built on them.
//!
//! Two release modes share one [`Mechanism`]:
//! - per-value: [`ColumnPrivatizer`] noises every cell of a column
//! - per-aggregate: [`QueryService`] noises one statistic
//!
//! The free functions below are the narrow surface offered to callers that
//! do not want to hold a service.

mod column;
mod comparison;
mod mechanism;
mod query;
mod scalar;

use std::sync::Arc;

pub use column::{ColumnPrivatizer, PrivatizeRequest, PrivatizedDataset, Scope};
pub use comparison::{
    compare_columns, CategoricalComparison, CategoryCount, ColumnComparison, NumericComparison,
    MISSING_LABEL, NUMERIC_BINS, TOP_CATEGORIES,
};
pub use mechanism::{privatize_scalar, randomize_category, Mechanism};
pub use query::{QueryRequest, QueryService};
pub use scalar::{
    dp_count, dp_count_with, dp_sum, dp_sum_with, laplace_noise, laplace_noise_with,
    DEFAULT_SUM_SENSITIVITY,
};

use crate::domain::{Column, Dataset, QueryResult};
use crate::ports::NoiseSource;
use crate::Result;

/// Privatize one column value by value.
///
/// Unknown mechanism names fall back to Laplace. The caller supplies the
/// noise source and so decides between secure and statistical randomness.
///
/// # Errors
/// Returns error only if the noise source fails.
pub fn privatize_column<N: NoiseSource + ?Sized>(
    column: &Column,
    mechanism: &str,
    epsilon: f64,
    delta: f64,
    noise: &N,
) -> Result<Column> {
    let privatizer = ColumnPrivatizer::new(Arc::new(NoiseRef(noise)));
    privatizer.privatize_column(column, mechanism, epsilon, delta)
}

/// Run one aggregate query with strict name validation.
///
/// # Errors
/// See [`QueryService::run`].
pub fn run_query<N: NoiseSource + ?Sized>(
    column: &Column,
    operation: &str,
    mechanism: &str,
    epsilon: f64,
    delta: f64,
    noise: &N,
) -> Result<QueryResult> {
    let service = QueryService::new(Arc::new(NoiseRef(noise)));
    let request = QueryRequest::new(operation, mechanism).epsilon(epsilon).delta(delta);
    service.run(column, &request)
}

/// [`run_query`] against a named column of a dataset.
///
/// # Errors
/// Returns a validation error if the column does not exist, plus every error
/// [`run_query`] can return.
pub fn run_dataset_query<N: NoiseSource + ?Sized>(
    dataset: &Dataset,
    column: &str,
    request: &QueryRequest,
    noise: &N,
) -> Result<QueryResult> {
    QueryService::new(Arc::new(NoiseRef(noise))).run_on_dataset(dataset, column, request)
}

/// Borrowed noise source, so the one-shot helpers need not own one.
struct NoiseRef<'a, N: ?Sized>(&'a N);

impl<N: NoiseSource + ?Sized> NoiseSource for NoiseRef<'_, N> {
    fn kind(&self) -> crate::ports::SourceKind {
        self.0.kind()
    }

    fn laplace(&self, scale: f64) -> std::result::Result<f64, crate::ports::DpError> {
        self.0.laplace(scale)
    }

    fn gaussian(&self, sigma: f64) -> std::result::Result<f64, crate::ports::DpError> {
        self.0.gaussian(sigma)
    }

    fn biased_pick(
        &self,
        choice: &crate::domain::BiasedChoice,
        candidates: usize,
    ) -> std::result::Result<Option<usize>, crate::ports::DpError> {
        self.0.biased_pick(choice, candidates)
    }
}
