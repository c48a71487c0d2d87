//! Validation failures surfaced to callers.

/// A request that cannot be served as asked.
///
/// These are never recovered inside the mechanism layer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Unknown mechanism: {0:?} (expected laplace, gaussian or exponential)")]
    UnknownMechanism(String),

    #[error("Unsupported operation: {0:?} (expected mean, sum, count, histogram or full_column)")]
    UnknownOperation(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column {column} must be numeric for {operation}")]
    NonNumericColumn { column: String, operation: String },

    #[error("Invalid sensitivity: {0} (must be positive and finite)")]
    InvalidSensitivity(f64),
}
