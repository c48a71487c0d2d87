//! Domain layer: Core types and pure logic.
//!
//! Everything here is a transient value type: parameters, columns, query
//! results and the noise-sampling math. Nothing in this layer owns a random
//! source or touches I/O.

mod column;
mod mechanism;
mod params;
mod query;
pub mod sampling;
mod sensitivity;
mod validation;

pub(crate) use column::number_key;
pub use column::{Column, ColumnKind, Dataset, NumericCell, Value};
pub use mechanism::{MechanismKind, Operation};
pub use params::{
    clamp_delta, clamp_epsilon, Floors, PrivacyParameters, DEFAULT_DELTA, DEFAULT_EPSILON,
    DELTA_FLOOR, MECHANISM_EPSILON_FLOOR, SCALAR_EPSILON_FLOOR,
};
pub use query::{QueryResult, QueryValue};
pub use sampling::{BiasedChoice, DEFAULT_KEEP_PROBABILITY};
pub use sensitivity::Sensitivity;
pub use validation::ValidationError;
