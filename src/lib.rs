//! # dpshield
//!
//! Differential-privacy mechanism layer for tabular data.
//!
//! This crate provides:
//! - Laplace, Gaussian and randomized-response noise over any random source
//! - Per-value privatization of numeric and categorical columns
//! - Noisy aggregate queries (count, sum, mean, histogram, full column)
//! - A small JSON-in / JSON-out CLI
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (columns, parameters, sensitivity, samplers)
//! - `ports`: Trait definitions for random sources
//! - `adapters`: Concrete implementations (ChaCha20, StdRng)
//! - `application`: Mechanisms and the services built on them
//! - `cli`: Command-line front end

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::{
    dp_count, dp_sum, laplace_noise, privatize_column, run_dataset_query, run_query,
    DEFAULT_SUM_SENSITIVITY,
};
pub use config::DpConfig;
pub use domain::{Column, Dataset, QueryResult, QueryValue, Value};

/// Result type for dpshield operations
pub type Result<T> = std::result::Result<T, DpShieldError>;

/// Main error type for dpshield
#[derive(Debug, thiserror::Error)]
pub enum DpShieldError {
    #[error("Invalid request: {0}")]
    Validation(#[from] domain::ValidationError),

    #[error("Privacy error: {0}")]
    Privacy(#[from] ports::DpError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DpShieldError {
    /// Whether the caller supplied something unusable, as opposed to a
    /// failure inside the layer.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
