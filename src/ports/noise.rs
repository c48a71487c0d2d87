//! Noise port: Trait for the random source behind every mechanism.
//!
//! This trait abstracts the random generator from the mechanisms, so that the
//! caller decides explicitly whether a release is backed by a CSPRNG or a
//! statistical generator.

use serde::{Deserialize, Serialize};

use crate::domain::BiasedChoice;

/// Errors that can occur while drawing noise.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DpError {
    #[error("Invalid noise scale: {0}")]
    InvalidScale(f64),

    #[error("DP RNG unavailable")]
    RngUnavailable,
}

/// Strength of the entropy behind a noise source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Cryptographically strong generator (ChaCha20)
    Secure,
    /// Standard statistical generator; not suitable for formal DP claims
    Statistical,
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "secure" => Ok(Self::Secure),
            "statistical" => Ok(Self::Statistical),
            other => Err(format!("unknown noise source {other:?} (expected secure or statistical)")),
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Secure => write!(f, "secure"),
            Self::Statistical => write!(f, "statistical"),
        }
    }
}

/// Trait for random noise sources.
///
/// Implementations must be shareable across threads; each draw is
/// independent.
pub trait NoiseSource: Send + Sync {
    /// Which kind of generator backs this source.
    fn kind(&self) -> SourceKind;

    /// Draw zero-centred Laplace noise.
    ///
    /// # Arguments
    /// * `scale` - Laplace scale `b` (sensitivity / epsilon)
    ///
    /// # Errors
    /// Fails if the scale is negative or not finite, or if the generator is
    /// unavailable.
    fn laplace(&self, scale: f64) -> Result<f64, DpError>;

    /// Draw zero-centred Gaussian noise.
    ///
    /// # Arguments
    /// * `sigma` - Standard deviation
    ///
    /// # Errors
    /// Fails if sigma is negative or not finite, or if the generator is
    /// unavailable.
    fn gaussian(&self, sigma: f64) -> Result<f64, DpError>;

    /// Run a biased choice over `candidates` items.
    ///
    /// # Returns
    /// `None` to keep the original value, else the index of the replacement.
    ///
    /// # Errors
    /// Fails if the generator is unavailable.
    fn biased_pick(&self, choice: &BiasedChoice, candidates: usize) -> Result<Option<usize>, DpError>;
}
