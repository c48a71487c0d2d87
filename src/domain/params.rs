//! Privacy parameters and the floors that keep them usable.
//!
//! Degenerate parameters are never an error at this layer: epsilon and delta
//! are clamped to a positive floor before any division or logarithm, and the
//! clamp is reported as a warning. Callers that need strict rejection must
//! validate before calling.

use serde::{Deserialize, Serialize};

/// Epsilon floor for the scalar DP utilities (`dp_count`, `dp_sum`).
pub const SCALAR_EPSILON_FLOOR: f64 = 1e-6;

/// Epsilon floor for column privatization and query dispatch.
pub const MECHANISM_EPSILON_FLOOR: f64 = 1e-12;

/// Delta floor applied before the Gaussian calibration log.
pub const DELTA_FLOOR: f64 = 1e-12;

/// Process-wide default epsilon.
pub const DEFAULT_EPSILON: f64 = 1.0;

/// Per-call default delta.
pub const DEFAULT_DELTA: f64 = 1e-5;

/// Lower bounds applied to epsilon and delta before they are used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Floors {
    /// Minimum effective epsilon
    pub epsilon: f64,
    /// Minimum effective delta
    pub delta: f64,
}

impl Floors {
    /// Floors used by `dp_count` / `dp_sum`.
    pub const SCALAR: Floors = Floors {
        epsilon: SCALAR_EPSILON_FLOOR,
        delta: DELTA_FLOOR,
    };

    /// Floors used by the column privatizer and the query dispatcher.
    pub const MECHANISM: Floors = Floors {
        epsilon: MECHANISM_EPSILON_FLOOR,
        delta: DELTA_FLOOR,
    };
}

impl Default for Floors {
    fn default() -> Self {
        Self::MECHANISM
    }
}

/// (ε, δ) as supplied by the caller, plus the floors used to sanitize them.
///
/// The raw values are kept so that results can report what was asked for;
/// use [`PrivacyParameters::effective_epsilon`] and
/// [`PrivacyParameters::effective_delta`] for arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrivacyParameters {
    /// Requested privacy-loss budget
    pub epsilon: f64,

    /// Requested failure probability (Gaussian mechanism only)
    pub delta: f64,

    /// Floors applied before use
    #[serde(default)]
    pub floors: Floors,
}

impl PrivacyParameters {
    /// Create parameters with the mechanism floors.
    #[must_use]
    pub fn new(epsilon: f64, delta: f64) -> Self {
        Self {
            epsilon,
            delta,
            floors: Floors::MECHANISM,
        }
    }

    /// Create parameters with the default delta.
    #[must_use]
    pub fn with_epsilon(epsilon: f64) -> Self {
        Self::new(epsilon, DEFAULT_DELTA)
    }

    /// Replace the floors for this call.
    #[must_use]
    pub fn with_floors(mut self, floors: Floors) -> Self {
        self.floors = floors;
        self
    }

    /// Epsilon clamped up to the floor.
    #[must_use]
    pub fn effective_epsilon(&self) -> f64 {
        clamp_epsilon(self.epsilon, self.floors.epsilon)
    }

    /// Delta clamped up to the floor, kept strictly below 1.
    #[must_use]
    pub fn effective_delta(&self) -> f64 {
        clamp_delta(self.delta, self.floors.delta)
    }
}

impl Default for PrivacyParameters {
    fn default() -> Self {
        Self::new(DEFAULT_EPSILON, DEFAULT_DELTA)
    }
}

/// Clamp epsilon to `floor`. NaN is treated as degenerate.
#[must_use]
pub fn clamp_epsilon(epsilon: f64, floor: f64) -> f64 {
    if epsilon >= floor {
        return epsilon;
    }
    if !(epsilon > 0.0) {
        tracing::warn!(epsilon, floor, "degenerate epsilon clamped to floor");
    } else {
        tracing::debug!(epsilon, floor, "epsilon below floor clamped");
    }
    floor
}

/// Clamp delta into `[floor, 1)`. NaN is treated as degenerate.
#[must_use]
pub fn clamp_delta(delta: f64, floor: f64) -> f64 {
    if !(delta > 0.0) {
        tracing::warn!(delta, floor, "degenerate delta clamped to floor");
        return floor;
    }
    if delta >= 1.0 {
        tracing::warn!(delta, "delta must be below 1; clamped");
        return 1.0 - f64::EPSILON;
    }
    delta.max(floor)
}
