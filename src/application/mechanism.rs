//! Scalar and categorical mechanisms.
//!
//! A [`Mechanism`] binds a kind to (ε, δ) and a sensitivity. The same value
//! drives both release modes: the column privatizer calls it once per cell,
//! the query dispatcher once per aggregate.

use crate::domain::{sampling, BiasedChoice, MechanismKind, PrivacyParameters, Sensitivity};
use crate::ports::{DpError, NoiseSource};

/// A configured noise mechanism.
///
/// ε and δ are clamped to their floors once, when the mechanism is built, so
/// a degenerate request is reported once however many values it noises.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mechanism {
    kind: MechanismKind,
    params: PrivacyParameters,
    sensitivity: Sensitivity,
    epsilon: f64,
    delta: f64,
}

impl Mechanism {
    #[must_use]
    pub fn new(kind: MechanismKind, params: PrivacyParameters, sensitivity: Sensitivity) -> Self {
        Self {
            kind,
            params,
            sensitivity,
            epsilon: params.effective_epsilon(),
            delta: params.effective_delta(),
        }
    }

    /// Requested kind (before the numeric fallback).
    #[must_use]
    pub fn kind(&self) -> MechanismKind {
        self.kind
    }

    #[must_use]
    pub fn params(&self) -> PrivacyParameters {
        self.params
    }

    #[must_use]
    pub fn sensitivity(&self) -> Sensitivity {
        self.sensitivity
    }

    /// Same mechanism with a different sensitivity.
    #[must_use]
    pub fn with_sensitivity(self, sensitivity: Sensitivity) -> Self {
        Self { sensitivity, ..self }
    }

    /// Floored epsilon used for calibration.
    #[must_use]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Floored delta used for calibration.
    #[must_use]
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Laplace scale `Δ / max(ε, floor)`.
    #[must_use]
    pub fn laplace_scale(&self) -> f64 {
        self.sensitivity.value() / self.epsilon
    }

    /// Gaussian standard deviation for the floored (ε, δ).
    #[must_use]
    pub fn gaussian_sigma(&self) -> f64 {
        sampling::gaussian_sigma(self.epsilon, self.delta, self.sensitivity.value())
    }

    /// Add calibrated noise to a numeric value.
    ///
    /// Exponential falls back to Laplace: the biased choice is only defined
    /// over categories.
    ///
    /// # Errors
    /// Returns error only if the noise source fails.
    pub fn randomize<N: NoiseSource + ?Sized>(&self, value: f64, noise: &N) -> Result<f64, DpError> {
        let draw = match self.kind.numeric() {
            MechanismKind::Gaussian => noise.gaussian(self.gaussian_sigma())?,
            _ => noise.laplace(self.laplace_scale())?,
        };
        Ok(value + draw)
    }
}

/// Apply the biased choice to a categorical value.
///
/// Categorical values always go through the biased choice whatever mechanism
/// was requested: additive noise has no meaning on categories, and the choice
/// does not depend on ε, δ or sensitivity.
///
/// # Errors
/// Returns error only if the noise source fails.
pub fn randomize_category<'a, T, N: NoiseSource + ?Sized>(
    value: &'a T,
    candidates: &'a [T],
    choice: &BiasedChoice,
    noise: &N,
) -> Result<&'a T, DpError> {
    Ok(match noise.biased_pick(choice, candidates.len())? {
        Some(i) => &candidates[i],
        None => value,
    })
}

/// Noise a single true value.
///
/// Degenerate ε/δ are clamped to their floors rather than rejected.
///
/// # Errors
/// Returns error only if the noise source fails.
pub fn privatize_scalar<N: NoiseSource + ?Sized>(
    true_value: f64,
    kind: MechanismKind,
    params: PrivacyParameters,
    sensitivity: Sensitivity,
    noise: &N,
) -> Result<f64, DpError> {
    Mechanism::new(kind, params, sensitivity).randomize(true_value, noise)
}
