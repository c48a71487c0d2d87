//! Scalar DP utilities: noisy count and sum over plain sequences.
//!
//! These always draw from a cryptographically strong source. The plain
//! functions share one process-wide [`SecureNoise`]; the `_with` variants
//! take an explicit source. Floors come from [`DpConfig::process`].

use std::sync::OnceLock;

use crate::adapters::SecureNoise;
use crate::config::DpConfig;
use crate::domain::{MechanismKind, PrivacyParameters, Sensitivity};
use crate::ports::NoiseSource;
use crate::Result;

use super::mechanism::privatize_scalar;

/// Sensitivity assumed by [`dp_sum`] when the caller has no better bound.
pub const DEFAULT_SUM_SENSITIVITY: f64 = 1.0;

static SECURE_SOURCE: OnceLock<SecureNoise> = OnceLock::new();

fn secure_source() -> &'static SecureNoise {
    SECURE_SOURCE.get_or_init(SecureNoise::new)
}

fn scalar_params(epsilon: f64) -> PrivacyParameters {
    PrivacyParameters::with_epsilon(epsilon).with_floors(DpConfig::process().scalar_floors)
}

/// Draw Laplace(0, scale) noise from the CSPRNG.
///
/// # Errors
/// Returns error if `scale` is negative or not finite.
pub fn laplace_noise(scale: f64) -> Result<f64> {
    laplace_noise_with(scale, secure_source())
}

/// [`laplace_noise`] with an explicit source.
///
/// # Errors
/// Returns error if `scale` is invalid or the source fails.
pub fn laplace_noise_with<N: NoiseSource + ?Sized>(scale: f64, noise: &N) -> Result<f64> {
    Ok(noise.laplace(scale)?)
}

/// Noisy count of `items` (sensitivity 1).
///
/// # Errors
/// Returns error only if the noise source fails.
pub fn dp_count<I: IntoIterator>(items: I, epsilon: f64) -> Result<f64> {
    dp_count_with(items, epsilon, secure_source())
}

/// [`dp_count`] with an explicit source.
///
/// # Errors
/// Returns error only if the noise source fails.
pub fn dp_count_with<I: IntoIterator, N: NoiseSource + ?Sized>(
    items: I,
    epsilon: f64,
    noise: &N,
) -> Result<f64> {
    let true_count = items.into_iter().count() as f64;
    Ok(privatize_scalar(
        true_count,
        MechanismKind::Laplace,
        scalar_params(epsilon),
        Sensitivity::UNIT,
        noise,
    )?)
}

/// Noisy sum of `values` with a caller-declared sensitivity.
///
/// # Errors
/// Returns a validation error if `sensitivity` is not positive and finite.
pub fn dp_sum<I: IntoIterator<Item = f64>>(values: I, epsilon: f64, sensitivity: f64) -> Result<f64> {
    dp_sum_with(values, epsilon, sensitivity, secure_source())
}

/// [`dp_sum`] with an explicit source.
///
/// # Errors
/// Returns error if `sensitivity` is invalid or the source fails.
pub fn dp_sum_with<I: IntoIterator<Item = f64>, N: NoiseSource + ?Sized>(
    values: I,
    epsilon: f64,
    sensitivity: f64,
    noise: &N,
) -> Result<f64> {
    let sensitivity = Sensitivity::declared(sensitivity)?;
    let true_sum: f64 = values.into_iter().sum();
    Ok(privatize_scalar(
        true_sum,
        MechanismKind::Laplace,
        scalar_params(epsilon),
        sensitivity,
        noise,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DpShieldError;

    #[test]
    fn test_laplace_noise() {
        let noisy = laplace_noise(1.0).expect("DP noise should work");
        assert!(noisy.is_finite());
        assert!(laplace_noise(-1.0).is_err());
    }

    #[test]
    fn test_dp_count_zero_epsilon() {
        let noise = SecureNoise::from_seed_u64(3);
        // Clamped to the scalar floor: scale 1e6, still finite
        let noisy = dp_count_with(Vec::<u8>::new(), 0.0, &noise).expect("DP noise should work");
        assert!(noisy.is_finite());
    }

    #[test]
    fn test_dp_sum_rejects_bad_sensitivity() {
        let err = dp_sum([1.0, 2.0], 1.0, 0.0).expect_err("zero sensitivity must fail");
        assert!(matches!(err, DpShieldError::Validation(_)));
    }

    #[test]
    fn test_dp_sum_large_epsilon_is_close() {
        let noise = SecureNoise::from_seed_u64(8);
        let noisy = dp_sum_with([5.0, 7.0, 3.0, 9.0, 2.0, 10.0, 4.0], 1e6, 10.0, &noise)
            .expect("DP noise should work");
        assert!((noisy - 40.0).abs() < 0.01);
    }
}
