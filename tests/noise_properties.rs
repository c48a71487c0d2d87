//! Statistical properties of the noise sources.
//!
//! Each check compares a sample moment with its expectation and allows a
//! handful of standard errors. Sources are seeded so the suite is
//! reproducible.

use dpshield::adapters::{SecureNoise, StatisticalNoise};
use dpshield::domain::sampling::gaussian_sigma;
use dpshield::ports::NoiseSource;

const N: usize = 20_000;

/// Compute sample mean
fn compute_mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Compute sample variance
fn compute_variance(samples: &[f64]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let mean = compute_mean(samples);
    let sum_sq: f64 = samples.iter().map(|x| (x - mean).powi(2)).sum();
    sum_sq / (samples.len() - 1) as f64
}

fn draw(n: usize, f: impl Fn() -> f64) -> Vec<f64> {
    (0..n).map(|_| f()).collect()
}

#[test]
fn test_laplace_mean_approximately_zero() {
    let noise = SecureNoise::from_seed_u64(101);
    let scale = 2.0;
    let samples = draw(N, || noise.laplace(scale).expect("laplace draw"));

    let mean = compute_mean(&samples);
    let se = (2.0 * scale * scale / N as f64).sqrt();
    assert!(mean.abs() < 5.0 * se, "Laplace mean {mean} should be close to 0 (SE = {se})");
}

#[test]
fn test_laplace_variance_is_two_scale_squared() {
    let noise = StatisticalNoise::from_seed_u64(102);
    let scale = 1.5;
    let samples = draw(N, || noise.laplace(scale).expect("laplace draw"));

    let variance = compute_variance(&samples);
    let expected = 2.0 * scale * scale;
    // Fourth central moment of Laplace is 24 b^4
    let se = ((24.0 - 4.0) * scale.powi(4) / N as f64).sqrt();
    assert!(
        (variance - expected).abs() < 6.0 * se,
        "Laplace variance {variance} should be close to {expected} (SE = {se})"
    );
}

#[test]
fn test_laplace_symmetric() {
    let noise = SecureNoise::from_seed_u64(103);
    let samples = draw(N, || noise.laplace(1.0).expect("laplace draw"));

    let positive = samples.iter().filter(|x| **x > 0.0).count() as f64 / N as f64;
    assert!((positive - 0.5).abs() < 0.02, "positive fraction {positive}");
}

#[test]
fn test_gaussian_moments() {
    let noise = SecureNoise::from_seed_u64(104);
    let sigma = 2.0;
    let samples = draw(N, || noise.gaussian(sigma).expect("gaussian draw"));

    let mean = compute_mean(&samples);
    let std = compute_variance(&samples).sqrt();
    let se_mean = sigma / (N as f64).sqrt();
    let se_std = sigma / (2.0 * N as f64).sqrt();

    assert!(mean.abs() < 5.0 * se_mean, "Gaussian mean {mean}");
    assert!((std - sigma).abs() < 5.0 * se_std, "Gaussian std {std}");

    // About 68.27% within one sigma
    let within = samples.iter().filter(|x| x.abs() <= sigma).count() as f64 / N as f64;
    assert!((within - 0.6827).abs() < 0.02, "fraction within 1 sigma {within}");
}

#[test]
fn test_gaussian_sigma_calibration() {
    let sigma = gaussian_sigma(1.0, 1e-5, 1.0);
    let expected = (2.0 * (1.25f64 / 1e-5).ln()).sqrt();
    assert!((sigma - expected).abs() < 1e-12);
    assert!((sigma - 4.8448).abs() < 1e-3);

    // Linear in sensitivity, inverse in epsilon
    assert!((gaussian_sigma(0.5, 1e-5, 3.0) - 6.0 * sigma).abs() < 1e-9);
}

#[test]
fn test_zero_scale_is_exact() {
    let noise = SecureNoise::from_seed_u64(105);
    assert_eq!(noise.laplace(0.0).expect("laplace draw"), 0.0);
    assert_eq!(noise.gaussian(0.0).expect("gaussian draw"), 0.0);
}
