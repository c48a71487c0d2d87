//! Noise sampling primitives.
//!
//! These are pure functions of a caller-supplied random generator. Which
//! generator backs them (CSPRNG or statistical) is decided by the noise
//! source adapter, not here.

use rand::Rng;
use rand_distr::StandardNormal;

/// Probability that [`BiasedChoice`] keeps the original value.
pub const DEFAULT_KEEP_PROBABILITY: f64 = 0.7;

/// Uniform variate on the open interval (-0.5, 0.5).
///
/// The lower endpoint is rejected so that `ln(1 - 2|u|)` stays finite.
pub fn symmetric_uniform<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    loop {
        let u = rng.gen::<f64>() - 0.5;
        if u > -0.5 {
            return u;
        }
    }
}

/// Zero-centred Laplace noise with scale `b`, via the inverse CDF:
/// `-b * sign(u) * ln(1 - 2|u|)`.
///
/// Variance is `2b²`.
pub fn laplace_sample<R: Rng + ?Sized>(rng: &mut R, scale: f64) -> f64 {
    let u = symmetric_uniform(rng);
    -scale * u.signum() * (1.0 - 2.0 * u.abs()).ln()
}

/// Zero-centred Gaussian noise with standard deviation `sigma`.
pub fn gaussian_sample<R: Rng + ?Sized>(rng: &mut R, sigma: f64) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    z * sigma
}

/// Classic Gaussian-mechanism calibration:
/// `sigma = sqrt(2 ln(1.25 / δ)) * Δ / ε`.
///
/// Expects `epsilon` and `delta` already floored.
#[must_use]
pub fn gaussian_sigma(epsilon: f64, delta: f64, sensitivity: f64) -> f64 {
    (2.0 * (1.25 / delta).ln()).sqrt() * (sensitivity / epsilon)
}

/// Randomized response over a candidate set.
///
/// With probability `keep_probability` the original value is kept; otherwise
/// a uniformly random candidate is returned (possibly the original again).
///
/// This is exposed to callers as the "exponential" mechanism but it is NOT
/// the score-based exponential mechanism and carries no formal ε guarantee:
/// the keep probability does not depend on ε.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiasedChoice {
    keep_probability: f64,
}

impl BiasedChoice {
    /// `keep_probability` is clamped into `[0, 1]`; NaN falls back to the
    /// default.
    #[must_use]
    pub fn new(keep_probability: f64) -> Self {
        let keep_probability = if keep_probability.is_nan() {
            DEFAULT_KEEP_PROBABILITY
        } else {
            keep_probability.clamp(0.0, 1.0)
        };
        Self { keep_probability }
    }

    #[must_use]
    pub fn keep_probability(&self) -> f64 {
        self.keep_probability
    }

    /// Index of the replacement candidate, or `None` to keep the original.
    ///
    /// An empty candidate set always keeps the original.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R, candidates: usize) -> Option<usize> {
        if candidates == 0 || rng.gen::<f64>() < self.keep_probability {
            return None;
        }
        Some(rng.gen_range(0..candidates))
    }

    /// Apply the choice to a value.
    pub fn choose<'a, T, R: Rng + ?Sized>(&self, rng: &mut R, value: &'a T, candidates: &'a [T]) -> &'a T {
        match self.pick(rng, candidates.len()) {
            Some(i) => &candidates[i],
            None => value,
        }
    }
}

impl Default for BiasedChoice {
    fn default() -> Self {
        Self::new(DEFAULT_KEEP_PROBABILITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_symmetric_uniform_bounds() {
        let mut rng = ChaCha20Rng::from_seed([3u8; 32]);
        for _ in 0..10_000 {
            let u = symmetric_uniform(&mut rng);
            assert!(u > -0.5 && u < 0.5);
        }
    }

    #[test]
    fn test_laplace_sample_finite() {
        let mut rng = ChaCha20Rng::from_seed([5u8; 32]);
        for _ in 0..10_000 {
            assert!(laplace_sample(&mut rng, 2.0).is_finite());
        }
        assert_eq!(laplace_sample(&mut rng, 0.0), 0.0);
    }

    #[test]
    fn test_gaussian_sigma_calibration() {
        let sigma = gaussian_sigma(1.0, 1e-5, 1.0);
        let expected = (2.0 * (1.25f64 / 1e-5).ln()).sqrt();
        assert!((sigma - expected).abs() < 1e-12);

        // Halving epsilon doubles sigma
        assert!((gaussian_sigma(0.5, 1e-5, 1.0) - 2.0 * sigma).abs() < 1e-9);
    }

    #[test]
    fn test_biased_choice_extremes() {
        let mut rng = ChaCha20Rng::from_seed([9u8; 32]);
        let candidates = ["a", "b", "c"];

        let always_keep = BiasedChoice::new(1.0);
        let never_keep = BiasedChoice::new(0.0);
        for _ in 0..100 {
            assert_eq!(*always_keep.choose(&mut rng, &"z", &candidates), "z");
            assert_ne!(*never_keep.choose(&mut rng, &"z", &candidates), "z");
        }

        assert_eq!(*never_keep.choose(&mut rng, &"z", &[]), "z");
    }

    #[test]
    fn test_biased_choice_keep_rate() {
        let mut rng = ChaCha20Rng::from_seed([11u8; 32]);
        let choice = BiasedChoice::default();
        let n = 20_000;
        let kept = (0..n).filter(|_| choice.pick(&mut rng, 4).is_none()).count();
        let rate = kept as f64 / n as f64;
        assert!((rate - 0.7).abs() < 0.02, "keep rate {rate}");
    }
}
