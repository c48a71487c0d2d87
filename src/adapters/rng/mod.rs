//! RNG adapters: Implementations of NoiseSource.
//!
//! Two generators are provided and the caller picks one explicitly:
//!
//! - [`SecureNoise`]: ChaCha20 CSPRNG seeded from OS entropy. Backs the scalar
//!   DP utilities and is the default for queries.
//! - [`StatisticalNoise`]: the standard `StdRng`. Acceptable for bulk
//!   per-value column release where throughput matters, but a deployment
//!   that claims formal privacy should not rely on it alone.
//!
//! # Mutex Behavior
//!
//! The generator sits behind a `Mutex`. A poisoned mutex (from a panic in
//! another thread) fails closed by returning [`DpError::RngUnavailable`]; no
//! value is released without noise.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::domain::{sampling, BiasedChoice};
use crate::ports::{DpError, NoiseSource, SourceKind};

/// A generator that can back a [`NoiseSource`].
pub trait NoiseRng: RngCore + SeedableRng + Send + 'static {
    /// Strength reported for sources built on this generator.
    const KIND: SourceKind;
}

impl NoiseRng for ChaCha20Rng {
    const KIND: SourceKind = SourceKind::Secure;
}

impl NoiseRng for StdRng {
    const KIND: SourceKind = SourceKind::Statistical;
}

/// Noise source over a shared, lock-protected generator.
///
/// Cloning shares the generator.
pub struct RngNoise<R: NoiseRng> {
    rng: Arc<Mutex<R>>,
}

/// CSPRNG-backed noise source.
pub type SecureNoise = RngNoise<ChaCha20Rng>;

/// Statistical-RNG-backed noise source.
pub type StatisticalNoise = RngNoise<StdRng>;

impl<R: NoiseRng> RngNoise<R> {
    /// Create a source seeded from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(R::from_entropy())
    }

    /// Create a reproducible source from a 64-bit seed.
    ///
    /// Only for tests and reproducible experiments: a known seed removes
    /// every privacy guarantee.
    #[must_use]
    pub fn from_seed_u64(seed: u64) -> Self {
        tracing::warn!(kind = %R::KIND, "noise source seeded deterministically");
        Self::with_rng(R::seed_from_u64(seed))
    }

    fn with_rng(rng: R) -> Self {
        Self {
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    fn draw<T>(&self, f: impl FnOnce(&mut R) -> T) -> Result<T, DpError> {
        let mut rng = self.rng.lock().map_err(|_| DpError::RngUnavailable)?;
        Ok(f(&mut *rng))
    }
}

impl<R: NoiseRng> Default for RngNoise<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: NoiseRng> Clone for RngNoise<R> {
    fn clone(&self) -> Self {
        Self {
            rng: Arc::clone(&self.rng),
        }
    }
}

fn check_scale(scale: f64) -> Result<(), DpError> {
    if scale.is_finite() && scale >= 0.0 {
        Ok(())
    } else {
        tracing::error!("Invalid noise scale: {scale}. Refusing to release statistic.");
        Err(DpError::InvalidScale(scale))
    }
}

impl<R: NoiseRng> NoiseSource for RngNoise<R> {
    fn kind(&self) -> SourceKind {
        R::KIND
    }

    fn laplace(&self, scale: f64) -> Result<f64, DpError> {
        check_scale(scale)?;
        self.draw(|rng| sampling::laplace_sample(rng, scale))
    }

    fn gaussian(&self, sigma: f64) -> Result<f64, DpError> {
        check_scale(sigma)?;
        self.draw(|rng| sampling::gaussian_sample(rng, sigma))
    }

    fn biased_pick(&self, choice: &BiasedChoice, candidates: usize) -> Result<Option<usize>, DpError> {
        self.draw(|rng| choice.pick(rng, candidates))
    }
}

impl<N: NoiseSource + ?Sized> NoiseSource for Box<N> {
    fn kind(&self) -> SourceKind {
        (**self).kind()
    }

    fn laplace(&self, scale: f64) -> Result<f64, DpError> {
        (**self).laplace(scale)
    }

    fn gaussian(&self, sigma: f64) -> Result<f64, DpError> {
        (**self).gaussian(sigma)
    }

    fn biased_pick(&self, choice: &BiasedChoice, candidates: usize) -> Result<Option<usize>, DpError> {
        (**self).biased_pick(choice, candidates)
    }
}

/// Build a boxed source of the requested kind, optionally seeded.
#[must_use]
pub fn noise_source(kind: SourceKind, seed: Option<u64>) -> Box<dyn NoiseSource> {
    match (kind, seed) {
        (SourceKind::Secure, None) => Box::new(SecureNoise::new()),
        (SourceKind::Secure, Some(seed)) => Box::new(SecureNoise::from_seed_u64(seed)),
        (SourceKind::Statistical, None) => Box::new(StatisticalNoise::new()),
        (SourceKind::Statistical, Some(seed)) => Box::new(StatisticalNoise::from_seed_u64(seed)),
    }
}
