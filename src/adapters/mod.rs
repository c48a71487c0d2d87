//! Adapters layer: Concrete implementations of ports.
//!
//! - `rng`: ChaCha20 (secure) and `StdRng` (statistical) noise sources

pub mod rng;

pub use rng::{noise_source, NoiseRng, RngNoise, SecureNoise, StatisticalNoise};
