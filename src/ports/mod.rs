//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the mechanisms and the random sources that feed them.

mod noise;

pub use noise::{DpError, NoiseSource, SourceKind};
