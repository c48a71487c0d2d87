//! Process-wide defaults for the mechanism layer.
//!
//! Every value here is a default that individual calls may override.

use std::sync::OnceLock;

use crate::domain::{
    Floors, DEFAULT_DELTA, DEFAULT_EPSILON, DEFAULT_KEEP_PROBABILITY, DELTA_FLOOR,
    MECHANISM_EPSILON_FLOOR, SCALAR_EPSILON_FLOOR,
};
use crate::ports::SourceKind;

/// Configuration for differential privacy.
#[derive(Debug, Clone, PartialEq)]
pub struct DpConfig {
    /// Default epsilon per query
    pub default_epsilon: f64,

    /// Default delta per query
    pub default_delta: f64,

    /// Floors used by the column privatizer and query dispatcher
    pub mechanism_floors: Floors,

    /// Floors used by `dp_count` / `dp_sum`
    pub scalar_floors: Floors,

    /// Probability that a categorical value is kept as-is
    pub category_keep_probability: f64,

    /// Generator used when the caller does not pick one
    pub noise_source: SourceKind,
}

impl Default for DpConfig {
    fn default() -> Self {
        Self {
            default_epsilon: DEFAULT_EPSILON,
            default_delta: DEFAULT_DELTA,
            mechanism_floors: Floors::MECHANISM,
            scalar_floors: Floors::SCALAR,
            category_keep_probability: DEFAULT_KEEP_PROBABILITY,
            noise_source: SourceKind::Secure,
        }
    }
}

static PROCESS_CONFIG: OnceLock<DpConfig> = OnceLock::new();

fn positive_from_env(keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| std::env::var(key).ok())
        .find_map(|v| v.trim().parse::<f64>().ok().filter(|x| x.is_finite() && *x > 0.0))
}

impl DpConfig {
    /// Process-wide configuration, read from the environment on first use.
    ///
    /// Default constructors and the scalar utilities use this; pass a config
    /// explicitly to `with_config` to override it.
    pub fn process() -> &'static DpConfig {
        PROCESS_CONFIG.get_or_init(Self::from_env_or_default)
    }

    /// Load config overrides from environment (best-effort).
    ///
    /// Invalid values are ignored. Supported:
    /// - DPSHIELD_DP_EPSILON (or DP_EPSILON)
    /// - DPSHIELD_DP_DELTA
    /// - DPSHIELD_EPSILON_FLOOR (mechanism floor; the scalar floor never drops below it)
    /// - DPSHIELD_DELTA_FLOOR
    /// - DPSHIELD_CATEGORY_KEEP_PROBABILITY (in [0, 1])
    /// - DPSHIELD_NOISE_SOURCE=secure|statistical
    #[must_use]
    pub fn from_env_or_default() -> Self {
        let mut cfg = Self::default();

        if let Some(x) = positive_from_env(&["DPSHIELD_DP_EPSILON", "DP_EPSILON"]) {
            cfg.default_epsilon = x;
        }

        if let Some(x) = positive_from_env(&["DPSHIELD_DP_DELTA"]) {
            if x < 1.0 {
                cfg.default_delta = x;
            }
        }

        if let Some(x) = positive_from_env(&["DPSHIELD_EPSILON_FLOOR"]) {
            cfg.mechanism_floors.epsilon = x;
            cfg.scalar_floors.epsilon = cfg.scalar_floors.epsilon.max(x);
        }

        if let Some(x) = positive_from_env(&["DPSHIELD_DELTA_FLOOR"]) {
            if x < 1.0 {
                cfg.mechanism_floors.delta = x;
                cfg.scalar_floors.delta = x;
            }
        }

        if let Ok(v) = std::env::var("DPSHIELD_CATEGORY_KEEP_PROBABILITY") {
            if let Ok(x) = v.trim().parse::<f64>() {
                if (0.0..=1.0).contains(&x) {
                    cfg.category_keep_probability = x;
                }
            }
        }

        if let Ok(v) = std::env::var("DPSHIELD_NOISE_SOURCE") {
            match v.parse::<SourceKind>() {
                Ok(kind) => cfg.noise_source = kind,
                Err(e) => tracing::warn!("Ignoring DPSHIELD_NOISE_SOURCE: {e}"),
            }
        }

        cfg
    }
}
