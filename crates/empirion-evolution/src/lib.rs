//! # Evolution
//!
//! Saturating self-mutation engine for the Empirion agent runtime.
//!
//! ## Step Formula
//!
//! ```text
//! evolution_rate     = min(evolution_rate * 2,     ceiling)
//! optimization_level = min(optimization_level + 1, ceiling)
//! learning_rate      = min(learning_rate * 1.5,    ceiling)
//! ```
//!
//! ## Cadence
//!
//! An engine loop runs one step, yields, then sleeps for `interval` or until
//! its cancellation token fires, whichever comes first.

use std::time::Duration;

use empirion_common::{DEFAULT_ENGINE_INTERVAL_MS, DEFAULT_SATURATION_CEILING};

pub mod engine;
pub mod saturation;

pub use engine::EvolutionEngine;
pub use saturation::SaturationPolicy;

/// Evolution configuration
#[derive(Debug, Clone)]
pub struct EvolutionConfig {
    /// Delay between two steps of a running loop
    pub interval: Duration,
    /// Upper bound for every growing field
    pub saturation_ceiling: f64,
    /// Factor applied to `evolution_rate` per step
    pub rate_multiplier: f64,
    /// Amount added to `optimization_level` per step
    pub level_increment: f64,
    /// Factor applied to `learning_rate` per step
    pub learning_multiplier: f64,
}

impl EvolutionConfig {
    /// Default config with a different cadence
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }

    /// Saturation policy derived from the configured ceiling
    pub fn saturation(&self) -> SaturationPolicy {
        SaturationPolicy::new(self.saturation_ceiling)
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_ENGINE_INTERVAL_MS),
            saturation_ceiling: DEFAULT_SATURATION_CEILING,
            rate_multiplier: 2.0,
            level_increment: 1.0,
            learning_multiplier: 1.5,
        }
    }
}
