//! OptimizationState - numeric parameters advanced by an evolution engine
//!
//! The state itself has no behavior. It is mutated only by the engine that
//! owns it, inside that engine's critical section.

use serde::{Deserialize, Serialize};

/// Initial dimension of a fresh state
pub const INITIAL_DIMENSION: f64 = 1.0;

/// Initial evolution rate of a fresh state
pub const INITIAL_EVOLUTION_RATE: f64 = 1.0;

/// Initial optimization level of a fresh state
pub const INITIAL_OPTIMIZATION_LEVEL: f64 = 0.0;

/// Initial learning rate of a fresh state
pub const INITIAL_LEARNING_RATE: f64 = 0.01;

/// Evolving numeric parameters of one engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationState {
    /// Dimensionality of the search space
    pub dimension: f64,

    /// Multiplicative growth factor, doubled every step
    pub evolution_rate: f64,

    /// Additive progress counter, incremented every step
    pub optimization_level: f64,

    /// Learning rate, scaled by 1.5 every step
    pub learning_rate: f64,

    /// Number of completed steps
    pub cycles: u64,
}

impl OptimizationState {
    /// Create a fresh state with the default starting values
    pub fn new() -> Self {
        Self {
            dimension: INITIAL_DIMENSION,
            evolution_rate: INITIAL_EVOLUTION_RATE,
            optimization_level: INITIAL_OPTIMIZATION_LEVEL,
            learning_rate: INITIAL_LEARNING_RATE,
            cycles: 0,
        }
    }

    /// Whether every growing field is a finite number
    pub fn is_finite(&self) -> bool {
        self.dimension.is_finite()
            && self.evolution_rate.is_finite()
            && self.optimization_level.is_finite()
            && self.learning_rate.is_finite()
    }
}

impl Default for OptimizationState {
    fn default() -> Self {
        Self::new()
    }
}
