//! Evolution engine module
pub mod evolution;

pub use self::evolution::EvolutionEngine;
