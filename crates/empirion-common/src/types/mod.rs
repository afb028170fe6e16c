//! Core data types

pub mod optimization_state;

pub use optimization_state::OptimizationState;
