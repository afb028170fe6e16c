//! # Empirion Common
//!
//! Shared types, errors, and constants for the Empirion agent runtime.
//!
//! ## Core Types
//!
//! - [`OptimizationState`]: numeric parameters advanced by an evolution engine
//! - [`EmpirionError`]: unified error type for pool, transport, and shutdown failures
//!
//! ## Growth Model
//!
//! ```text
//! evolution_rate     *= 2
//! optimization_level += 1
//! learning_rate      *= 1.5
//! ```
//!
//! Every field is capped at a saturation ceiling (default `1e15`).

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{DecodeError, EmpirionError, PoolError, Result};
pub use types::optimization_state::OptimizationState;

/// Empirion version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default saturation ceiling for every growing quantity
pub const DEFAULT_SATURATION_CEILING: f64 = 1e15;

/// Default cadence of the supervisor's own engine loop (milliseconds)
pub const DEFAULT_ENGINE_INTERVAL_MS: u64 = 100;

/// Default cadence of each agent's evolution loop (milliseconds)
pub const DEFAULT_AGENT_INTERVAL_MS: u64 = 1000;

/// Default upper bound on waiting for tasks to terminate (milliseconds)
pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 5000;

/// Default maximum number of agents in a pool
pub const DEFAULT_MAX_AGENTS: usize = 100;

/// Default WebSocket listening port
pub const DEFAULT_TRANSPORT_PORT: u16 = 8765;
