//! # Empirion Agents
//!
//! Long-lived agents and the pool that supervises their evolution loops.
//!
//! ## Lifecycle
//!
//! ```text
//! add_agent(name)    -> register + spawn evolution loop
//! broadcast(message) -> process_data on a snapshot of every agent
//! remove_agent(name) -> unregister + cancel + await (bounded)
//! shutdown()         -> cancel + await every loop, clear registry
//! ```
//!
//! Each agent's loop doubles its evolution factor and advances its own
//! [`EvolutionEngine`](empirion_evolution::EvolutionEngine) once per iteration.

pub mod agent;
pub mod pool;

pub use agent::{Agent, AgentConfig, AgentStatus, Capability, ProcessedMessage};
pub use pool::{AgentPool, PoolConfig, PoolMetrics, PoolStatus};
