//! # Empirion Gateway
//!
//! Composition root of the Empirion runtime:
//!
//! - [`Supervisor`]: owns the cancellation root, its own evolution engine,
//!   the agent pool, and the transport
//! - [`MessageDistributor`]: WebSocket endpoint that broadcasts every inbound
//!   JSON object to the pool
//! - [`EmpirionConfig`]: `.env` and `EMPIRION_*` configuration
//! - [`TrackedTasks`]: every task the supervisor spawns, abortable at the
//!   shutdown deadline
//! - [`collaborators`]: panels, diagnostics, event log, offline mode, and
//!   the boot sequence

pub mod collaborators;
pub mod config;
pub mod distributor;
pub mod supervisor;
pub mod tasks;

pub use config::EmpirionConfig;
pub use distributor::{MessageDistributor, StatusResponse, TransportStatus};
pub use supervisor::{Supervisor, SupervisorConfig};
pub use tasks::TrackedTasks;
