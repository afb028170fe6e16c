//! Agent pool module
pub mod registry;

pub use self::registry::{AgentPool, PoolConfig, PoolMetrics, PoolStatus};
