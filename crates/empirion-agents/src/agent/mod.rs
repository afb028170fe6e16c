//! Agent module
pub mod capability;
pub mod model;

pub use self::capability::Capability;
pub use self::model::{Agent, AgentConfig, AgentStatus, ProcessedMessage};
