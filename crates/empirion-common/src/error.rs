//! Error types for the Empirion runtime
//!
//! Provides a unified error type and the pool and decoding error variants

use thiserror::Error;

/// Result type alias using EmpirionError
pub type Result<T> = std::result::Result<T, EmpirionError>;

/// Unified error type for Empirion operations
#[derive(Debug, Error)]
pub enum EmpirionError {
    // Registry errors
    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),

    // Inbound frame errors (recovered by the distributor, never sent back)
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    // Tasks that outlived the shutdown deadline
    #[error("Shutdown timed out after {timeout_ms}ms with {pending} task(s) still running")]
    ShutdownTimeout { pending: usize, timeout_ms: u64 },

    // Network errors
    #[error("Network error: {0}")]
    Network(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EmpirionError {
    /// Whether this error reports tasks that failed to stop in time
    pub fn is_shutdown_timeout(&self) -> bool {
        matches!(self, EmpirionError::ShutdownTimeout { .. })
    }
}

/// Agent registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("Agent already registered: {name}")]
    DuplicateName { name: String },

    #[error("Agent not found: {name}")]
    NotFound { name: String },

    #[error("Pool is at capacity ({limit} agents)")]
    CapacityExceeded { limit: usize },

    #[error("Pool is shutting down, cannot add agent: {name}")]
    ShuttingDown { name: String },
}

/// Inbound frame decoding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Expected a JSON object, got {kind}")]
    NotAnObject { kind: &'static str },

    #[error("Frame is not valid UTF-8")]
    InvalidUtf8,
}

// Implement From for common external error types
impl From<serde_json::Error> for EmpirionError {
    fn from(err: serde_json::Error) -> Self {
        EmpirionError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for EmpirionError {
    fn from(err: std::io::Error) -> Self {
        EmpirionError::Network(err.to_string())
    }
}

impl From<anyhow::Error> for EmpirionError {
    fn from(err: anyhow::Error) -> Self {
        EmpirionError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EmpirionError::Pool(PoolError::NotFound {
            name: "Nova".to_string(),
        });
        assert!(err.to_string().contains("Nova"));
    }

    #[test]
    fn test_shutdown_timeout_display() {
        let err = EmpirionError::ShutdownTimeout {
            pending: 2,
            timeout_ms: 500,
        };
        assert!(err.is_shutdown_timeout());
        assert!(err.to_string().contains("500ms"));
        assert!(err.to_string().contains("2 task(s)"));
    }

    #[test]
    fn test_pool_error_conversion() {
        let err: EmpirionError = PoolError::DuplicateName {
            name: "Alpha".into(),
        }
        .into();
        assert!(matches!(
            err,
            EmpirionError::Pool(PoolError::DuplicateName { .. })
        ));
        assert!(!err.is_shutdown_timeout());
    }
}
