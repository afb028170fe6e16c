//! Agent capability tags
//!
//! Tags are opaque labels reported in status output. They do not switch
//! behavior on or off.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    QuantumProcessing,
    InfiniteMemory,
    RealTimeOptimization,
    MultiDimensionalLearning,
}

impl Capability {
    /// Every capability an agent is constructed with
    pub const ALL: [Capability; 4] = [
        Capability::QuantumProcessing,
        Capability::InfiniteMemory,
        Capability::RealTimeOptimization,
        Capability::MultiDimensionalLearning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::QuantumProcessing => "quantum_processing",
            Capability::InfiniteMemory => "infinite_memory",
            Capability::RealTimeOptimization => "real_time_optimization",
            Capability::MultiDimensionalLearning => "multi_dimensional_learning",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_matches_as_str() {
        for capability in Capability::ALL {
            let json = serde_json::to_value(capability).unwrap();
            assert_eq!(json, capability.as_str());
        }
    }
}
