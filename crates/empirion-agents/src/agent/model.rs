//! Agent - a named long-lived worker composed around one evolution engine
//!
//! An agent's loop calls [`Agent::evolve`] once per iteration and then waits
//! for its cadence, so cancellation is observed between iterations of the
//! agent itself rather than deep inside the engine.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use empirion_common::{OptimizationState, DEFAULT_AGENT_INTERVAL_MS};
use empirion_evolution::{EvolutionConfig, EvolutionEngine, SaturationPolicy};

use super::Capability;

/// Initial evolution factor of a fresh agent
pub const INITIAL_EVOLUTION_FACTOR: f64 = 1.0;

/// Agent configuration
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Engine settings; `evolution.interval` is the agent loop cadence
    pub evolution: EvolutionConfig,
    /// Starting evolution factor
    pub initial_evolution_factor: f64,
    /// Factor applied to the evolution factor per iteration
    pub factor_multiplier: f64,
}

impl AgentConfig {
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            evolution: EvolutionConfig::with_interval(interval),
            ..Self::default()
        }
    }

    pub fn interval(&self) -> Duration {
        self.evolution.interval
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            evolution: EvolutionConfig::with_interval(Duration::from_millis(
                DEFAULT_AGENT_INTERVAL_MS,
            )),
            initial_evolution_factor: INITIAL_EVOLUTION_FACTOR,
            factor_multiplier: 2.0,
        }
    }
}

/// Result of [`Agent::process_data`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedMessage {
    /// Name of the agent that handled the message
    pub agent: String,
    /// Agent's evolution factor when the message was handled
    pub evolution_factor: f64,
    /// The inbound message, echoed untransformed
    pub processed_payload: Value,
}

/// Point-in-time view of an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatus {
    pub name: String,
    pub evolution_factor: f64,
    pub capabilities: Vec<Capability>,
    pub state: OptimizationState,
    pub created_at: DateTime<Utc>,
}

pub struct Agent {
    name: String,
    engine: EvolutionEngine,
    evolution_factor: Mutex<f64>,
    factor_multiplier: f64,
    saturation: SaturationPolicy,
    capabilities: BTreeSet<Capability>,
    created_at: DateTime<Utc>,
}

impl Agent {
    pub fn new(name: impl Into<String>, config: AgentConfig) -> Self {
        Self {
            name: name.into(),
            saturation: config.evolution.saturation(),
            evolution_factor: Mutex::new(config.initial_evolution_factor),
            factor_multiplier: config.factor_multiplier,
            engine: EvolutionEngine::new(config.evolution),
            capabilities: Capability::ALL.into_iter().collect(),
            created_at: Utc::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn evolution_factor(&self) -> f64 {
        *self.evolution_factor.lock()
    }

    pub fn capabilities(&self) -> &BTreeSet<Capability> {
        &self.capabilities
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn engine(&self) -> &EvolutionEngine {
        &self.engine
    }

    /// Copy of the agent's optimization state
    pub fn snapshot(&self) -> OptimizationState {
        self.engine.snapshot()
    }

    /// One iteration: grow the evolution factor, then advance the engine once.
    /// Returns the new evolution factor.
    pub async fn evolve(&self) -> f64 {
        let factor = {
            let mut factor = self.evolution_factor.lock();
            *factor = self.saturation.multiply(*factor, self.factor_multiplier);
            *factor
        };
        self.engine.step().await;
        factor
    }

    /// Evolve on the configured cadence until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        let interval = self.engine.config().interval;
        info!(agent = %self.name, interval_ms = interval.as_millis() as u64, "Agent evolution loop started");

        while !cancel.is_cancelled() {
            let factor = self.evolve().await;
            debug!(agent = %self.name, evolution_factor = factor, "Agent evolved");

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }

        info!(agent = %self.name, cycles = self.engine.cycles(), "Agent evolution loop stopped");
    }

    /// Echo `message` tagged with this agent's name and evolution factor.
    ///
    /// Never mutates the optimization state and never fails; malformed
    /// payloads are returned as-is.
    pub fn process_data(&self, message: &Value) -> ProcessedMessage {
        ProcessedMessage {
            agent: self.name.clone(),
            evolution_factor: self.evolution_factor(),
            processed_payload: message.clone(),
        }
    }

    pub fn status(&self) -> AgentStatus {
        AgentStatus {
            name: self.name.clone(),
            evolution_factor: self.evolution_factor(),
            capabilities: self.capabilities.iter().copied().collect(),
            state: self.snapshot(),
            created_at: self.created_at,
        }
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("evolution_factor", &self.evolution_factor())
            .field("cycles", &self.engine.cycles())
            .finish()
    }
}
