//! Evolution engine - owns one OptimizationState and advances it on a cadence
//!
//! The state lives behind a synchronous mutex. The lock is taken only for the
//! mutation itself and released before the step yields, so a loop never holds
//! it across a suspension point.

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use empirion_common::OptimizationState;

use crate::{EvolutionConfig, SaturationPolicy};

pub struct EvolutionEngine {
    state: Mutex<OptimizationState>,
    config: EvolutionConfig,
    saturation: SaturationPolicy,
}

impl EvolutionEngine {
    pub fn new(config: EvolutionConfig) -> Self {
        Self {
            state: Mutex::new(OptimizationState::new()),
            saturation: config.saturation(),
            config,
        }
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Copy of the current state, taken under the lock
    pub fn snapshot(&self) -> OptimizationState {
        *self.state.lock()
    }

    pub fn cycles(&self) -> u64 {
        self.state.lock().cycles
    }

    /// Apply one mutation inside the critical section and return the new state.
    pub fn advance(&self) -> OptimizationState {
        let mut state = self.state.lock();
        state.evolution_rate = self
            .saturation
            .multiply(state.evolution_rate, self.config.rate_multiplier);
        state.optimization_level = self
            .saturation
            .add(state.optimization_level, self.config.level_increment);
        state.learning_rate = self
            .saturation
            .multiply(state.learning_rate, self.config.learning_multiplier);
        state.cycles = state.cycles.saturating_add(1);
        *state
    }

    /// One step: mutate, then yield to the scheduler outside the lock.
    pub async fn step(&self) -> OptimizationState {
        let state = self.advance();
        tokio::task::yield_now().await;
        state
    }

    /// Step on the configured cadence until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            interval_ms = self.config.interval.as_millis() as u64,
            ceiling = self.saturation.ceiling(),
            "Starting evolution loop"
        );

        while !cancel.is_cancelled() {
            let state = self.step().await;
            debug!(
                cycles = state.cycles,
                evolution_rate = state.evolution_rate,
                optimization_level = state.optimization_level,
                "Evolution step"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }

        info!(cycles = self.cycles(), "Evolution loop stopped");
    }
}

impl Default for EvolutionEngine {
    fn default() -> Self {
        Self::new(EvolutionConfig::default())
    }
}
