//! Agent pool - registry of named agents and their supervised evolution loops
//!
//! The registry lock is synchronous and never held across an await. Mutations
//! (`add_agent`, `remove_agent`, `shutdown`) and the broadcast snapshot all go
//! through it, so a reader sees either the registry before a mutation or after
//! it, never in between.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, instrument, warn, Instrument};

use empirion_common::{
    EmpirionError, PoolError, Result, DEFAULT_MAX_AGENTS, DEFAULT_SHUTDOWN_TIMEOUT_MS,
};

use crate::agent::{Agent, AgentConfig, AgentStatus, ProcessedMessage};

/// Pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of registered agents
    pub max_agents: usize,
    /// Upper bound on waiting for agent loops to stop
    pub shutdown_timeout: Duration,
    /// Settings applied to every agent the pool creates
    pub agent: AgentConfig,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_agents: DEFAULT_MAX_AGENTS,
            shutdown_timeout: Duration::from_millis(DEFAULT_SHUTDOWN_TIMEOUT_MS),
            agent: AgentConfig::default(),
        }
    }
}

/// Pool counters
#[derive(Debug, Default)]
pub struct PoolMetrics {
    pub agents_added: AtomicU64,
    pub agents_removed: AtomicU64,
    pub broadcasts: AtomicU64,
    pub deliveries: AtomicU64,
}

/// Point-in-time view of the pool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStatus {
    pub total_agents: usize,
    pub running_tasks: usize,
    pub max_agents: usize,
    pub agents_added: u64,
    pub agents_removed: u64,
    pub broadcasts: u64,
    pub deliveries: u64,
    pub agents: Vec<AgentStatus>,
}

/// A registered agent and the task running its loop
struct AgentEntry {
    agent: Arc<Agent>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct AgentPool {
    registry: RwLock<HashMap<String, AgentEntry>>,
    config: PoolConfig,
    /// Parent of every agent loop's token
    cancel: CancellationToken,
    metrics: PoolMetrics,
}

impl AgentPool {
    /// Create a pool with its own root cancellation token
    pub fn new(config: PoolConfig) -> Self {
        Self::with_cancellation(config, &CancellationToken::new())
    }

    /// Create a pool whose agent loops are cancelled along with `parent`
    pub fn with_cancellation(config: PoolConfig, parent: &CancellationToken) -> Self {
        Self {
            registry: RwLock::new(HashMap::new()),
            config,
            cancel: parent.child_token(),
            metrics: PoolMetrics::default(),
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn metrics(&self) -> &PoolMetrics {
        &self.metrics
    }

    /// Register a new agent and spawn its evolution loop.
    #[instrument(skip(self, name), fields(agent = tracing::field::Empty))]
    pub async fn add_agent(&self, name: impl Into<String>) -> Result<Arc<Agent>> {
        let name = name.into();
        tracing::Span::current().record("agent", name.as_str());

        let agent = {
            let mut registry = self.registry.write();

            if self.cancel.is_cancelled() {
                return Err(PoolError::ShuttingDown { name }.into());
            }
            if registry.contains_key(&name) {
                return Err(PoolError::DuplicateName { name }.into());
            }
            if registry.len() >= self.config.max_agents {
                return Err(PoolError::CapacityExceeded {
                    limit: self.config.max_agents,
                }
                .into());
            }

            let agent = Arc::new(Agent::new(name.clone(), self.config.agent.clone()));
            let cancel = self.cancel.child_token();
            let handle = tokio::spawn({
                let agent = agent.clone();
                let cancel = cancel.clone();
                async move { agent.run(cancel).await }
                    .instrument(info_span!("agent_loop", agent = %name))
            });

            registry.insert(
                name,
                AgentEntry {
                    agent: agent.clone(),
                    cancel,
                    handle,
                },
            );
            agent
        };

        self.metrics.agents_added.fetch_add(1, Ordering::Relaxed);
        info!(total = self.len(), "Agent added to pool");
        Ok(agent)
    }

    /// Deliver `message` to every agent registered at call time.
    ///
    /// Agents added after the snapshot is taken do not receive this message.
    pub async fn broadcast(&self, message: &Value) -> Vec<ProcessedMessage> {
        let agents = self.snapshot();

        let results = futures::future::join_all(
            agents
                .iter()
                .map(|agent| async move { agent.process_data(message) }),
        )
        .await;

        self.metrics.broadcasts.fetch_add(1, Ordering::Relaxed);
        self.metrics
            .deliveries
            .fetch_add(results.len() as u64, Ordering::Relaxed);
        debug!(recipients = results.len(), "Broadcast delivered");

        results
    }

    /// Deliver `message` to one agent by name.
    pub fn send_to(&self, name: &str, message: &Value) -> Result<ProcessedMessage> {
        let agent = self.agent(name).ok_or_else(|| PoolError::NotFound {
            name: name.to_string(),
        })?;

        self.metrics.deliveries.fetch_add(1, Ordering::Relaxed);
        Ok(agent.process_data(message))
    }

    /// Unregister an agent, cancel its loop, and wait for it to stop.
    #[instrument(skip(self))]
    pub async fn remove_agent(&self, name: &str) -> Result<()> {
        let entry = self
            .registry
            .write()
            .remove(name)
            .ok_or_else(|| PoolError::NotFound {
                name: name.to_string(),
            })?;

        self.metrics.agents_removed.fetch_add(1, Ordering::Relaxed);
        entry.cancel.cancel();
        let deadline = Instant::now() + self.config.shutdown_timeout;
        self.await_termination(vec![entry.handle], deadline).await?;

        info!(total = self.len(), "Agent removed from pool");
        Ok(())
    }

    /// Cancel every agent loop, wait for all of them, and clear the registry.
    ///
    /// Calling this on an empty pool is a no-op.
    pub async fn shutdown(&self) -> Result<()> {
        let deadline = Instant::now() + self.config.shutdown_timeout;
        self.shutdown_until(deadline).await
    }

    /// [`shutdown`](Self::shutdown) bounded by a caller-supplied deadline
    /// instead of the pool's own timeout.
    #[instrument(skip(self))]
    pub async fn shutdown_until(&self, deadline: Instant) -> Result<()> {
        let entries: Vec<AgentEntry> = {
            let mut registry = self.registry.write();
            registry.drain().map(|(_, entry)| entry).collect()
        };

        if entries.is_empty() {
            return Ok(());
        }

        info!(agents = entries.len(), "Shutting down agent pool");
        self.metrics
            .agents_removed
            .fetch_add(entries.len() as u64, Ordering::Relaxed);

        for entry in &entries {
            entry.cancel.cancel();
        }

        let handles = entries.into_iter().map(|entry| entry.handle).collect();
        self.await_termination(handles, deadline).await?;

        info!("Agent pool shut down");
        Ok(())
    }

    /// Wait for `handles` until `deadline`; abort whatever is left.
    async fn await_termination(
        &self,
        handles: Vec<JoinHandle<()>>,
        deadline: Instant,
    ) -> Result<()> {
        let aborts: Vec<_> = handles.iter().map(|handle| handle.abort_handle()).collect();
        let timeout = deadline.saturating_duration_since(Instant::now());

        match tokio::time::timeout_at(deadline, futures::future::join_all(handles)).await {
            Ok(results) => {
                for result in results {
                    if let Err(e) = result {
                        if e.is_panic() {
                            warn!("Agent loop panicked: {}", e);
                        }
                    }
                }
                Ok(())
            }
            Err(_) => {
                let pending = aborts.iter().filter(|abort| !abort.is_finished()).count();
                for abort in &aborts {
                    abort.abort();
                }
                warn!(
                    pending,
                    timeout_ms = timeout.as_millis() as u64,
                    "Agent loops did not stop before the deadline, aborted"
                );
                Err(EmpirionError::ShutdownTimeout {
                    pending,
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        }
    }

    /// Agents currently registered, cloned out of the registry
    pub fn snapshot(&self) -> Vec<Arc<Agent>> {
        self.registry
            .read()
            .values()
            .map(|entry| entry.agent.clone())
            .collect()
    }

    pub fn agent(&self, name: &str) -> Option<Arc<Agent>> {
        self.registry
            .read()
            .get(name)
            .map(|entry| entry.agent.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registry.read().contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.registry.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.read().is_empty()
    }

    /// Number of registered agents whose loop is still running
    pub fn task_count(&self) -> usize {
        self.registry
            .read()
            .values()
            .filter(|entry| !entry.handle.is_finished())
            .count()
    }

    pub fn status(&self) -> PoolStatus {
        let (mut agents, running_tasks) = {
            let registry = self.registry.read();
            let agents: Vec<AgentStatus> =
                registry.values().map(|entry| entry.agent.status()).collect();
            let running = registry
                .values()
                .filter(|entry| !entry.handle.is_finished())
                .count();
            (agents, running)
        };
        agents.sort_by(|a, b| a.name.cmp(&b.name));

        PoolStatus {
            total_agents: agents.len(),
            running_tasks,
            max_agents: self.config.max_agents,
            agents_added: self.metrics.agents_added.load(Ordering::Relaxed),
            agents_removed: self.metrics.agents_removed.load(Ordering::Relaxed),
            broadcasts: self.metrics.broadcasts.load(Ordering::Relaxed),
            deliveries: self.metrics.deliveries.load(Ordering::Relaxed),
            agents,
        }
    }
}

impl Drop for AgentPool {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
