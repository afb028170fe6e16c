//! System supervisor - composition root of the runtime
//!
//! Owns the cancellation root, the task tracker, its own evolution engine,
//! the agent pool, and the message distributor. Every task the runtime spawns
//! is a child of the supervisor's token and is tracked for shutdown.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, instrument, warn, Instrument};

use empirion_agents::{AgentPool, PoolConfig};
use empirion_common::{
    EmpirionError, OptimizationState, Result, DEFAULT_SHUTDOWN_TIMEOUT_MS,
};
use empirion_evolution::{EvolutionConfig, EvolutionEngine};

use crate::collaborators::EventLogger;
use crate::config::EmpirionConfig;
use crate::distributor::MessageDistributor;
use crate::tasks::TrackedTasks;

/// Supervisor configuration
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Where to bind the transport; `None` runs without one
    pub transport: Option<SocketAddr>,
    /// Agents added by [`Supervisor::start`]
    pub initial_agents: Vec<String>,
    /// The supervisor's own engine
    pub engine: EvolutionConfig,
    pub pool: PoolConfig,
    /// Deadline for every tracked task to stop
    pub shutdown_timeout: Duration,
}

impl SupervisorConfig {
    pub fn from_config(config: &EmpirionConfig) -> Result<Self> {
        let transport = if config.transport_enabled {
            Some(config.socket_addr()?)
        } else {
            None
        };

        Ok(Self {
            transport,
            initial_agents: config.pool.initial_agents.clone(),
            engine: config.engine_config(),
            pool: config.pool_config(),
            shutdown_timeout: config.shutdown_timeout(),
        })
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            transport: None,
            initial_agents: vec!["Alpha".into(), "Beta".into(), "Gamma".into()],
            engine: EvolutionConfig::default(),
            pool: PoolConfig::default(),
            shutdown_timeout: Duration::from_millis(DEFAULT_SHUTDOWN_TIMEOUT_MS),
        }
    }
}

pub struct Supervisor {
    config: SupervisorConfig,
    cancel: CancellationToken,
    tasks: TrackedTasks,
    engine: Arc<EvolutionEngine>,
    pool: Arc<AgentPool>,
    distributor: Arc<MessageDistributor>,
    local_addr: Mutex<Option<SocketAddr>>,
    events: Arc<EventLogger>,
    started: AtomicBool,
    stopped: AtomicBool,
}

impl Supervisor {
    pub fn new(config: SupervisorConfig) -> Self {
        Self::with_events(config, Arc::new(EventLogger::new()))
    }

    pub fn with_events(config: SupervisorConfig, events: Arc<EventLogger>) -> Self {
        let cancel = CancellationToken::new();
        let tasks = TrackedTasks::new();
        let pool = Arc::new(AgentPool::with_cancellation(config.pool.clone(), &cancel));
        let distributor = Arc::new(MessageDistributor::new(
            pool.clone(),
            events.clone(),
            cancel.child_token(),
            tasks.clone(),
        ));

        Self {
            engine: Arc::new(EvolutionEngine::new(config.engine.clone())),
            config,
            cancel,
            tasks,
            pool,
            distributor,
            local_addr: Mutex::new(None),
            events,
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        }
    }

    /// Start the engine loop, the transport (when configured), and the
    /// initial roster.
    ///
    /// A roster name that cannot be added is logged and skipped. Calling
    /// `start` twice is a no-op.
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let engine = self.engine.clone();
        let cancel = self.cancel.child_token();
        self.tasks.spawn(
            async move { engine.run(cancel).await }.instrument(info_span!("supervisor_engine")),
        );

        if let Some(addr) = self.config.transport {
            let local_addr = self.distributor.bind(addr).await?;
            *self.local_addr.lock() = Some(local_addr);
            self.events.record(format!("transport listening on {}", local_addr));
        }

        for name in &self.config.initial_agents {
            if let Err(e) = self.pool.add_agent(name.as_str()).await {
                warn!(agent = %name, error = %e, "Failed to add initial agent");
            }
        }

        self.events.record("supervisor started");
        info!(agents = self.pool.len(), transport = ?self.local_addr(), "Supervisor started");
        Ok(())
    }

    /// Wait until every tracked task has been cancelled and has terminated.
    ///
    /// Agent loops are owned by the pool; they end together with the
    /// supervisor's token.
    pub async fn run_forever(&self) {
        self.tasks.close();
        self.tasks.wait().await;
    }

    /// Cancel everything and wait for every task to stop.
    ///
    /// The pool and the tracked tasks share one deadline of
    /// `shutdown_timeout`; tracked tasks still running at the deadline are
    /// aborted. Only the first call does any work.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<()> {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        info!("Stopping supervisor");
        let timeout = self.config.shutdown_timeout;
        let deadline = Instant::now() + timeout;
        self.cancel.cancel();

        let pool_result = self.pool.shutdown_until(deadline).await;

        self.tasks.close();
        let pending = self.tasks.wait_until(deadline).await;
        let tasks_result = if pending == 0 {
            Ok(())
        } else {
            self.tasks.abort_all();
            warn!(
                pending,
                timeout_ms = timeout.as_millis() as u64,
                "Tasks still running after deadline, aborted"
            );
            Err(EmpirionError::ShutdownTimeout {
                pending,
                timeout_ms: timeout.as_millis() as u64,
            })
        };

        let result = pool_result.and(tasks_result);
        match &result {
            Ok(()) => self.events.record("supervisor stopped"),
            Err(e) => self.events.record(format!("supervisor stopped with error: {}", e)),
        }
        info!(ok = result.is_ok(), "Supervisor stopped");
        result
    }

    pub fn pool(&self) -> &Arc<AgentPool> {
        &self.pool
    }

    pub fn distributor(&self) -> &Arc<MessageDistributor> {
        &self.distributor
    }

    pub fn events(&self) -> &Arc<EventLogger> {
        &self.events
    }

    /// Task set shared by the engine loop, the transport, and its connections
    pub fn tasks(&self) -> &TrackedTasks {
        &self.tasks
    }

    /// Bound transport address, once started with a transport
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock()
    }

    pub fn engine_snapshot(&self) -> OptimizationState {
        self.engine.snapshot()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
