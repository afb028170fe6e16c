//! WebSocket message distributor
//!
//! Every accepted connection runs its own receive loop. Each frame is decoded
//! and, when it is a JSON object, broadcast to the pool. Results are never
//! sent back and undecodable frames are dropped without a reply.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use empirion_agents::{AgentPool, PoolStatus};
use empirion_common::{DecodeError, EmpirionError, Result, VERSION};

use super::api;
use super::codec::{decode_bytes, decode_frame};
use crate::collaborators::EventLogger;
use crate::tasks::TrackedTasks;

/// Transport counters
#[derive(Debug, Default)]
pub struct TransportStats {
    pub active_connections: AtomicU64,
    pub total_connections: AtomicU64,
    pub frames_received: AtomicU64,
    pub frames_dropped: AtomicU64,
    pub broadcasts: AtomicU64,
}

impl TransportStats {
    pub fn snapshot(&self) -> TransportStatus {
        TransportStatus {
            active_connections: self.active_connections.load(Ordering::Relaxed),
            total_connections: self.total_connections.load(Ordering::Relaxed),
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            broadcasts: self.broadcasts.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the transport counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportStatus {
    pub active_connections: u64,
    pub total_connections: u64,
    pub frames_received: u64,
    pub frames_dropped: u64,
    pub broadcasts: u64,
}

/// Body of `GET /status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub pool: PoolStatus,
    pub transport: TransportStatus,
}

pub struct MessageDistributor {
    pool: Arc<AgentPool>,
    events: Arc<EventLogger>,
    cancel: CancellationToken,
    tasks: TrackedTasks,
    stats: TransportStats,
}

impl MessageDistributor {
    /// `cancel` ends the server and every connection loop; server and
    /// connection tasks are spawned on `tasks`.
    pub fn new(
        pool: Arc<AgentPool>,
        events: Arc<EventLogger>,
        cancel: CancellationToken,
        tasks: TrackedTasks,
    ) -> Self {
        Self {
            pool,
            events,
            cancel,
            tasks,
            stats: TransportStats::default(),
        }
    }

    pub fn pool(&self) -> &Arc<AgentPool> {
        &self.pool
    }

    pub fn events(&self) -> &Arc<EventLogger> {
        &self.events
    }

    pub fn stats(&self) -> TransportStatus {
        self.stats.snapshot()
    }

    /// Handle one text frame. Returns the number of agents reached, or `None`
    /// when the frame was dropped.
    pub async fn handle_frame(&self, text: &str) -> Option<usize> {
        self.stats.frames_received.fetch_add(1, Ordering::Relaxed);
        self.dispatch(decode_frame(text)).await
    }

    /// Handle one binary frame; it is treated as text when it is valid UTF-8.
    pub async fn handle_bytes(&self, bytes: &[u8]) -> Option<usize> {
        self.stats.frames_received.fetch_add(1, Ordering::Relaxed);
        self.dispatch(decode_bytes(bytes)).await
    }

    async fn dispatch(&self, decoded: std::result::Result<Value, DecodeError>) -> Option<usize> {
        match decoded {
            Ok(message) => {
                let results = self.pool.broadcast(&message).await;
                self.stats.broadcasts.fetch_add(1, Ordering::Relaxed);
                debug!(recipients = results.len(), "Frame broadcast to pool");
                Some(results.len())
            }
            Err(e) => {
                self.stats.frames_dropped.fetch_add(1, Ordering::Relaxed);
                debug!(error = %e, "Dropping undecodable frame");
                None
            }
        }
    }

    /// HTTP routes: the WebSocket on `/ws`, health and status, agent
    /// management under `/agents`, and the event history on `/events`
    pub fn router(self: &Arc<Self>) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/status", get(get_status))
            .route("/agents", post(api::create_agent).get(api::list_agents))
            .route(
                "/agents/:name",
                get(api::get_agent).delete(api::remove_agent),
            )
            .route("/events", get(api::list_events))
            .route("/ws", get(websocket_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(self.clone())
    }

    /// Bind `addr` and start serving on the task tracker.
    ///
    /// Returns the bound address, which differs from `addr` when port 0 was
    /// requested.
    pub async fn bind(self: &Arc<Self>, addr: SocketAddr) -> Result<SocketAddr> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| EmpirionError::Network(format!("failed to bind {}: {}", addr, e)))?;
        self.spawn_server(listener)
    }

    /// Serve an already bound listener on the task tracker.
    pub fn spawn_server(self: &Arc<Self>, listener: TcpListener) -> Result<SocketAddr> {
        let local_addr = listener.local_addr()?;
        let app = self.router();
        let cancel = self.cancel.clone();

        self.tasks.spawn(
            async move {
                info!(%local_addr, "Message distributor listening");
                let shutdown = async move { cancel.cancelled().await };
                if let Err(e) = axum::serve(listener, app)
                    .with_graceful_shutdown(shutdown)
                    .await
                {
                    warn!(error = %e, "Transport server failed");
                }
                info!("Message distributor stopped");
            }
            .instrument(info_span!("distributor", %local_addr)),
        );

        Ok(local_addr)
    }

    /// Receive loop for one connection
    async fn handle_connection(self: Arc<Self>, mut socket: WebSocket) {
        self.stats.active_connections.fetch_add(1, Ordering::Relaxed);
        self.stats.total_connections.fetch_add(1, Ordering::Relaxed);
        info!("Connection opened");

        loop {
            let frame = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                }
                frame = socket.recv() => frame,
            };

            match frame {
                Some(Ok(Message::Text(text))) => {
                    self.handle_frame(&text).await;
                }
                Some(Ok(Message::Binary(bytes))) => {
                    self.handle_bytes(&bytes).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                // Pings are answered by the socket itself
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(error = %e, "Connection error");
                    break;
                }
            }
        }

        self.stats.active_connections.fetch_sub(1, Ordering::Relaxed);
        info!("Connection closed");
    }
}

impl std::fmt::Debug for MessageDistributor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageDistributor")
            .field("stats", &self.stats.snapshot())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

async fn health_check() -> Json<Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": VERSION,
    }))
}

async fn get_status(State(distributor): State<Arc<MessageDistributor>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        pool: distributor.pool.status(),
        transport: distributor.stats(),
    })
}

async fn websocket_handler(
    State(distributor): State<Arc<MessageDistributor>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        let connection_id = Uuid::new_v4();
        let tasks = distributor.tasks.clone();
        tasks.spawn(
            distributor
                .handle_connection(socket)
                .instrument(info_span!("connection", %connection_id)),
        );
    })
}
