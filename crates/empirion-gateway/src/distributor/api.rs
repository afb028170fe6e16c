//! Agent management and event history over HTTP

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use tracing::info;

use empirion_agents::AgentStatus;
use empirion_common::{EmpirionError, PoolError};

use super::MessageDistributor;
use crate::collaborators::EventRecord;

/// Events returned by `GET /events` when no limit is given
pub const DEFAULT_EVENTS_LIMIT: usize = 100;

type ApiResult<T> = Result<T, (StatusCode, String)>;

#[derive(Debug, Deserialize)]
pub struct CreateAgentRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub limit: Option<usize>,
}

/// HTTP status for a runtime error
pub fn status_for(err: &EmpirionError) -> StatusCode {
    match err {
        EmpirionError::Pool(PoolError::DuplicateName { .. }) => StatusCode::CONFLICT,
        EmpirionError::Pool(PoolError::NotFound { .. }) => StatusCode::NOT_FOUND,
        EmpirionError::Pool(PoolError::CapacityExceeded { .. }) => StatusCode::TOO_MANY_REQUESTS,
        EmpirionError::Pool(PoolError::ShuttingDown { .. }) => StatusCode::SERVICE_UNAVAILABLE,
        EmpirionError::Decode(_) | EmpirionError::Config(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: EmpirionError) -> (StatusCode, String) {
    (status_for(&err), err.to_string())
}

pub async fn create_agent(
    State(distributor): State<Arc<MessageDistributor>>,
    Json(req): Json<CreateAgentRequest>,
) -> ApiResult<(StatusCode, Json<AgentStatus>)> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Agent name is empty".to_string()));
    }

    let agent = distributor
        .pool()
        .add_agent(name)
        .await
        .map_err(error_response)?;

    distributor
        .events()
        .record(format!("agent created: {}", agent.name()));
    info!(agent = %agent.name(), "Created agent over HTTP");
    Ok((StatusCode::CREATED, Json(agent.status())))
}

pub async fn list_agents(
    State(distributor): State<Arc<MessageDistributor>>,
) -> Json<Vec<AgentStatus>> {
    let mut agents: Vec<AgentStatus> = distributor
        .pool()
        .snapshot()
        .iter()
        .map(|agent| agent.status())
        .collect();
    agents.sort_by(|a, b| a.name.cmp(&b.name));
    Json(agents)
}

pub async fn get_agent(
    State(distributor): State<Arc<MessageDistributor>>,
    Path(name): Path<String>,
) -> ApiResult<Json<AgentStatus>> {
    distributor
        .pool()
        .agent(&name)
        .map(|agent| Json(agent.status()))
        .ok_or_else(|| error_response(PoolError::NotFound { name }.into()))
}

pub async fn remove_agent(
    State(distributor): State<Arc<MessageDistributor>>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    distributor
        .pool()
        .remove_agent(&name)
        .await
        .map_err(error_response)?;

    distributor
        .events()
        .record(format!("agent removed: {}", name));
    info!(agent = %name, "Removed agent over HTTP");
    Ok(StatusCode::NO_CONTENT)
}

/// Most recent events, oldest first
pub async fn list_events(
    State(distributor): State<Arc<MessageDistributor>>,
    Query(query): Query<EventsQuery>,
) -> Json<Vec<EventRecord>> {
    let limit = query.limit.unwrap_or(DEFAULT_EVENTS_LIMIT);
    let mut history = distributor.events().history();
    let skip = history.len().saturating_sub(limit);
    Json(history.split_off(skip))
}
