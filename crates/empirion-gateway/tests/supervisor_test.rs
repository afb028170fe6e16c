//! Supervisor lifecycle tests

use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;

use empirion_agents::{AgentConfig, PoolConfig};
use empirion_common::{EmpirionError, PoolError};
use empirion_evolution::EvolutionConfig;
use empirion_gateway::{Supervisor, SupervisorConfig};

fn test_config(initial_agents: &[&str]) -> SupervisorConfig {
    SupervisorConfig {
        transport: None,
        initial_agents: initial_agents.iter().map(|name| name.to_string()).collect(),
        engine: EvolutionConfig::with_interval(Duration::from_millis(20)),
        pool: PoolConfig {
            agent: AgentConfig::with_interval(Duration::from_millis(20)),
            shutdown_timeout: Duration::from_secs(2),
            ..PoolConfig::default()
        },
        shutdown_timeout: Duration::from_secs(2),
    }
}

#[tokio::test]
async fn test_single_agent_round_trip() {
    let supervisor = Supervisor::new(test_config(&[]));
    supervisor.start().await.unwrap();
    assert!(supervisor.pool().is_empty());

    supervisor.pool().add_agent("Nova").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let results = supervisor.pool().broadcast(&json!({"ping": 1})).await;
    assert_eq!(results.len(), 1);

    let result = &results[0];
    assert_eq!(result.agent, "Nova");
    assert_eq!(result.processed_payload, json!({"ping": 1}));
    // Factor is 2^k for k >= 1 iterations
    let exponent = result.evolution_factor.log2();
    assert!(exponent >= 1.0);
    assert_eq!(exponent.fract(), 0.0);

    supervisor.pool().remove_agent("Nova").await.unwrap();
    assert!(supervisor.pool().is_empty());
    assert_eq!(supervisor.pool().task_count(), 0);

    supervisor.stop().await.unwrap();
}

#[tokio::test]
async fn test_initial_roster_started_and_stopped() {
    let supervisor = Supervisor::new(test_config(&["Alpha", "Beta", "Gamma"]));
    supervisor.start().await.unwrap();

    assert_eq!(supervisor.pool().names(), vec!["Alpha", "Beta", "Gamma"]);
    assert_eq!(supervisor.pool().task_count(), 3);

    let results = supervisor.pool().broadcast(&json!({"kind": "hello"})).await;
    assert_eq!(results.len(), 3);
    assert!(results
        .iter()
        .all(|r| r.processed_payload == json!({"kind": "hello"})));

    supervisor.stop().await.unwrap();
    assert!(supervisor.pool().is_empty());
    assert_eq!(supervisor.pool().task_count(), 0);
}

#[tokio::test]
async fn test_duplicate_roster_name_is_skipped() {
    let supervisor = Supervisor::new(test_config(&["Alpha", "Alpha", "Beta"]));
    supervisor.start().await.unwrap();

    assert_eq!(supervisor.pool().len(), 2);

    let err = supervisor.pool().add_agent("Beta").await.unwrap_err();
    assert!(matches!(
        err,
        EmpirionError::Pool(PoolError::DuplicateName { ref name }) if name == "Beta"
    ));

    supervisor.stop().await.unwrap();
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let supervisor = Supervisor::new(test_config(&["Alpha"]));
    supervisor.start().await.unwrap();

    supervisor.stop().await.unwrap();
    supervisor.stop().await.unwrap();
    assert!(supervisor.is_stopped());
}

#[tokio::test]
async fn test_run_forever_returns_after_stop() {
    let supervisor = std::sync::Arc::new(Supervisor::new(test_config(&["Alpha"])));
    supervisor.start().await.unwrap();

    let runner = tokio::spawn({
        let supervisor = supervisor.clone();
        async move { supervisor.run_forever().await }
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!runner.is_finished());

    supervisor.stop().await.unwrap();
    tokio::time::timeout(Duration::from_secs(2), runner)
        .await
        .expect("run_forever did not return")
        .unwrap();
}

#[tokio::test]
async fn test_engine_snapshot_advances() {
    let supervisor = Supervisor::new(test_config(&[]));
    assert_eq!(supervisor.engine_snapshot().cycles, 0);

    supervisor.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;

    let state = supervisor.engine_snapshot();
    assert!(state.cycles >= 1);
    assert_eq!(state.evolution_rate, 2f64.powi(state.cycles as i32));

    supervisor.stop().await.unwrap();
}

#[tokio::test]
async fn test_stop_reports_shutdown_timeout() {
    let supervisor = Supervisor::new(SupervisorConfig {
        shutdown_timeout: Duration::from_millis(100),
        ..test_config(&["Alpha"])
    });
    supervisor.start().await.unwrap();
    supervisor.tasks().spawn(std::future::pending::<()>());

    let started = Instant::now();
    let err = supervisor.stop().await.unwrap_err();
    assert!(err.is_shutdown_timeout());
    assert!(started.elapsed() < Duration::from_millis(190));

    // The stuck task was aborted, not left behind
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(supervisor.tasks().is_empty());
    assert!(supervisor.pool().is_empty());

    // Already stopped
    supervisor.stop().await.unwrap();
}

#[tokio::test]
async fn test_add_after_stop_rejected() {
    let supervisor = Supervisor::new(test_config(&["Alpha"]));
    supervisor.start().await.unwrap();
    supervisor.stop().await.unwrap();

    let err = supervisor.pool().add_agent("Late").await.unwrap_err();
    assert!(matches!(
        err,
        EmpirionError::Pool(PoolError::ShuttingDown { ref name }) if name == "Late"
    ));
    assert_eq!(supervisor.pool().len(), 0);
    assert_eq!(supervisor.pool().task_count(), 0);
}
