//! Empirion Performance Benchmarks
//!
//! Critical paths:
//! - Evolution step (critical section only)
//! - Broadcast fan-out across pool sizes

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;
use std::time::Duration;

use empirion_agents::{AgentConfig, AgentPool, PoolConfig};
use empirion_evolution::EvolutionEngine;

// ============ EVOLUTION BENCHMARKS ============

fn bench_evolution_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("evolution");

    group.bench_function("advance", |b| {
        let engine = EvolutionEngine::default();
        b.iter(|| black_box(engine.advance()));
    });

    group.finish();
}

// ============ BROADCAST BENCHMARKS ============

fn bench_broadcast(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();

    let mut group = c.benchmark_group("broadcast");
    group.measurement_time(Duration::from_secs(5));

    for size in [1usize, 10, 100].iter() {
        group.throughput(Throughput::Elements(*size as u64));

        let pool = rt.block_on(async {
            let pool = AgentPool::new(PoolConfig {
                agent: AgentConfig::with_interval(Duration::from_secs(3600)),
                ..PoolConfig::default()
            });
            for i in 0..*size {
                pool.add_agent(format!("agent-{}", i)).await.unwrap();
            }
            pool
        });
        let message = json!({"ping": 1, "payload": {"values": [1, 2, 3]}});

        group.bench_with_input(BenchmarkId::new("agents", size), size, |b, _| {
            b.iter(|| rt.block_on(pool.broadcast(black_box(&message))));
        });

        rt.block_on(pool.shutdown()).unwrap();
    }

    group.finish();
}

criterion_group!(benches, bench_evolution_step, bench_broadcast);
criterion_main!(benches);
