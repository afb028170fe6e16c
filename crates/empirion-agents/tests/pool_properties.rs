//! Property tests for the agent registry
//!
//! For any sequence of adds and removes over a small name space, the registry
//! size equals successful adds minus successful removes, and every registered
//! agent has exactly one running loop.

use std::collections::HashSet;
use std::time::Duration;

use proptest::prelude::*;

use empirion_agents::{AgentConfig, AgentPool, PoolConfig};
use empirion_common::{EmpirionError, PoolError};

const NAMES: [&str; 5] = ["Alpha", "Beta", "Gamma", "Delta", "Nova"];

#[derive(Debug, Clone)]
enum Op {
    Add(usize),
    Remove(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..NAMES.len()).prop_map(Op::Add),
        (0..NAMES.len()).prop_map(Op::Remove),
    ]
}

fn test_pool() -> AgentPool {
    AgentPool::new(PoolConfig {
        shutdown_timeout: Duration::from_secs(1),
        agent: AgentConfig::with_interval(Duration::from_secs(3600)),
        ..PoolConfig::default()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn registry_size_tracks_successful_operations(ops in prop::collection::vec(op_strategy(), 1..24)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async {
            let pool = test_pool();
            let mut model: HashSet<&str> = HashSet::new();

            for op in ops {
                match op {
                    Op::Add(i) => {
                        let name = NAMES[i];
                        let result = pool.add_agent(name).await;
                        if model.insert(name) {
                            prop_assert!(result.is_ok());
                        } else {
                            let duplicate = matches!(
                                result,
                                Err(EmpirionError::Pool(PoolError::DuplicateName { .. }))
                            );
                            prop_assert!(duplicate);
                        }
                    }
                    Op::Remove(i) => {
                        let name = NAMES[i];
                        let result = pool.remove_agent(name).await;
                        if model.remove(name) {
                            prop_assert!(result.is_ok());
                        } else {
                            let missing = matches!(
                                result,
                                Err(EmpirionError::Pool(PoolError::NotFound { .. }))
                            );
                            prop_assert!(missing);
                        }
                    }
                }

                prop_assert_eq!(pool.len(), model.len());
                prop_assert_eq!(pool.task_count(), model.len());
            }

            pool.shutdown().await.unwrap();
            prop_assert!(pool.is_empty());
            prop_assert_eq!(pool.task_count(), 0);
            Ok(())
        })?;
    }
}
