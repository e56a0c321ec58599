//! Properties that hold across the scheduler regardless of which task
//! ultimately succeeds or fails: status observations never regress, and a
//! task settles into exactly one terminal state.

mod common;

use std::sync::Arc;
use std::time::Duration;

use diagnose_core::shared::models::{DiagnosisRequest, Task, TaskState};
use diagnose_core::worker::{CompositeNotifier, InMemoryQueue, InMemoryTaskStore, ProgressHub, TaskQueue, TaskStore, WorkerPool, WorkerPoolConfig};

async fn run_to_terminal(middleware: &str, plugin_healthy: bool) -> (Arc<dyn TaskStore>, uuid::Uuid) {
    let queue: Arc<dyn TaskQueue> = Arc::new(InMemoryQueue::new(8));
    let store: Arc<dyn TaskStore> = Arc::new(InMemoryTaskStore::new());
    let hub = Arc::new(ProgressHub::new());
    let notifier = Arc::new(CompositeNotifier::new(Vec::new()));
    let plugin: Arc<dyn diagnose_core::plugin::capability::PluginCapability> = if plugin_healthy {
        Arc::new(common::ScriptedPlugin::healthy())
    } else {
        Arc::new(common::ScriptedPlugin::with_high_cpu())
    };
    let orchestrator = common::orchestrator_with("redis", plugin);

    let pool = Arc::new(WorkerPool::new(
        WorkerPoolConfig {
            worker_count: 1,
            ..WorkerPoolConfig::default()
        },
        queue.clone(),
        store.clone(),
        hub,
        orchestrator,
        notifier,
    ));
    pool.start();

    let task_id = uuid::Uuid::new_v4();
    store.create(task_id).await.unwrap();
    queue
        .enqueue(Task::new_diagnosis(task_id, DiagnosisRequest::new(middleware, "r1"), chrono::Utc::now()))
        .await
        .unwrap();

    for _ in 0..200 {
        if store.get_status(task_id).await.unwrap().state.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    pool.stop().await;
    (store, task_id)
}

#[tokio::test]
async fn status_ranks_never_regress_across_observations() {
    let (store, task_id) = run_to_terminal("redis", true).await;

    let mut last_rank = 0u8;
    for _ in 0..50 {
        let status = store.get_status(task_id).await.unwrap();
        assert!(status.state.rank() >= last_rank, "status rank regressed");
        last_rank = status.state.rank();
        if status.state.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test]
async fn task_settles_into_exactly_one_terminal_state() {
    let (store, task_id) = run_to_terminal("redis", false).await;
    let status = store.get_status(task_id).await.unwrap();
    assert!(status.state.is_terminal());
    assert!(matches!(status.state, TaskState::Completed) ^ matches!(status.state, TaskState::Failed));
    assert!(status.is_well_formed());
}

#[tokio::test]
async fn unregistered_middleware_also_settles_into_exactly_one_terminal_state() {
    let (store, task_id) = run_to_terminal("not-a-registered-middleware", true).await;
    let status = store.get_status(task_id).await.unwrap();
    assert_eq!(status.state, TaskState::Failed);
    assert!(status.is_well_formed());
}
