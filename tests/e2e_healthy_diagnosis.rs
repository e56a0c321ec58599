//! A healthy target produces a Healthy report with no issues, end to end
//! through the scheduler, worker pool and orchestrator.

mod common;

use std::sync::Arc;
use std::time::Duration;

use diagnose_core::shared::models::{DiagnosisRequest, DiagnosisStatus, Task, TaskState};
use diagnose_core::worker::{CompositeNotifier, InMemoryQueue, InMemoryTaskStore, ProgressHub, TaskQueue, TaskStore, WorkerPool, WorkerPoolConfig};

#[tokio::test]
async fn healthy_target_completes_with_no_issues() {
    let queue: Arc<dyn TaskQueue> = Arc::new(InMemoryQueue::new(8));
    let store: Arc<dyn TaskStore> = Arc::new(InMemoryTaskStore::new());
    let hub = Arc::new(ProgressHub::new());
    let notifier = Arc::new(CompositeNotifier::new(Vec::new()));
    let orchestrator = common::orchestrator_with("redis", Arc::new(common::ScriptedPlugin::healthy()));

    let pool = Arc::new(WorkerPool::new(
        WorkerPoolConfig {
            worker_count: 2,
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
        .enqueue(Task::new_diagnosis(task_id, DiagnosisRequest::new("redis", "r1"), chrono::Utc::now()))
        .await
        .unwrap();

    let report = wait_for_result(&store, task_id).await;
    assert_eq!(report.status, DiagnosisStatus::Healthy);
    assert!(report.issues.is_empty());
    assert_eq!(store.get_status(task_id).await.unwrap().state, TaskState::Completed);

    pool.stop().await;
}

async fn wait_for_result(
    store: &Arc<dyn TaskStore>,
    task_id: uuid::Uuid,
) -> diagnose_core::shared::models::DiagnosisResultReport {
    for _ in 0..200 {
        if let Some(report) = store.get_result(task_id).await.unwrap() {
            return report;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("task {task_id} did not complete in time");
}
