//! Two tasks for the same `(middleware, instance)` fingerprint submitted
//! within the cache TTL collect from the plugin exactly once; the second
//! task's report is marked `from_cache`.

mod common;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use diagnose_core::detect::{DetectorSuite, RootCauseEngine};
use diagnose_core::orchestration::{Orchestrator, ResultCache};
use diagnose_core::plugin::capability::{DiagnosticSnapshot, Fix, FixResult, HealthStatus, LogEntry, PluginCapability, PluginMetadata};
use diagnose_core::plugin::registry::PluginRegistry;
use diagnose_core::rules::{JaqConditionEvaluator, KnowledgeBase, RuleEngine};
use diagnose_core::shared::error::{DiagnosisError, DiagnosisResult};
use diagnose_core::shared::models::{DiagnosisRequest, Task, TaskState};
use diagnose_core::worker::{CompositeNotifier, InMemoryQueue, InMemoryTaskStore, ProgressHub, TaskQueue, TaskStore, WorkerPool, WorkerPoolConfig};

#[derive(Debug)]
struct CountingPlugin {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl PluginCapability for CountingPlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata {
            name: "counting".to_string(),
            version: "1.0".to_string(),
            supported_versions: vec![],
        }
    }

    async fn diagnose(&self, _config: &HashMap<String, String>) -> DiagnosisResult<DiagnosticSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut metrics = HashMap::new();
        metrics.insert("memory_used".to_string(), 10.0);
        Ok(DiagnosticSnapshot {
            metrics,
            logs: Vec::new(),
            configuration: None,
            issues: Vec::new(),
        })
    }

    async fn collect_metrics(&self) -> DiagnosisResult<HashMap<String, f64>> {
        Ok(HashMap::new())
    }

    async fn collect_logs(
        &self,
        _start: chrono::DateTime<chrono::Utc>,
        _end: chrono::DateTime<chrono::Utc>,
        _limit: usize,
    ) -> DiagnosisResult<Vec<LogEntry>> {
        Ok(Vec::new())
    }

    async fn get_configuration(&self) -> DiagnosisResult<HashMap<String, serde_json::Value>> {
        Err(DiagnosisError::not_supported("get_configuration"))
    }

    async fn health_check(&self) -> DiagnosisResult<HealthStatus> {
        Ok(HealthStatus {
            healthy: true,
            connectivity: true,
            latency: None,
            details: HashMap::new(),
        })
    }

    async fn execute_fix(&self, _fix: &Fix) -> DiagnosisResult<FixResult> {
        Err(DiagnosisError::not_supported("execute_fix"))
    }
}

#[tokio::test]
async fn second_task_for_same_fingerprint_hits_cache() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = Arc::new(PluginRegistry::new());
    registry.register("redis", Arc::new(CountingPlugin { calls: calls.clone() }));
    let rule_engine = Arc::new(RuleEngine::new(Arc::new(KnowledgeBase::new()), Arc::new(JaqConditionEvaluator::new())));
    let orchestrator = Arc::new(Orchestrator::new(
        registry,
        rule_engine,
        Arc::new(DetectorSuite::default()),
        Arc::new(RootCauseEngine::default()),
        Arc::new(ResultCache::new(Duration::from_secs(600))),
        None,
    ));

    let queue: Arc<dyn TaskQueue> = Arc::new(InMemoryQueue::new(8));
    let store: Arc<dyn TaskStore> = Arc::new(InMemoryTaskStore::new());
    let hub = Arc::new(ProgressHub::new());
    let notifier = Arc::new(CompositeNotifier::new(Vec::new()));

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

    let first_id = uuid::Uuid::new_v4();
    store.create(first_id).await.unwrap();
    queue
        .enqueue(Task::new_diagnosis(first_id, DiagnosisRequest::new("redis", "r1"), chrono::Utc::now()))
        .await
        .unwrap();
    wait_for_terminal(&store, first_id).await;

    let second_id = uuid::Uuid::new_v4();
    store.create(second_id).await.unwrap();
    queue
        .enqueue(Task::new_diagnosis(second_id, DiagnosisRequest::new("redis", "r1"), chrono::Utc::now()))
        .await
        .unwrap();
    wait_for_terminal(&store, second_id).await;

    let second_report = store.get_result(second_id).await.unwrap().expect("second task completed");
    assert!(second_report.from_cache);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    pool.stop().await;
}

async fn wait_for_terminal(store: &Arc<dyn TaskStore>, task_id: uuid::Uuid) {
    for _ in 0..200 {
        if store.get_status(task_id).await.unwrap().state.is_terminal() {
            assert_eq!(store.get_status(task_id).await.unwrap().state, TaskState::Completed);
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("task {task_id} did not reach a terminal state in time");
}
