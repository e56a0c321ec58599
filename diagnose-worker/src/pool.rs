//! # Worker Pool (C9)
//!
//! N workers each loop dequeue → run → persist → broadcast → notify. Each
//! task runs against a fresh background context with its own deadline, not
//! the queue's cancellation token, so a pool shutdown signal doesn't abort
//! in-flight diagnoses; `stop` instead waits (up to a deadline) for workers
//! to drain naturally.

use std::sync::Arc;
use std::time::Duration;

use diagnose_orchestration::Orchestrator;
use diagnose_shared::error::DiagnosisError;
use diagnose_shared::models::{ProgressEvent, StatusError, Task, TaskPayload, TaskState};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::hub::{HubProgressSink, ProgressHub};
use crate::notifier::{CompositeNotifier, Notification};
use crate::queue::TaskQueue;
use crate::store::TaskStore;

/// Per-task wall-clock budget, independent of the pool's own shutdown
/// deadline: a diagnosis that overruns this is treated as a failure, not
/// left running forever.
const DEFAULT_TASK_DEADLINE: Duration = Duration::from_secs(300);

pub struct WorkerPoolConfig {
    pub worker_count: usize,
    pub task_deadline: Duration,
    pub shutdown_deadline: Duration,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            worker_count: 4,
            task_deadline: DEFAULT_TASK_DEADLINE,
            shutdown_deadline: Duration::from_secs(30),
        }
    }
}

pub struct WorkerPool {
    config: WorkerPoolConfig,
    queue: Arc<dyn TaskQueue>,
    store: Arc<dyn TaskStore>,
    hub: Arc<ProgressHub>,
    orchestrator: Arc<Orchestrator>,
    notifier: Arc<CompositeNotifier>,
    shutdown: CancellationToken,
    handles: std::sync::Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    pub fn new(
        config: WorkerPoolConfig,
        queue: Arc<dyn TaskQueue>,
        store: Arc<dyn TaskStore>,
        hub: Arc<ProgressHub>,
        orchestrator: Arc<Orchestrator>,
        notifier: Arc<CompositeNotifier>,
    ) -> Self {
        Self {
            config,
            queue,
            store,
            hub,
            orchestrator,
            notifier,
            shutdown: CancellationToken::new(),
            handles: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn start(self: &Arc<Self>) {
        let mut handles = self.handles.lock().expect("worker pool handles lock poisoned");
        for worker_id in 0..self.config.worker_count {
            let pool = self.clone();
            handles.push(tokio::spawn(async move { pool.run_worker(worker_id).await }));
        }
    }

    /// Signals all workers to stop taking new tasks and waits up to the
    /// configured deadline for in-flight tasks to drain.
    pub async fn stop(&self) {
        self.shutdown.cancel();
        self.queue.close();

        let handles = std::mem::take(&mut *self.handles.lock().expect("worker pool handles lock poisoned"));
        let drain = async {
            for handle in handles {
                let _ = handle.await;
            }
        };
        if tokio::time::timeout(self.config.shutdown_deadline, drain).await.is_err() {
            warn!("worker pool did not drain within the shutdown deadline");
        }
    }

    async fn run_worker(self: Arc<Self>, worker_id: usize) {
        info!(worker_id, "worker started");
        loop {
            let task = match self.queue.dequeue(&self.shutdown).await {
                Ok(task) => task,
                Err(_) => break,
            };
            self.process_task(worker_id, task).await;
        }
        info!(worker_id, "worker stopped");
    }

    #[instrument(skip(self, task), fields(task_id = %task.id, worker_id))]
    async fn process_task(&self, worker_id: usize, task: Task) {
        let task_id = task.id;

        let request = match &task.payload {
            TaskPayload::Diagnosis(request) => request.clone(),
            TaskPayload::Unknown(task_type) => {
                let err = DiagnosisError::UnknownTaskType {
                    task_type: task_type.clone(),
                };
                self.finish_with_error(worker_id, task_id, status_error_from(&err)).await;
                return;
            }
        };

        if let Err(e) = self.store.update_status(task_id, TaskState::Running).await {
            error!(worker_id, %task_id, error = %e, "failed to mark task running");
        }

        let sink = HubProgressSink::new(&self.hub, task_id);
        let deadline = self.config.task_deadline;
        let outcome = tokio::time::timeout(deadline, self.orchestrator.diagnose(&request, &sink)).await;

        match outcome {
            Ok(Ok(report)) => {
                let status = report.status;
                if let Err(e) = self.store.save_result(task_id, report).await {
                    error!(worker_id, %task_id, error = %e, "failed to persist successful result");
                }
                self.hub.broadcast(task_id, ProgressEvent::finished_completed("diagnosis complete"));
                self.notifier
                    .notify(&Notification {
                        status,
                        summary: format!("diagnosis {task_id} completed"),
                    })
                    .await
                    .unwrap_or_else(|e| warn!(worker_id, %task_id, error = %e, "notification dispatch had failures"));
            }
            Ok(Err(err)) => self.finish_with_error(worker_id, task_id, status_error_from(&err)).await,
            Err(_) => {
                self.finish_with_error(
                    worker_id,
                    task_id,
                    StatusError {
                        code: "TASK_DEADLINE_EXCEEDED".to_string(),
                        message: format!("task did not complete within {:?}", deadline),
                        suggestion: Some("increase the worker pool's task deadline or investigate a stuck plugin".to_string()),
                    },
                )
                .await
            }
        }
    }

    async fn finish_with_error(&self, worker_id: usize, task_id: uuid::Uuid, status_error: StatusError) {
        error!(worker_id, %task_id, code = %status_error.code, "task failed");
        if let Err(e) = self.store.save_error(task_id, status_error.clone()).await {
            error!(worker_id, %task_id, error = %e, "failed to persist task error");
        }
        self.hub
            .broadcast(task_id, ProgressEvent::finished_failed(status_error.message.clone()));
        self.notifier
            .notify(&Notification {
                status: diagnose_shared::models::DiagnosisStatus::Critical,
                summary: format!("diagnosis {task_id} failed: {}", status_error.message),
            })
            .await
            .unwrap_or_else(|e| warn!(worker_id, %task_id, error = %e, "notification dispatch had failures"));
    }
}

fn status_error_from(err: &DiagnosisError) -> StatusError {
    StatusError {
        code: err.code().to_string(),
        message: err.to_string(),
        suggestion: err.suggestion().map(str::to_string),
    }
}
