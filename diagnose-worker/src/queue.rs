//! # Task Queue (C8)
//!
//! `enqueue` appends; `dequeue` blocks until either a task is available or
//! the supplied cancellation token fires; `close` terminates blocked
//! dequeues. FIFO per producer; cross-producer ordering is unspecified,
//! which a bounded MPMC channel satisfies without extra bookkeeping.

use async_trait::async_trait;
use diagnose_shared::models::Task;
use thiserror::Error;
use tokio::sync::{mpsc, Notify};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue is full")]
    Full,
    #[error("dequeue was cancelled")]
    Cancelled,
    #[error("queue is closed")]
    Closed,
}

#[async_trait]
pub trait TaskQueue: Send + Sync + std::fmt::Debug {
    async fn enqueue(&self, task: Task) -> Result<(), QueueError>;
    async fn dequeue(&self, cancel: &CancellationToken) -> Result<Task, QueueError>;
    fn close(&self);
}

/// Bounded in-memory queue for single-process deployments. An external
/// list-backed broker is the multi-worker-process alternative (§4.8);
/// nothing in this crate depends on that being in-process.
#[derive(Debug)]
pub struct InMemoryQueue {
    sender: mpsc::Sender<Task>,
    receiver: tokio::sync::Mutex<mpsc::Receiver<Task>>,
    closed: Notify,
}

impl InMemoryQueue {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity);
        Self {
            sender,
            receiver: tokio::sync::Mutex::new(receiver),
            closed: Notify::new(),
        }
    }
}

#[async_trait]
impl TaskQueue for InMemoryQueue {
    async fn enqueue(&self, task: Task) -> Result<(), QueueError> {
        self.sender.try_send(task).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => QueueError::Full,
            mpsc::error::TrySendError::Closed(_) => QueueError::Closed,
        })
    }

    async fn dequeue(&self, cancel: &CancellationToken) -> Result<Task, QueueError> {
        let mut receiver = self.receiver.lock().await;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(QueueError::Cancelled),
            _ = self.closed.notified() => Err(QueueError::Closed),
            task = receiver.recv() => task.ok_or(QueueError::Closed),
        }
    }

    fn close(&self) {
        self.closed.notify_waiters();
    }
}
