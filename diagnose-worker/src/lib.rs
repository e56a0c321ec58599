//! Task scheduler: bounded queue, worker pool, progress hub, result store
//! and notifier fan-out (C8-C12).

pub mod hub;
pub mod notifier;
pub mod pool;
pub mod queue;
pub mod store;

pub use hub::{HubProgressSink, ProgressHub};
pub use notifier::{CompositeNotifier, Notification, NotificationChannel, NotifyError};
pub use pool::{WorkerPool, WorkerPoolConfig};
pub use queue::{InMemoryQueue, QueueError, TaskQueue};
pub use store::{InMemoryTaskStore, TaskStore};
