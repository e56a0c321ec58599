//! # Notifier Fan-Out (C12)
//!
//! Each configured channel (webhook, email, chat, ...) implements `send`.
//! The composite notifier dispatches concurrently to every channel whose
//! severity filter admits the result's status, and aggregates per-channel
//! failures without letting one channel's failure suppress the others.

use async_trait::async_trait;
use diagnose_shared::models::DiagnosisStatus;
use futures::future::join_all;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Notification {
    pub status: DiagnosisStatus,
    pub summary: String,
}

#[async_trait]
pub trait NotificationChannel: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;
    /// Minimum status this channel wants to hear about.
    fn severity_filter(&self) -> DiagnosisStatus;
    async fn send(&self, notification: &Notification) -> Result<(), String>;
}

#[derive(Debug, Error)]
#[error("{0} channel(s) failed: {}", .failures.iter().map(|(c, e)| format!("{c}: {e}")).collect::<Vec<_>>().join("; "))]
pub struct NotifyError {
    pub failures: Vec<(String, String)>,
}

impl NotifyError {
    fn len(&self) -> usize {
        self.failures.len()
    }
}

#[derive(Debug, Default)]
pub struct CompositeNotifier {
    channels: Vec<Box<dyn NotificationChannel>>,
}

impl CompositeNotifier {
    pub fn new(channels: Vec<Box<dyn NotificationChannel>>) -> Self {
        Self { channels }
    }

    pub async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let admitted: Vec<&Box<dyn NotificationChannel>> = self
            .channels
            .iter()
            .filter(|c| notification.status >= c.severity_filter())
            .collect();

        let results = join_all(admitted.iter().map(|c| async move {
            let result = c.send(notification).await;
            (c.name().to_string(), result)
        }))
        .await;

        let failures: Vec<(String, String)> = results
            .into_iter()
            .filter_map(|(name, result)| result.err().map(|e| (name, e)))
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(NotifyError { failures })
        }
    }
}
