//! # Progress Hub (C10)
//!
//! `topic → set<subscriber>`, one lock per topic via `DashMap`'s internal
//! sharding. Broadcast is non-blocking per subscriber: a full subscriber
//! channel drops that message for that subscriber rather than
//! back-pressuring the worker that's broadcasting. Unsubscribe is
//! idempotent.

use dashmap::DashMap;
use diagnose_orchestration::ProgressSink;
use diagnose_shared::models::ProgressEvent;
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

const SUBSCRIBER_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Default)]
pub struct ProgressHub {
    topics: DashMap<Uuid, Vec<(Uuid, mpsc::Sender<ProgressEvent>)>>,
}

impl ProgressHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to `topic`, returning a subscription handle and the
    /// receiving half of its channel.
    pub fn subscribe(&self, topic: Uuid) -> (Uuid, mpsc::Receiver<ProgressEvent>) {
        let subscriber_id = Uuid::new_v4();
        let (sender, receiver) = mpsc::channel(SUBSCRIBER_CHANNEL_CAPACITY);
        self.topics.entry(topic).or_default().push((subscriber_id, sender));
        (subscriber_id, receiver)
    }

    /// Idempotent: unsubscribing an already-removed (or never-registered)
    /// subscriber is a no-op.
    pub fn unsubscribe(&self, topic: Uuid, subscriber_id: Uuid) {
        if let Some(mut subscribers) = self.topics.get_mut(&topic) {
            subscribers.retain(|(id, _)| *id != subscriber_id);
        }
    }

    pub fn broadcast(&self, topic: Uuid, event: ProgressEvent) {
        let Some(subscribers) = self.topics.get(&topic) else {
            return;
        };
        for (subscriber_id, sender) in subscribers.iter() {
            if sender.try_send(event.clone()).is_err() {
                warn!(%topic, %subscriber_id, "dropping progress event for full or closed subscriber channel");
            }
        }
    }

    pub fn subscriber_count(&self, topic: Uuid) -> usize {
        self.topics.get(&topic).map(|s| s.len()).unwrap_or(0)
    }
}

/// Adapts a topic-scoped `ProgressHub` handle to the orchestrator's
/// `ProgressSink` seam.
#[derive(Debug)]
pub struct HubProgressSink<'a> {
    hub: &'a ProgressHub,
    topic: Uuid,
}

impl<'a> HubProgressSink<'a> {
    pub fn new(hub: &'a ProgressHub, topic: Uuid) -> Self {
        Self { hub, topic }
    }
}

impl ProgressSink for HubProgressSink<'_> {
    fn emit(&self, event: ProgressEvent) {
        self.hub.broadcast(self.topic, event);
    }
}
