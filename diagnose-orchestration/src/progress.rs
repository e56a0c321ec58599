//! Progress emission seam. The orchestrator emits events through this trait
//! rather than depending on the progress hub directly — the hub lives in
//! `diagnose-worker`, which composes the orchestrator, not the other way
//! around.

use diagnose_shared::models::ProgressEvent;

pub trait ProgressSink: Send + Sync + std::fmt::Debug {
    fn emit(&self, event: ProgressEvent);
}

/// Drops every event. Used where a caller has no progress subscriber to
/// notify (unit tests, one-off diagnosis runs outside the worker pool).
#[derive(Debug, Default)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: ProgressEvent) {}
}
