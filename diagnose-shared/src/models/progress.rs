//! Progress events broadcast under a task-ID topic by the progress hub.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    InProgress,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub step: String,
    pub status: ProgressStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl ProgressEvent {
    pub fn new(step: impl Into<String>, status: ProgressStatus, message: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            status,
            message: message.into(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Terminal events are the ones a stream reader should stop on.
    pub fn is_finished(&self) -> bool {
        self.step == "Finished"
    }

    pub fn finished_completed(message: impl Into<String>) -> Self {
        Self::new("Finished", ProgressStatus::Completed, message)
    }

    pub fn finished_failed(message: impl Into<String>) -> Self {
        Self::new("Finished", ProgressStatus::Failed, message)
    }
}
