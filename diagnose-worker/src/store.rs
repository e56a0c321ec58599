//! # Task/Result Store (C11)
//!
//! `get_result` on a known task whose result is not yet persisted returns
//! `None`, distinguished from the `TaskNotFound` error for an unknown task
//! ID — the one piece of this contract easy to collapse into a single
//! sentinel by mistake.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use diagnose_shared::error::{DiagnosisError, DiagnosisResult};
use diagnose_shared::models::{DiagnosisResultReport, StatusError, TaskState, TaskStatus};
use uuid::Uuid;

#[async_trait]
pub trait TaskStore: Send + Sync + std::fmt::Debug {
    async fn create(&self, task_id: Uuid) -> DiagnosisResult<()>;
    async fn update_status(&self, task_id: Uuid, state: TaskState) -> DiagnosisResult<()>;
    async fn save_result(&self, task_id: Uuid, result: DiagnosisResultReport) -> DiagnosisResult<()>;
    async fn save_error(&self, task_id: Uuid, error: StatusError) -> DiagnosisResult<()>;
    async fn get_status(&self, task_id: Uuid) -> DiagnosisResult<TaskStatus>;
    async fn get_result(&self, task_id: Uuid) -> DiagnosisResult<Option<DiagnosisResultReport>>;
}

struct Record {
    status: TaskStatus,
    result: Option<DiagnosisResultReport>,
}

#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    records: RwLock<HashMap<Uuid, Record>>,
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record").field("status", &self.status).finish()
    }
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(&self, task_id: Uuid) -> DiagnosisResult<()> {
        let now = chrono::Utc::now();
        let mut records = self.records.write().expect("task store lock poisoned");
        records.insert(
            task_id,
            Record {
                status: TaskStatus::pending(task_id, now),
                result: None,
            },
        );
        Ok(())
    }

    async fn update_status(&self, task_id: Uuid, state: TaskState) -> DiagnosisResult<()> {
        let mut records = self.records.write().expect("task store lock poisoned");
        let record = records.get_mut(&task_id).ok_or_else(|| DiagnosisError::not_found(task_id.to_string()))?;
        record.status.state = state;
        record.status.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn save_result(&self, task_id: Uuid, result: DiagnosisResultReport) -> DiagnosisResult<()> {
        let mut records = self.records.write().expect("task store lock poisoned");
        let record = records.get_mut(&task_id).ok_or_else(|| DiagnosisError::not_found(task_id.to_string()))?;
        record.status.state = TaskState::Completed;
        record.status.updated_at = chrono::Utc::now();
        record.result = Some(result);
        Ok(())
    }

    async fn save_error(&self, task_id: Uuid, error: StatusError) -> DiagnosisResult<()> {
        let mut records = self.records.write().expect("task store lock poisoned");
        let record = records.get_mut(&task_id).ok_or_else(|| DiagnosisError::not_found(task_id.to_string()))?;
        record.status.state = TaskState::Failed;
        record.status.updated_at = chrono::Utc::now();
        record.status.error = Some(error);
        Ok(())
    }

    async fn get_status(&self, task_id: Uuid) -> DiagnosisResult<TaskStatus> {
        let records = self.records.read().expect("task store lock poisoned");
        records
            .get(&task_id)
            .map(|r| r.status.clone())
            .ok_or_else(|| DiagnosisError::not_found(task_id.to_string()))
    }

    async fn get_result(&self, task_id: Uuid) -> DiagnosisResult<Option<DiagnosisResultReport>> {
        let records = self.records.read().expect("task store lock poisoned");
        let record = records.get(&task_id).ok_or_else(|| DiagnosisError::not_found(task_id.to_string()))?;
        Ok(record.result.clone())
    }
}
