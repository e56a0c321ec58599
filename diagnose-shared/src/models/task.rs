//! Task envelope and status, per the data model's task lifecycle invariants.

use chrono::{DateTime, Utc};
use serde::{de::Error as _, ser::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use super::request::DiagnosisRequest;

/// Opaque payload a `Task` carries. Tagged on the wire by a `type` field;
/// a `type` this build doesn't recognize deserializes into `Unknown` rather
/// than failing the whole envelope, so the dispatcher can fail the task with
/// a typed error instead of never admitting it in the first place.
#[derive(Debug, Clone)]
pub enum TaskPayload {
    Diagnosis(DiagnosisRequest),
    Unknown(String),
}

impl Serialize for TaskPayload {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            TaskPayload::Diagnosis(request) => {
                #[derive(Serialize)]
                struct Tagged<'a> {
                    #[serde(rename = "type")]
                    task_type: &'static str,
                    #[serde(flatten)]
                    request: &'a DiagnosisRequest,
                }
                Tagged {
                    task_type: "diagnosis",
                    request,
                }
                .serialize(serializer)
            }
            TaskPayload::Unknown(task_type) => Err(S::Error::custom(format!(
                "cannot serialize unknown task type: {task_type}"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for TaskPayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let task_type = value
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        match task_type.as_str() {
            "diagnosis" => {
                let request = DiagnosisRequest::deserialize(value).map_err(D::Error::custom)?;
                Ok(TaskPayload::Diagnosis(request))
            }
            other => Ok(TaskPayload::Unknown(other.to_string())),
        }
    }
}

/// Queued unit of work carrying a diagnosis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub payload: TaskPayload,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new_diagnosis(id: Uuid, request: DiagnosisRequest, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            payload: TaskPayload::Diagnosis(request),
            created_at,
        }
    }

    pub fn task_type(&self) -> &str {
        match &self.payload {
            TaskPayload::Diagnosis(_) => "diagnosis",
            TaskPayload::Unknown(task_type) => task_type.as_str(),
        }
    }
}

/// Task lifecycle state. Ordered so that `state order Pending < Running <
/// {Completed, Failed}` can be checked with `<` — see [`TaskState::rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskState {
    /// Monotone rank used to assert that successive observations never
    /// regress (spec §8 property 1). `Completed` and `Failed` share a rank:
    /// both are terminal and neither precedes the other.
    pub fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Running => 1,
            Self::Completed | Self::Failed => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether `self -> next` is a legal transition (monotone, no skipping
    /// past a terminal state, no lateral move between the two terminal
    /// states).
    pub fn can_transition_to(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        next.rank() >= self.rank()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatus {
    pub task_id: Uuid,
    pub state: TaskState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub error: Option<StatusError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusError {
    pub code: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl TaskStatus {
    pub fn pending(task_id: Uuid, at: DateTime<Utc>) -> Self {
        Self {
            task_id,
            state: TaskState::Pending,
            created_at: at,
            updated_at: at,
            error: None,
        }
    }

    /// Invariant check: `error` non-empty iff `state = Failed`; `updated_at >= created_at`.
    pub fn is_well_formed(&self) -> bool {
        let error_matches_state = match self.state {
            TaskState::Failed => self.error.is_some(),
            _ => self.error.is_none(),
        };
        error_matches_state && self.updated_at >= self.created_at
    }
}
