//! Data model types shared across every crate in the workspace.

pub mod anomaly;
pub mod progress;
pub mod request;
pub mod result;
pub mod retrieval;
pub mod rule;
pub mod severity;
pub mod task;

pub use anomaly::{Anomaly, AnomalyType};
pub use progress::{ProgressEvent, ProgressStatus};
pub use request::{DiagnosisRequest, Fingerprint, MiddlewareKind};
pub use result::{
    DiagnosisResultReport, DiagnosisStatus, Issue, Recommendation, RootCauseResult,
};
pub use retrieval::RetrievedDocument;
pub use rule::{RcaCondition, RcaRule, Rule, RuleValidationError};
pub use severity::{AnomalySeverity, IssueSeverity};
pub use task::{StatusError, Task, TaskPayload, TaskState, TaskStatus};
