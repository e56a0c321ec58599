//! Diagnosis report: issues, recommendations and the overall status rollup.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::severity::IssueSeverity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisStatus {
    Unknown,
    Healthy,
    Warning,
    Critical,
}

impl std::fmt::Display for DiagnosisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DiagnosisStatus::Unknown => "unknown",
            DiagnosisStatus::Healthy => "healthy",
            DiagnosisStatus::Warning => "warning",
            DiagnosisStatus::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub severity: IssueSeverity,
    pub source: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metric_context: HashMap<String, f64>,
    #[serde(default)]
    pub free_form_context: HashMap<String, serde_json::Value>,
}

impl Issue {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        severity: IssueSeverity,
        source: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            severity,
            source: source.into(),
            timestamp,
            metric_context: HashMap::new(),
            free_form_context: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub action: String,
    pub priority: i32,
    pub confidence: f64,
    pub rule_id: Option<Uuid>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootCauseResult {
    pub root_cause: String,
    pub confidence: f64,
    pub actions: Vec<String>,
}

impl RootCauseResult {
    pub fn unknown() -> Self {
        Self {
            root_cause: "Unknown".to_string(),
            confidence: 0.0,
            actions: Vec::new(),
        }
    }
}

/// Result of an end-to-end diagnosis run. Written at most once per task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisResultReport {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub status: DiagnosisStatus,
    pub summary: String,
    pub issues: Vec<Issue>,
    pub metrics_snapshot: HashMap<String, f64>,
    pub recommendations: Vec<Recommendation>,
    pub root_cause: Option<RootCauseResult>,
    /// Best-effort cache-hit marker; not part of the persisted identity.
    #[serde(default)]
    pub from_cache: bool,
}

impl DiagnosisResultReport {
    /// Roll up overall status from the issue severities present, per §4.7 step 8:
    /// Critical if any Critical issue, else Warning if any Error issue, else Healthy.
    pub fn status_from_issues(issues: &[Issue]) -> DiagnosisStatus {
        if issues.iter().any(|i| i.severity == IssueSeverity::Critical) {
            DiagnosisStatus::Critical
        } else if issues.iter().any(|i| i.severity == IssueSeverity::Error) {
            DiagnosisStatus::Warning
        } else {
            DiagnosisStatus::Healthy
        }
    }
}
