//! Knowledge-base rule and root-cause-analysis rule types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::anomaly::AnomalyType;
use super::severity::{AnomalySeverity, IssueSeverity};

/// Knowledge-base rule: `condition -> recommendation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: Uuid,
    pub name: String,
    pub middleware_type: String,
    pub category: String,
    pub severity: IssueSeverity,
    /// Expression string evaluated against the metrics context.
    pub condition: String,
    pub recommendation: String,
    pub priority: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RuleValidationError {
    #[error("rule name must not be empty")]
    EmptyName,
    #[error("rule middleware_type must not be empty")]
    EmptyMiddlewareType,
    #[error("rule condition must not be empty")]
    EmptyCondition,
}

impl Rule {
    pub fn validate(&self) -> Result<(), RuleValidationError> {
        if self.name.trim().is_empty() {
            return Err(RuleValidationError::EmptyName);
        }
        if self.middleware_type.trim().is_empty() {
            return Err(RuleValidationError::EmptyMiddlewareType);
        }
        if self.condition.trim().is_empty() {
            return Err(RuleValidationError::EmptyCondition);
        }
        Ok(())
    }
}

/// One leg of an RCA rule's condition list: an anomaly type plus an optional
/// severity. A blank severity matches any severity of that type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RcaCondition {
    pub anomaly_type: AnomalyType,
    pub severity: Option<AnomalySeverity>,
}

impl RcaCondition {
    pub fn new(anomaly_type: AnomalyType) -> Self {
        Self {
            anomaly_type,
            severity: None,
        }
    }

    pub fn with_severity(mut self, severity: AnomalySeverity) -> Self {
        self.severity = Some(severity);
        self
    }
}

/// Root-cause-analysis rule: AND of conditions over anomalies present in a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RcaRule {
    pub name: String,
    pub conditions: Vec<RcaCondition>,
    pub root_cause: String,
    pub priority: i32,
    pub actions: Vec<String>,
}
