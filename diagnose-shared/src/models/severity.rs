//! Severity scales used across issues and anomalies.
//!
//! Two distinct scales exist in the domain: issue severity (`Info < Warning
//! < Error < Critical`, per the glossary) and anomaly severity (`Low <
//! Medium < High < Critical`, per §3). They are kept as separate types
//! because they are not interchangeable — a detector never emits an
//! `IssueSeverity` and the knowledge base never stores an `AnomalySeverity`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalySeverity {
    Low,
    Medium,
    High,
    Critical,
}
