//! # Canonical Plugin Capability Contract
//!
//! Every middleware plugin — native or legacy-adapted — exposes this
//! surface. `diagnose`, the `collect_*` operations, `get_configuration`
//! and `health_check` all require a live connection; a plugin establishes
//! and owns that connection on first use for a given target and must not
//! assume the connection is shared across orchestration runs.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diagnose_shared::error::DiagnosisResult;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct PluginMetadata {
    pub name: String,
    pub version: String,
    pub supported_versions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DiagnosticSnapshot {
    pub metrics: HashMap<String, f64>,
    pub logs: Vec<LogEntry>,
    pub configuration: Option<HashMap<String, Value>>,
    pub issues: Vec<RawIssue>,
}

#[derive(Debug, Clone)]
pub struct RawIssue {
    pub title: String,
    pub description: String,
    pub severity: String,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub healthy: bool,
    pub connectivity: bool,
    pub latency: Option<Duration>,
    pub details: HashMap<String, String>,
}

impl HealthStatus {
    pub fn unhealthy(reason: impl Into<String>) -> Self {
        let mut details = HashMap::new();
        details.insert("error".to_string(), reason.into());
        Self {
            healthy: false,
            connectivity: false,
            latency: None,
            details,
        }
    }
}

/// A proposed remediation for an `Issue`.
#[derive(Debug, Clone)]
pub struct Fix {
    pub description: String,
    pub kind: FixKind,
}

#[derive(Debug, Clone)]
pub enum FixKind {
    Configuration { key: String, value: Value },
    Command { command: String },
}

#[derive(Debug, Clone)]
pub struct FixResult {
    pub success: bool,
    pub message: String,
}

/// Canonical operations every middleware plugin exposes, natively or via
/// the legacy adapter.
#[async_trait]
pub trait PluginCapability: Send + Sync + std::fmt::Debug {
    fn metadata(&self) -> PluginMetadata;

    async fn diagnose(&self, config: &HashMap<String, String>) -> DiagnosisResult<DiagnosticSnapshot>;

    async fn collect_metrics(&self) -> DiagnosisResult<HashMap<String, f64>>;

    async fn collect_logs(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> DiagnosisResult<Vec<LogEntry>>;

    async fn get_configuration(&self) -> DiagnosisResult<HashMap<String, Value>>;

    async fn health_check(&self) -> DiagnosisResult<HealthStatus>;

    /// Whether `issue` has a known automatic remediation, and what it is.
    async fn can_auto_fix(&self, issue_title: &str) -> (bool, Option<Fix>) {
        let _ = issue_title;
        (false, None)
    }

    async fn execute_fix(&self, fix: &Fix) -> DiagnosisResult<FixResult>;

    /// Whether the plugin advertises `capability` by name. Lets callers
    /// distinguish "not supported" from "supported but failed" without
    /// pattern-matching on the error sentinel.
    fn supports(&self, capability: &str) -> bool {
        matches!(
            capability,
            "diagnose" | "collect_metrics" | "collect_logs" | "get_configuration" | "health_check"
        )
    }
}
