//! # Legacy Plugin Adapter
//!
//! Wraps a [`LegacyPlugin`] and projects it onto the canonical
//! [`PluginCapability`] surface:
//!
//! - `diagnose` composes `connect` (if not connected) + `get_diagnostic_data`
//!   + rule evaluation against `get_builtin_rules`.
//! - `health_check` composes `connect` + `ping`, measuring latency; a
//!   connection failure produces `status=unhealthy, connectivity=false`
//!   with the error in `details` — never an operation failure.
//! - `get_configuration` returns the configuration sub-map of
//!   `get_diagnostic_data`, failing with `NotSupported` when it's `None`.
//! - `collect_logs` filters the snapshot's slow-query list by
//!   `[start, end]` and `limit`.
//! - `execute_fix` translates a configuration/command fix into a legacy
//!   `command` (dry-run passthrough) and returns a success/failure record.
//! - `can_auto_fix` returns `false` unless the legacy plugin explicitly
//!   advertises the command.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diagnose_shared::error::{DiagnosisError, DiagnosisResult};
use serde_json::Value;
use tracing::{debug, warn};

use crate::capability::{
    DiagnosticSnapshot, Fix, FixKind, FixResult, HealthStatus, LogEntry, PluginCapability,
    PluginMetadata, RawIssue,
};
use crate::legacy::LegacyPlugin;

#[derive(Debug)]
pub struct LegacyPluginAdapter<P: LegacyPlugin> {
    inner: P,
    name: String,
    version: String,
}

impl<P: LegacyPlugin> LegacyPluginAdapter<P> {
    pub fn new(inner: P, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            inner,
            name: name.into(),
            version: version.into(),
        }
    }

    async fn ensure_connected(&self) -> DiagnosisResult<()> {
        if self.inner.is_connected() {
            return Ok(());
        }
        self.inner.connect().await
    }
}

#[async_trait]
impl<P: LegacyPlugin> PluginCapability for LegacyPluginAdapter<P> {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata {
            name: self.name.clone(),
            version: self.version.clone(),
            supported_versions: vec![self.version.clone()],
        }
    }

    async fn diagnose(&self, _config: &HashMap<String, String>) -> DiagnosisResult<DiagnosticSnapshot> {
        self.ensure_connected().await?;
        let data = self.inner.get_diagnostic_data().await?;
        let rules = self.inner.get_builtin_rules().await.unwrap_or_else(|e| {
            warn!(error = %e, "legacy plugin builtin rules unavailable, continuing without them");
            Vec::new()
        });

        let issues = rules
            .into_iter()
            .filter(|rule| evaluate_builtin_condition(&rule.condition, &data.metrics))
            .map(|rule| RawIssue {
                title: rule.title,
                description: rule.recommendation,
                severity: rule.severity,
            })
            .collect();

        Ok(DiagnosticSnapshot {
            metrics: data.metrics,
            logs: Vec::new(),
            configuration: data.config,
            issues,
        })
    }

    async fn collect_metrics(&self) -> DiagnosisResult<HashMap<String, f64>> {
        self.ensure_connected().await?;
        self.inner.collect_metrics().await
    }

    async fn collect_logs(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> DiagnosisResult<Vec<LogEntry>> {
        self.ensure_connected().await?;
        let data = self.inner.get_diagnostic_data().await?;
        let entries = data
            .slow_queries
            .into_iter()
            .filter(|q| q.timestamp >= start && q.timestamp <= end)
            .take(limit)
            .map(|q| LogEntry {
                timestamp: q.timestamp,
                level: "WARN".to_string(),
                message: format!("slow query ({:?}): {}", q.duration, q.query),
            })
            .collect();
        Ok(entries)
    }

    async fn get_configuration(&self) -> DiagnosisResult<HashMap<String, Value>> {
        self.ensure_connected().await?;
        let data = self.inner.get_diagnostic_data().await?;
        data.config
            .ok_or_else(|| DiagnosisError::not_supported("get_configuration"))
    }

    async fn health_check(&self) -> DiagnosisResult<HealthStatus> {
        let start = Instant::now();
        if let Err(e) = self.ensure_connected().await {
            debug!(error = %e, "legacy plugin connect failed during health check");
            return Ok(HealthStatus::unhealthy(e.to_string()));
        }
        match self.inner.ping().await {
            Ok(()) => Ok(HealthStatus {
                healthy: true,
                connectivity: true,
                latency: Some(start.elapsed()),
                details: HashMap::new(),
            }),
            Err(e) => Ok(HealthStatus::unhealthy(e.to_string())),
        }
    }

    async fn can_auto_fix(&self, issue_title: &str) -> (bool, Option<Fix>) {
        let fixable = self.inner.auto_fixable_commands();
        if let Some(command) = fixable.into_iter().find(|c| c == issue_title) {
            (
                true,
                Some(Fix {
                    description: format!("run legacy command: {command}"),
                    kind: FixKind::Command { command },
                }),
            )
        } else {
            (false, None)
        }
    }

    async fn execute_fix(&self, fix: &Fix) -> DiagnosisResult<FixResult> {
        self.ensure_connected().await?;
        let command = match &fix.kind {
            FixKind::Command { command } => command.clone(),
            FixKind::Configuration { key, value } => format!("set {key} {value}"),
        };
        let result = self.inner.execute(&command).await?;
        Ok(FixResult {
            success: result.success,
            message: result.output,
        })
    }

    fn supports(&self, capability: &str) -> bool {
        match capability {
            "execute_fix" | "can_auto_fix" => !self.inner.auto_fixable_commands().is_empty(),
            _ => true,
        }
    }
}

/// Minimal numeric-threshold evaluation for legacy builtin rule conditions
/// of the shape `metric_name > number`. Legacy rules predate the grammar
/// engine used by `diagnose-rules`; this adapter does not pull in a full
/// expression evaluator for a handful of pre-migration conditions.
fn evaluate_builtin_condition(condition: &str, metrics: &HashMap<String, f64>) -> bool {
    let ops = [">=", "<=", "==", "!=", ">", "<"];
    for op in ops {
        if let Some((lhs, rhs)) = condition.split_once(op) {
            let lhs = lhs.trim();
            let Ok(rhs_value) = rhs.trim().parse::<f64>() else {
                return false;
            };
            let Some(metric_value) = metrics.get(lhs) else {
                return false;
            };
            return match op {
                ">=" => *metric_value >= rhs_value,
                "<=" => *metric_value <= rhs_value,
                "==" => (*metric_value - rhs_value).abs() < f64::EPSILON,
                "!=" => (*metric_value - rhs_value).abs() >= f64::EPSILON,
                ">" => *metric_value > rhs_value,
                "<" => *metric_value < rhs_value,
                _ => unreachable!(),
            };
        }
    }
    false
}
