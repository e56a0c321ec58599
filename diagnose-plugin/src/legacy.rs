//! # Legacy Operation-Style Plugin
//!
//! The pre-migration plugin shape: a flat set of imperative operations
//! rather than the canonical capability set. The adapter in `adapter.rs`
//! is the only seam allowed to bridge this surface to [`PluginCapability`].

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diagnose_shared::error::DiagnosisResult;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct SlowQueryEntry {
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub duration: Duration,
}

/// Legacy diagnostic snapshot shape, as returned by `get_diagnostic_data`.
#[derive(Debug, Clone)]
pub struct LegacyDiagnosticData {
    pub metrics: HashMap<String, f64>,
    pub slow_queries: Vec<SlowQueryEntry>,
    /// `None` when the underlying plugin has no configuration surface —
    /// the adapter maps this to `NotSupported` rather than an empty map.
    pub config: Option<HashMap<String, Value>>,
}

#[derive(Debug, Clone)]
pub struct LegacyBuiltinRule {
    pub condition: String,
    pub recommendation: String,
    pub title: String,
    pub severity: String,
}

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub success: bool,
    pub output: String,
}

#[async_trait]
pub trait LegacyPlugin: Send + Sync + std::fmt::Debug {
    async fn connect(&self) -> DiagnosisResult<()>;
    async fn disconnect(&self) -> DiagnosisResult<()>;
    async fn ping(&self) -> DiagnosisResult<()>;
    async fn execute(&self, command: &str) -> DiagnosisResult<CommandResult>;
    async fn collect_metrics(&self) -> DiagnosisResult<HashMap<String, f64>>;
    async fn get_diagnostic_data(&self) -> DiagnosisResult<LegacyDiagnosticData>;
    async fn get_builtin_rules(&self) -> DiagnosisResult<Vec<LegacyBuiltinRule>>;
    fn is_connected(&self) -> bool;

    /// Legacy plugins rarely advertise auto-fix; default to none.
    fn auto_fixable_commands(&self) -> Vec<String> {
        Vec::new()
    }
}
