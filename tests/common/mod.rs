use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use diagnose_core::detect::{DetectorSuite, RootCauseEngine};
use diagnose_core::orchestration::{Orchestrator, ResultCache};
use diagnose_core::plugin::capability::{
    DiagnosticSnapshot, Fix, FixResult, HealthStatus, LogEntry, PluginCapability, PluginMetadata, RawIssue,
};
use diagnose_core::plugin::registry::PluginRegistry;
use diagnose_core::rules::{JaqConditionEvaluator, KnowledgeBase, RuleEngine};
use diagnose_core::shared::error::{DiagnosisError, DiagnosisResult};
use diagnose_core::shared::models::{IssueSeverity, Rule};
use uuid::Uuid;

/// A plugin whose reported metrics and issues are fixed at construction, for
/// driving the orchestration pipeline with a known-shape snapshot.
#[derive(Debug)]
pub struct ScriptedPlugin {
    pub metrics: HashMap<String, f64>,
    pub raw_issues: Vec<RawIssue>,
}

impl ScriptedPlugin {
    pub fn healthy() -> Self {
        let mut metrics = HashMap::new();
        metrics.insert("memory_used".to_string(), 512.0);
        metrics.insert("cpu_usage".to_string(), 10.0);
        Self {
            metrics,
            raw_issues: Vec::new(),
        }
    }

    pub fn with_high_cpu() -> Self {
        let mut metrics = HashMap::new();
        metrics.insert("cpu_usage".to_string(), 97.0);
        metrics.insert("cpu_threshold".to_string(), 90.0);
        Self {
            metrics,
            raw_issues: vec![RawIssue {
                title: "cpu saturated".to_string(),
                description: "cpu_usage at 97% of capacity".to_string(),
                severity: "error".to_string(),
            }],
        }
    }
}

#[async_trait]
impl PluginCapability for ScriptedPlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata {
            name: "scripted".to_string(),
            version: "1.0".to_string(),
            supported_versions: vec![],
        }
    }

    async fn diagnose(&self, _config: &HashMap<String, String>) -> DiagnosisResult<DiagnosticSnapshot> {
        Ok(DiagnosticSnapshot {
            metrics: self.metrics.clone(),
            logs: Vec::new(),
            configuration: None,
            issues: self.raw_issues.clone(),
        })
    }

    async fn collect_metrics(&self) -> DiagnosisResult<HashMap<String, f64>> {
        Ok(self.metrics.clone())
    }

    async fn collect_logs(
        &self,
        _start: chrono::DateTime<chrono::Utc>,
        _end: chrono::DateTime<chrono::Utc>,
        _limit: usize,
    ) -> DiagnosisResult<Vec<LogEntry>> {
        Ok(Vec::new())
    }

    async fn get_configuration(&self) -> DiagnosisResult<HashMap<String, serde_json::Value>> {
        Err(DiagnosisError::not_supported("get_configuration"))
    }

    async fn health_check(&self) -> DiagnosisResult<HealthStatus> {
        Ok(HealthStatus {
            healthy: true,
            connectivity: true,
            latency: None,
            details: HashMap::new(),
        })
    }

    async fn execute_fix(&self, _fix: &Fix) -> DiagnosisResult<FixResult> {
        Err(DiagnosisError::not_supported("execute_fix"))
    }
}

/// Builds an orchestrator wired with `plugin` registered under `middleware`,
/// a knowledge base seeded with a high-CPU rule, and no LLM augmentation.
pub fn orchestrator_with(middleware: &str, plugin: Arc<dyn PluginCapability>) -> Arc<Orchestrator> {
    let registry = Arc::new(PluginRegistry::new());
    registry.register(middleware, plugin);

    let kb = Arc::new(KnowledgeBase::new());
    kb.add(Rule {
        id: Uuid::new_v4(),
        name: "high cpu usage".to_string(),
        middleware_type: middleware.to_string(),
        category: "cpu".to_string(),
        severity: IssueSeverity::Error,
        condition: ".cpu_usage > 90".to_string(),
        recommendation: "scale horizontally or investigate hot keys".to_string(),
        priority: 50,
        tags: vec!["cpu".to_string()],
        version: 1,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    })
    .expect("seed rule is well-formed");

    let rule_engine = Arc::new(RuleEngine::new(kb, Arc::new(JaqConditionEvaluator::new())));

    Arc::new(Orchestrator::new(
        registry,
        rule_engine,
        Arc::new(DetectorSuite::default()),
        Arc::new(RootCauseEngine::default()),
        Arc::new(ResultCache::new(Duration::from_secs(600))),
        None,
    ))
}
