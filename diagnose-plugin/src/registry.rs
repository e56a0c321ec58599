//! # Plugin Registry
//!
//! Resolves a [`MiddlewareKind`]-shaped key to its registered
//! [`PluginCapability`]. Lookups happen on every orchestration run, so the
//! registry is a `DashMap` rather than a mutex-guarded `HashMap`.

use std::sync::Arc;

use dashmap::DashMap;
use diagnose_shared::error::{DiagnosisError, DiagnosisResult};

use crate::capability::PluginCapability;

#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: DashMap<String, Arc<dyn PluginCapability>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, middleware: impl Into<String>, plugin: Arc<dyn PluginCapability>) {
        self.plugins.insert(middleware.into(), plugin);
    }

    pub fn deregister(&self, middleware: &str) -> bool {
        self.plugins.remove(middleware).is_some()
    }

    pub fn get(&self, middleware: &str) -> DiagnosisResult<Arc<dyn PluginCapability>> {
        self.plugins
            .get(middleware)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| DiagnosisError::plugin_not_found(middleware))
    }

    pub fn is_registered(&self, middleware: &str) -> bool {
        self.plugins.contains_key(middleware)
    }

    pub fn registered_middlewares(&self) -> Vec<String> {
        self.plugins.iter().map(|e| e.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{DiagnosticSnapshot, HealthStatus, LogEntry, PluginMetadata};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::collections::HashMap;

    #[derive(Debug)]
    struct NoopPlugin;

    #[async_trait]
    impl PluginCapability for NoopPlugin {
        fn metadata(&self) -> PluginMetadata {
            PluginMetadata {
                name: "noop".to_string(),
                version: "0.0".to_string(),
                supported_versions: vec![],
            }
        }

        async fn diagnose(
            &self,
            _config: &HashMap<String, String>,
        ) -> DiagnosisResult<DiagnosticSnapshot> {
            Ok(DiagnosticSnapshot {
                metrics: HashMap::new(),
                logs: Vec::new(),
                configuration: None,
                issues: Vec::new(),
            })
        }

        async fn collect_metrics(&self) -> DiagnosisResult<HashMap<String, f64>> {
            Ok(HashMap::new())
        }

        async fn collect_logs(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
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

        async fn execute_fix(
            &self,
            _fix: &crate::capability::Fix,
        ) -> DiagnosisResult<crate::capability::FixResult> {
            Err(DiagnosisError::not_supported("execute_fix"))
        }
    }

    #[test]
    fn get_unregistered_is_plugin_not_found() {
        let registry = PluginRegistry::new();
        let err = registry.get("redis").unwrap_err();
        assert!(matches!(err, DiagnosisError::PluginNotFound { .. }));
    }

    #[test]
    fn register_then_get_round_trips() {
        let registry = PluginRegistry::new();
        registry.register("redis", Arc::new(NoopPlugin));
        assert!(registry.is_registered("redis"));
        assert!(registry.get("redis").is_ok());
    }

    #[test]
    fn deregister_removes_entry() {
        let registry = PluginRegistry::new();
        registry.register("redis", Arc::new(NoopPlugin));
        assert!(registry.deregister("redis"));
        assert!(!registry.is_registered("redis"));
        assert!(!registry.deregister("redis"));
    }

    #[test]
    fn registered_middlewares_lists_all_keys() {
        let registry = PluginRegistry::new();
        registry.register("redis", Arc::new(NoopPlugin));
        registry.register("mysql", Arc::new(NoopPlugin));
        let mut names = registry.registered_middlewares();
        names.sort();
        assert_eq!(names, vec!["mysql".to_string(), "redis".to_string()]);
    }
}
