//! # Diagnosis Orchestrator (C7)
//!
//! Runs the per-request pipeline: cache probe, plugin resolution,
//! collection, detection, rule matching, root-cause analysis, optional LLM
//! augmentation, and report assembly. A mutex keyed by the request's
//! fingerprint serialises duplicate concurrent work for the same target.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use diagnose_detect::{DetectionInput, DetectorSuite, LogRecord as DetectLogRecord, RootCauseEngine};
use diagnose_plugin::registry::PluginRegistry;
use diagnose_retrieval::HybridRetriever;
use diagnose_rules::RuleEngine;
use diagnose_shared::error::{DiagnosisError, DiagnosisResult};
use diagnose_shared::models::{
    Anomaly, AnomalySeverity, DiagnosisRequest, DiagnosisResultReport, Issue, IssueSeverity, ProgressEvent,
    ProgressStatus,
};
use diagnose_shared::resilience::{CircuitBreaker, CircuitBreakerBehavior, CircuitBreakerConfig};
use tracing::{instrument, warn};

use crate::cache::ResultCache;
use crate::llm::{build_prompt, parse_recommendations, LlmClient};
use crate::progress::ProgressSink;

/// Configured collaborators an LLM augmentation pass needs beyond the
/// client itself.
pub struct LlmAugmentation {
    pub client: Arc<dyn LlmClient>,
    pub retriever: Arc<HybridRetriever>,
    pub timeout: Duration,
    pub retrieval_top_k: usize,
}

impl std::fmt::Debug for LlmAugmentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmAugmentation").field("timeout", &self.timeout).finish()
    }
}

#[derive(Debug)]
pub struct Orchestrator {
    plugins: Arc<PluginRegistry>,
    rule_engine: Arc<RuleEngine>,
    detectors: Arc<DetectorSuite>,
    root_cause: Arc<RootCauseEngine>,
    cache: Arc<ResultCache>,
    llm: Option<LlmAugmentation>,
    /// One breaker per middleware kind: a collector repeatedly timing out
    /// or erroring for one target shouldn't also throttle unrelated ones.
    breakers: DashMap<String, Arc<CircuitBreaker>>,
}

impl Orchestrator {
    pub fn new(
        plugins: Arc<PluginRegistry>,
        rule_engine: Arc<RuleEngine>,
        detectors: Arc<DetectorSuite>,
        root_cause: Arc<RootCauseEngine>,
        cache: Arc<ResultCache>,
        llm: Option<LlmAugmentation>,
    ) -> Self {
        Self {
            plugins,
            rule_engine,
            detectors,
            root_cause,
            cache,
            llm,
            breakers: DashMap::new(),
        }
    }

    fn breaker_for(&self, middleware: &str) -> Arc<CircuitBreaker> {
        self.breakers
            .entry(middleware.to_string())
            .or_insert_with(|| Arc::new(CircuitBreaker::new(middleware.to_string(), CircuitBreakerConfig::default())))
            .clone()
    }

    #[instrument(skip(self, request, progress), fields(middleware = %request.middleware, instance = %request.instance))]
    pub async fn diagnose(
        &self,
        request: &DiagnosisRequest,
        progress: &dyn ProgressSink,
    ) -> DiagnosisResult<DiagnosisResultReport> {
        let fingerprint = request.fingerprint();

        if let Some(cached) = self.cache.get(&fingerprint) {
            return Ok(with_cache_hit_marker(cached));
        }

        let lock = self.cache.lock_for(&fingerprint);
        let _guard = lock.lock().await;

        // Re-check: another run may have populated the cache while we
        // waited for the lock.
        if let Some(cached) = self.cache.get(&fingerprint) {
            return Ok(with_cache_hit_marker(cached));
        }

        let plugin = self.plugins.get(request.middleware.as_str())?;
        let breaker = self.breaker_for(request.middleware.as_str());

        if !breaker.should_allow() {
            return Err(DiagnosisError::DataCollectionError(format!(
                "circuit open for middleware {}: too many recent collection failures",
                request.middleware
            )));
        }

        progress.emit(ProgressEvent::new("Collection", ProgressStatus::InProgress, "collecting diagnostic data"));
        let config: HashMap<String, String> = request.filters.clone();
        let collection_start = std::time::Instant::now();
        let snapshot = match plugin.diagnose(&config).await {
            Ok(snapshot) => {
                breaker.record_success(collection_start.elapsed());
                snapshot
            }
            Err(e) => {
                breaker.record_failure(collection_start.elapsed());
                return Err(e);
            }
        };
        progress.emit(ProgressEvent::new("Collection", ProgressStatus::Completed, "collection complete"));

        let mut issues: Vec<Issue> = snapshot
            .issues
            .iter()
            .map(|raw| {
                Issue::new(
                    raw.title.clone(),
                    raw.description.clone(),
                    parse_issue_severity(&raw.severity),
                    "plugin",
                    chrono::Utc::now(),
                )
            })
            .collect();

        let detection_input = DetectionInput {
            metrics: Some(snapshot.metrics.clone()),
            logs: Some(
                snapshot
                    .logs
                    .iter()
                    .map(|log| DetectLogRecord {
                        level: log.level.clone(),
                        message: log.message.clone(),
                        timestamp: log.timestamp,
                    })
                    .collect(),
            ),
            time_series: None,
            context: HashMap::new(),
        };
        let anomalies = self.detectors.detect(&detection_input);
        issues.extend(anomalies.iter().map(anomaly_to_issue));

        let mut recommendations =
            self.rule_engine
                .evaluate(request.middleware.as_str(), &snapshot.metrics, &issues);

        let root_cause = self.root_cause.analyze(&anomalies);

        if let Some(augmentation) = &self.llm {
            match self.augment_with_llm(augmentation, &anomalies, &snapshot.metrics).await {
                Ok(mut llm_recs) => recommendations.append(&mut llm_recs),
                Err(e) => {
                    warn!(error = %e, "llm augmentation failed, keeping rule-based recommendations");
                }
            }
        }

        let status = DiagnosisResultReport::status_from_issues(&issues);
        let report = DiagnosisResultReport {
            id: uuid::Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
            status,
            summary: summarize(&issues, &root_cause),
            issues,
            metrics_snapshot: snapshot.metrics,
            recommendations,
            root_cause: Some(root_cause),
            from_cache: false,
        };

        self.cache.put(fingerprint, report.clone());
        Ok(report)
    }

    async fn augment_with_llm(
        &self,
        augmentation: &LlmAugmentation,
        anomalies: &[Anomaly],
        metrics: &HashMap<String, f64>,
    ) -> DiagnosisResult<Vec<diagnose_shared::models::Recommendation>> {
        let query = synthesize_query(anomalies);

        let passages = tokio::time::timeout(
            augmentation.timeout,
            augmentation
                .retriever
                .search(&query, augmentation.retrieval_top_k, augmentation.retrieval_top_k, augmentation.retrieval_top_k),
        )
        .await
        .map_err(|_| DiagnosisError::KnowledgeRetrievalFailed("retrieval timed out".to_string()))?
        .map_err(|e| DiagnosisError::KnowledgeRetrievalFailed(e.to_string()))?
        .into_iter()
        .map(|d| d.content)
        .collect::<Vec<_>>();

        let prompt = build_prompt(&passages, metrics, &query);

        let completion = tokio::time::timeout(augmentation.timeout, augmentation.client.complete(&prompt))
            .await
            .map_err(|_| DiagnosisError::LlmRequestFailed("llm request timed out".to_string()))?
            .map_err(|e| DiagnosisError::LlmRequestFailed(e.to_string()))?;

        parse_recommendations(&completion).map_err(|e| DiagnosisError::LlmRequestFailed(e.to_string()))
    }
}

fn with_cache_hit_marker(mut report: DiagnosisResultReport) -> DiagnosisResultReport {
    report.from_cache = true;
    report
}

fn synthesize_query(anomalies: &[Anomaly]) -> String {
    anomalies
        .iter()
        .take(3)
        .map(|a| format!("{:?}", a.anomaly_type))
        .collect::<Vec<_>>()
        .join(" ")
}

fn summarize(issues: &[Issue], root_cause: &diagnose_shared::models::RootCauseResult) -> String {
    if issues.is_empty() {
        return "no issues detected".to_string();
    }
    format!("{} issue(s) detected; likely root cause: {}", issues.len(), root_cause.root_cause)
}

fn anomaly_to_issue(anomaly: &Anomaly) -> Issue {
    Issue::new(
        format!("{:?}", anomaly.anomaly_type),
        anomaly.description.clone(),
        anomaly_severity_to_issue_severity(anomaly.severity),
        "detector",
        anomaly.start_time,
    )
}

fn anomaly_severity_to_issue_severity(severity: AnomalySeverity) -> IssueSeverity {
    match severity {
        AnomalySeverity::Low => IssueSeverity::Info,
        AnomalySeverity::Medium => IssueSeverity::Warning,
        AnomalySeverity::High => IssueSeverity::Error,
        AnomalySeverity::Critical => IssueSeverity::Critical,
    }
}

fn parse_issue_severity(raw: &str) -> IssueSeverity {
    match raw.to_lowercase().as_str() {
        "critical" => IssueSeverity::Critical,
        "error" => IssueSeverity::Error,
        "warning" => IssueSeverity::Warning,
        _ => IssueSeverity::Info,
    }
}
