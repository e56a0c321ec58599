//! # Log-Pattern Detector
//!
//! Counts log entries at `ERROR`/`CRITICAL`/`FATAL` level (case-insensitive)
//! and fires a `LogPattern` anomaly when the count exceeds a configured
//! threshold.

use chrono::Utc;
use diagnose_shared::models::{Anomaly, AnomalySeverity, AnomalyType};

use crate::input::DetectionInput;

const ERROR_LEVELS: [&str; 3] = ["ERROR", "CRITICAL", "FATAL"];

#[derive(Debug)]
pub struct LogPatternDetector {
    pub error_threshold: usize,
}

impl Default for LogPatternDetector {
    fn default() -> Self {
        Self { error_threshold: 5 }
    }
}

impl LogPatternDetector {
    pub fn new(error_threshold: usize) -> Self {
        Self { error_threshold }
    }

    pub fn detect(&self, input: &DetectionInput) -> Vec<Anomaly> {
        let Some(logs) = &input.logs else {
            return Vec::new();
        };

        let count = logs
            .iter()
            .filter(|log| ERROR_LEVELS.contains(&log.level.to_uppercase().as_str()))
            .count();

        if count <= self.error_threshold {
            return Vec::new();
        }

        let now = Utc::now();
        vec![Anomaly::new(
            AnomalyType::LogPattern,
            severity_for_count(count, self.error_threshold),
            format!("{count} error-level log entries exceed threshold {}", self.error_threshold),
            now,
            now,
        )
        .with_metadata("count", serde_json::json!(count))
        .with_metadata("error_threshold", serde_json::json!(self.error_threshold))]
    }
}

/// Pure severity-tier mapping: count > 5x threshold -> Critical, > 2x -> High, else Medium.
/// Only called once the count has already exceeded the threshold.
pub fn severity_for_count(count: usize, threshold: usize) -> AnomalySeverity {
    if threshold == 0 {
        return AnomalySeverity::Critical;
    }
    let multiple = count as f64 / threshold as f64;
    if multiple > 5.0 {
        AnomalySeverity::Critical
    } else if multiple > 2.0 {
        AnomalySeverity::High
    } else {
        AnomalySeverity::Medium
    }
}
