//! # Threshold Detector
//!
//! Fires a typed anomaly when a metric's value exceeds its configured
//! threshold. Severity is purely a function of the value/threshold ratio,
//! which keeps it trivially testable independent of the detector's I/O.

use std::collections::HashMap;

use chrono::Utc;
use diagnose_shared::models::{Anomaly, AnomalySeverity, AnomalyType};

use crate::input::DetectionInput;

#[derive(Debug, Clone)]
pub struct ThresholdRule {
    pub metric: String,
    pub anomaly_type: AnomalyType,
    pub threshold: f64,
}

#[derive(Debug, Default)]
pub struct ThresholdDetector {
    rules: Vec<ThresholdRule>,
}

impl ThresholdDetector {
    pub fn new(rules: Vec<ThresholdRule>) -> Self {
        Self { rules }
    }

    pub fn detect(&self, input: &DetectionInput) -> Vec<Anomaly> {
        let Some(metrics) = &input.metrics else {
            return Vec::new();
        };

        self.rules
            .iter()
            .filter_map(|rule| {
                let value = *metrics.get(&rule.metric)?;
                if value <= rule.threshold {
                    return None;
                }
                let ratio = value / rule.threshold;
                let now = Utc::now();
                Some(
                    Anomaly::new(
                        rule.anomaly_type,
                        severity_for_ratio(ratio),
                        format!(
                            "{} is {value:.2} ({ratio:.3}x threshold {})",
                            rule.metric, rule.threshold
                        ),
                        now,
                        now,
                    )
                    .with_metadata("ratio", serde_json::json!(ratio))
                    .with_metadata("value", serde_json::json!(value))
                    .with_metadata("threshold", serde_json::json!(rule.threshold)),
                )
            })
            .collect()
    }
}

/// Pure severity-tier mapping: ratio >= 1.5 -> Critical, >= 1.2 -> High,
/// >= 1.0 -> Medium, else Low.
pub fn severity_for_ratio(ratio: f64) -> AnomalySeverity {
    if ratio >= 1.5 {
        AnomalySeverity::Critical
    } else if ratio >= 1.2 {
        AnomalySeverity::High
    } else if ratio >= 1.0 {
        AnomalySeverity::Medium
    } else {
        AnomalySeverity::Low
    }
}
