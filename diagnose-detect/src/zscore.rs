//! # Z-Score Time-Series Detector
//!
//! Computes mean and population standard deviation over a named series and
//! flags points whose absolute Z-score exceeds a configured threshold.
//! Series with fewer than two points or a zero standard deviation are
//! skipped — there is no meaningful spread to score against.

use diagnose_shared::models::{Anomaly, AnomalySeverity, AnomalyType};

use crate::input::{DetectionInput, TimeSeriesPoint};

#[derive(Debug)]
pub struct ZScoreDetector {
    pub threshold: f64,
}

impl Default for ZScoreDetector {
    fn default() -> Self {
        Self { threshold: 3.0 }
    }
}

impl ZScoreDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn detect(&self, input: &DetectionInput) -> Vec<Anomaly> {
        let Some(series_map) = &input.time_series else {
            return Vec::new();
        };

        series_map
            .values()
            .flat_map(|series| self.detect_series(series))
            .collect()
    }

    fn detect_series(&self, series: &[TimeSeriesPoint]) -> Vec<Anomaly> {
        if series.len() < 2 {
            return Vec::new();
        }

        let n = series.len() as f64;
        let mean = series.iter().map(|p| p.value).sum::<f64>() / n;
        let variance = series.iter().map(|p| (p.value - mean).powi(2)).sum::<f64>() / n;
        let stddev = variance.sqrt();
        if stddev == 0.0 {
            return Vec::new();
        }

        series
            .iter()
            .filter_map(|point| {
                let z = (point.value - mean) / stddev;
                if z.abs() <= self.threshold {
                    return None;
                }
                let anomaly_type = if z > 0.0 {
                    AnomalyType::TrafficSpike
                } else {
                    AnomalyType::TrafficDrop
                };
                Some(
                    Anomaly::new(
                        anomaly_type,
                        severity_for_z(z.abs()),
                        format!("value {:.2} is {z:.2} standard deviations from mean {mean:.2}", point.value),
                        point.timestamp,
                        point.timestamp,
                    )
                    .with_metadata("z_score", serde_json::json!(z))
                    .with_metadata("mean", serde_json::json!(mean))
                    .with_metadata("stddev", serde_json::json!(stddev)),
                )
            })
            .collect()
    }
}

/// Pure severity-tier mapping: |Z| > 5 -> Critical, > 4 -> High, > 3 -> Medium, else Low.
pub fn severity_for_z(abs_z: f64) -> AnomalySeverity {
    if abs_z > 5.0 {
        AnomalySeverity::Critical
    } else if abs_z > 4.0 {
        AnomalySeverity::High
    } else if abs_z > 3.0 {
        AnomalySeverity::Medium
    } else {
        AnomalySeverity::Low
    }
}
