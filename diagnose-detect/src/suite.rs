//! Runs the threshold, Z-score and log-pattern detectors sequentially over
//! one `DetectionInput`, collecting every anomaly they produce.

use diagnose_shared::models::Anomaly;

use crate::input::DetectionInput;
use crate::log_pattern::LogPatternDetector;
use crate::threshold::ThresholdDetector;
use crate::zscore::ZScoreDetector;

#[derive(Debug, Default)]
pub struct DetectorSuite {
    pub threshold: ThresholdDetector,
    pub zscore: ZScoreDetector,
    pub log_pattern: LogPatternDetector,
}

impl DetectorSuite {
    pub fn new(threshold: ThresholdDetector, zscore: ZScoreDetector, log_pattern: LogPatternDetector) -> Self {
        Self {
            threshold,
            zscore,
            log_pattern,
        }
    }

    pub fn detect(&self, input: &DetectionInput) -> Vec<Anomaly> {
        let mut anomalies = self.threshold.detect(input);
        anomalies.extend(self.zscore.detect(input));
        anomalies.extend(self.log_pattern.detect(input));
        anomalies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threshold::ThresholdRule;
    use diagnose_shared::models::AnomalyType;
    use std::collections::HashMap;

    #[test]
    fn suite_aggregates_across_detector_families() {
        let suite = DetectorSuite::new(
            ThresholdDetector::new(vec![ThresholdRule {
                metric: "cpu_usage".to_string(),
                anomaly_type: AnomalyType::HighCpu,
                threshold: 90.0,
            }]),
            ZScoreDetector::default(),
            LogPatternDetector::new(5),
        );

        let mut metrics = HashMap::new();
        metrics.insert("cpu_usage".to_string(), 95.0);
        let input = DetectionInput {
            metrics: Some(metrics),
            ..Default::default()
        };

        let anomalies = suite.detect(&input);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].anomaly_type, AnomalyType::HighCpu);
    }
}
