//! Input shape shared by every detector.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TimeSeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, Default)]
pub struct DetectionInput {
    pub metrics: Option<HashMap<String, f64>>,
    pub logs: Option<Vec<LogRecord>>,
    pub time_series: Option<HashMap<String, Vec<TimeSeriesPoint>>>,
    pub context: HashMap<String, Value>,
}
