//! # diagnose-detect
//!
//! Anomaly detectors (threshold, Z-score, log-pattern) and the root-cause
//! engine that matches their output against declared RCA rules.

pub mod input;
pub mod log_pattern;
pub mod root_cause;
pub mod suite;
pub mod threshold;
pub mod zscore;

pub use input::{DetectionInput, LogRecord, TimeSeriesPoint};
pub use log_pattern::LogPatternDetector;
pub use root_cause::RootCauseEngine;
pub use suite::DetectorSuite;
pub use threshold::{ThresholdDetector, ThresholdRule};
pub use zscore::ZScoreDetector;
