//! # diagnose-orchestration
//!
//! The per-request diagnosis pipeline (C7): cache probe with per-fingerprint
//! exclusion, plugin resolution and collection, anomaly detection, rule
//! matching, root-cause analysis, and optional graceful-degrading LLM
//! augmentation.

pub mod cache;
pub mod llm;
pub mod orchestrator;
pub mod progress;

pub use cache::ResultCache;
pub use llm::{build_prompt, parse_recommendations, LlmClient, LlmError};
pub use orchestrator::{LlmAugmentation, Orchestrator};
pub use progress::{NullProgressSink, ProgressSink};
