//! # Engine Configuration
//!
//! Canonical configuration knobs named throughout the design, layered from
//! defaults via the `config` crate. Loading from a concrete file/env source
//! is the caller's job (the HTTP surface's bootstrap, out of scope here);
//! this module only defines the shape and a tested `Default`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    pub bounded_capacity: usize,
    pub enqueue_timeout_seconds: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            bounded_capacity: 1024,
            enqueue_timeout_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerPoolConfig {
    pub worker_count: usize,
    pub dequeue_timeout_seconds: u64,
    pub shutdown_deadline_seconds: u64,
    pub orchestration_deadline_seconds: u64,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            worker_count: 4,
            dequeue_timeout_seconds: 5,
            shutdown_deadline_seconds: 30,
            orchestration_deadline_seconds: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_seconds: 600 }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CircuitBreakerDefaults {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub timeout_seconds: u64,
}

impl Default for CircuitBreakerDefaults {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum FusionStrategy {
    ReciprocalRank { k: f64 },
    WeightedSum { semantic_weight: f64, lexical_weight: f64 },
}

impl Default for FusionStrategy {
    fn default() -> Self {
        Self::ReciprocalRank { k: 60.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub semantic_top_k: usize,
    pub lexical_top_k: usize,
    pub rerank_top_n: usize,
    pub fusion: FusionStrategy,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            semantic_top_k: 10,
            lexical_top_k: 10,
            rerank_top_n: 5,
            fusion: FusionStrategy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub queue: QueueConfig,
    pub worker_pool: WorkerPoolConfig,
    pub cache: CacheConfig,
    pub circuit_breaker: CircuitBreakerDefaults,
    pub retrieval: RetrievalConfig,
}

impl EngineConfig {
    /// Layer environment variables prefixed `DIAGNOSE__` (double-underscore
    /// separated, e.g. `DIAGNOSE__CACHE__TTL_SECONDS`) over the built-in
    /// defaults. File-based sources are the bootstrap layer's job (out of
    /// scope here); this is the minimal env layer every deployment needs.
    pub fn from_defaults_and_env() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(config::Environment::with_prefix("DIAGNOSE").separator("__"))
            .build()?;
        settings.try_deserialize()
    }

    /// Layer `overrides` (e.g. parsed from a TOML/env source) on top of
    /// defaults. Mirrors the reference engine's `config` crate layering
    /// without depending on a concrete on-disk format here.
    pub fn merge(base: Self, overrides: serde_json::Value) -> Result<Self, serde_json::Error> {
        let mut value = serde_json::to_value(base)?;
        merge_json(&mut value, overrides);
        serde_json::from_value(value)
    }
}

fn merge_json(base: &mut serde_json::Value, overrides: serde_json::Value) {
    match (base, overrides) {
        (serde_json::Value::Object(base_map), serde_json::Value::Object(override_map)) => {
            for (key, value) in override_map {
                merge_json(base_map.entry(key).or_insert(serde_json::Value::Null), value);
            }
        }
        (base_slot, overrides) => {
            *base_slot = overrides;
        }
    }
}
