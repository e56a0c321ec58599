//! # Circuit Breaker
//!
//! Generic circuit breaker protecting any remote collaborator the
//! orchestrator calls: plugin connections, the LLM collaborator, the
//! vector/lexical stores. Three states — Closed, Open, HalfOpen — with
//! recovery gated by a `success_threshold` rather than a single success,
//! the way the reference engine's resilience module evolved after finding
//! a single-success close was too eager.

use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl From<u8> for CircuitState {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Closed,
            2 => Self::HalfOpen,
            // Unknown encodings fail safe toward Open.
            _ => Self::Open,
        }
    }
}

impl CircuitState {
    fn encode(self) -> u8 {
        match self {
            Self::Closed => 0,
            Self::Open => 1,
            Self::HalfOpen => 2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub timeout: Duration,
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            timeout: Duration::from_secs(30),
            success_threshold: 2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerMetrics {
    pub state: CircuitState,
    pub consecutive_failures: u64,
    pub consecutive_successes: u64,
}

/// Unified interface implemented by every circuit breaker in the system.
pub trait CircuitBreakerBehavior: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;
    fn state(&self) -> CircuitState;
    fn should_allow(&self) -> bool;
    fn record_success(&self, duration: Duration);
    fn record_failure(&self, duration: Duration);
    fn is_healthy(&self) -> bool;
    fn force_open(&self);
    fn force_closed(&self);
    fn metrics(&self) -> CircuitBreakerMetrics;
}

#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    state: AtomicU8,
    consecutive_failures: AtomicU32,
    consecutive_successes: AtomicU32,
    opened_at: Mutex<Option<Instant>>,
    total_calls: AtomicU64,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            state: AtomicU8::new(CircuitState::Closed.encode()),
            consecutive_failures: AtomicU32::new(0),
            consecutive_successes: AtomicU32::new(0),
            opened_at: Mutex::new(None),
            total_calls: AtomicU64::new(0),
        }
    }

    fn set_state(&self, state: CircuitState) {
        self.state.store(state.encode(), Ordering::SeqCst);
    }

    fn transition_to_half_open_if_recovered(&self) {
        if CircuitState::from(self.state.load(Ordering::SeqCst)) != CircuitState::Open {
            return;
        }
        let elapsed_enough = {
            let guard = self.opened_at.lock().expect("circuit breaker mutex poisoned");
            guard.is_some_and(|t| t.elapsed() >= self.config.timeout)
        };
        if elapsed_enough {
            self.consecutive_successes.store(0, Ordering::SeqCst);
            self.set_state(CircuitState::HalfOpen);
        }
    }

    pub fn record_success_manual(&self, duration: Duration) {
        self.record_success(duration);
    }

    pub fn record_failure_manual(&self, duration: Duration) {
        self.record_failure(duration);
    }
}

impl CircuitBreakerBehavior for CircuitBreaker {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> CircuitState {
        self.transition_to_half_open_if_recovered();
        CircuitState::from(self.state.load(Ordering::SeqCst))
    }

    fn should_allow(&self) -> bool {
        match self.state() {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => false,
        }
    }

    fn record_success(&self, _duration: Duration) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        match self.state() {
            CircuitState::HalfOpen => {
                let successes = self.consecutive_successes.fetch_add(1, Ordering::SeqCst) + 1;
                if successes >= self.config.success_threshold {
                    self.consecutive_failures.store(0, Ordering::SeqCst);
                    self.consecutive_successes.store(0, Ordering::SeqCst);
                    self.set_state(CircuitState::Closed);
                }
            }
            CircuitState::Closed => {
                self.consecutive_failures.store(0, Ordering::SeqCst);
            }
            CircuitState::Open => {}
        }
    }

    fn record_failure(&self, _duration: Duration) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        match self.state() {
            CircuitState::HalfOpen => {
                self.consecutive_successes.store(0, Ordering::SeqCst);
                *self.opened_at.lock().expect("circuit breaker mutex poisoned") = Some(Instant::now());
                self.set_state(CircuitState::Open);
            }
            CircuitState::Closed => {
                let failures = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
                if failures >= self.config.failure_threshold {
                    *self.opened_at.lock().expect("circuit breaker mutex poisoned") = Some(Instant::now());
                    self.set_state(CircuitState::Open);
                }
            }
            CircuitState::Open => {}
        }
    }

    fn is_healthy(&self) -> bool {
        self.state() == CircuitState::Closed
    }

    fn force_open(&self) {
        *self.opened_at.lock().expect("circuit breaker mutex poisoned") = Some(Instant::now());
        self.set_state(CircuitState::Open);
    }

    fn force_closed(&self) {
        self.consecutive_failures.store(0, Ordering::SeqCst);
        self.consecutive_successes.store(0, Ordering::SeqCst);
        self.set_state(CircuitState::Closed);
    }

    fn metrics(&self) -> CircuitBreakerMetrics {
        CircuitBreakerMetrics {
            state: self.state(),
            consecutive_failures: self.consecutive_failures.load(Ordering::SeqCst) as u64,
            consecutive_successes: self.consecutive_successes.load(Ordering::SeqCst) as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed() {
        let cb = CircuitBreaker::new("test", CircuitBreakerConfig::default());
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.should_allow());
    }

    #[test]
    fn opens_after_threshold_failures() {
        let cb = CircuitBreaker::new(
            "test",
            CircuitBreakerConfig {
                failure_threshold: 3,
                ..Default::default()
            },
        );
        cb.record_failure(Duration::ZERO);
        cb.record_failure(Duration::ZERO);
        assert_eq!(cb.state(), CircuitState::Closed);
        cb.record_failure(Duration::ZERO);
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(!cb.should_allow());
    }

    #[test]
    fn half_open_closes_after_success_threshold() {
        let cb = CircuitBreaker::new(
            "test",
            CircuitBreakerConfig {
                failure_threshold: 2,
                timeout: Duration::ZERO,
                success_threshold: 2,
            },
        );
        cb.record_failure(Duration::ZERO);
        cb.record_failure(Duration::ZERO);
        assert_eq!(cb.state(), CircuitState::Open);

        // Zero timeout: next state() call observes recovery and flips to half-open.
        assert!(cb.should_allow());
        assert_eq!(cb.state(), CircuitState::HalfOpen);

        cb.record_success(Duration::ZERO);
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        cb.record_success(Duration::ZERO);
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn half_open_failure_reopens_immediately() {
        let cb = CircuitBreaker::new(
            "test",
            CircuitBreakerConfig {
                failure_threshold: 1,
                timeout: Duration::ZERO,
                success_threshold: 2,
            },
        );
        cb.record_failure(Duration::ZERO);
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(cb.should_allow()); // flips to half-open
        assert_eq!(cb.state(), CircuitState::HalfOpen);

        cb.record_failure(Duration::ZERO);
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[test]
    fn force_open_and_closed() {
        let cb = CircuitBreaker::new("test", CircuitBreakerConfig::default());
        cb.force_open();
        assert_eq!(cb.state(), CircuitState::Open);
        cb.force_closed();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn state_from_u8_defaults_unknown_to_open() {
        assert_eq!(CircuitState::from(0), CircuitState::Closed);
        assert_eq!(CircuitState::from(2), CircuitState::HalfOpen);
        assert_eq!(CircuitState::from(99), CircuitState::Open);
    }

    #[test]
    fn behavior_trait_object_safety() {
        let cb = CircuitBreaker::new("test", CircuitBreakerConfig::default());
        let behavior: &dyn CircuitBreakerBehavior = &cb;
        assert_eq!(behavior.name(), "test");
        assert!(behavior.is_healthy());
    }
}
