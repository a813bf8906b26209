//! Circuit breaker state and configuration types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::config::CircuitBreakerSettings;

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Circuit is closed, requests flow normally
    Closed,
    /// Circuit is open, requests are rejected
    Open,
    /// Circuit is half-open, a single probe is allowed
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        };
        f.write_str(name)
    }
}

/// Circuit breaker configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit
    pub failure_threshold: u32,
    /// Time an open circuit waits before admitting a probe
    pub timeout: Duration,
    /// Period after which closed-state counters reset
    pub interval: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            timeout: Duration::from_secs(60),
            interval: Duration::from_secs(60),
        }
    }
}

impl From<&CircuitBreakerSettings> for CircuitBreakerConfig {
    fn from(settings: &CircuitBreakerSettings) -> Self {
        Self {
            failure_threshold: settings.failure_threshold.max(1),
            timeout: Duration::from_secs(settings.timeout),
            interval: Duration::from_secs(settings.interval),
        }
    }
}

/// Circuit breaker metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircuitBreakerMetrics {
    /// Current circuit breaker state
    pub state: CircuitState,
    /// Failures since the last success or reset
    pub consecutive_failures: u32,
    /// Requests admitted in the current counting window
    pub requests: u32,
    /// Successes in the current counting window
    pub successes: u32,
    /// Failures in the current counting window
    pub failures: u32,
    /// Requests rejected without a call since creation
    pub rejected: u64,
}
