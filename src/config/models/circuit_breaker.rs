//! Circuit breaker configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Circuit breaker thresholds shared by every provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerSettings {
    /// Consecutive failures that open the breaker
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// Seconds an open breaker waits before letting a probe through
    #[serde(default = "default_breaker_timeout")]
    pub timeout: u64,
    /// Seconds after which closed-state counters reset
    #[serde(default = "default_breaker_interval")]
    pub interval: u64,
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            timeout: default_breaker_timeout(),
            interval: default_breaker_interval(),
        }
    }
}
