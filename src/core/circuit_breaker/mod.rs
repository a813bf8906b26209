//! Per-provider circuit breaking with fallback execution

pub mod breaker;
pub mod registry;
pub mod types;

pub use breaker::{CircuitBreaker, Permit};
pub use registry::{CircuitBreakerRegistry, FallbackOutcome};
pub use types::{CircuitBreakerConfig, CircuitBreakerMetrics, CircuitState};
