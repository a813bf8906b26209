//! Per-provider circuit breaker

use parking_lot::Mutex;
use std::future::Future;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::types::{CircuitBreakerConfig, CircuitBreakerMetrics, CircuitState};
use crate::utils::error::{GatewayError, Result};

struct BreakerInner {
    state: CircuitState,
    /// Bumped on every state change and counter reset; outcomes from older generations are ignored
    generation: u64,
    consecutive_failures: u32,
    requests: u32,
    successes: u32,
    failures: u32,
    rejected: u64,
    window_start: Instant,
    opened_at: Option<Instant>,
    last_transition: Instant,
    probe_in_flight: bool,
}

impl BreakerInner {
    fn new(now: Instant) -> Self {
        Self {
            state: CircuitState::Closed,
            generation: 0,
            consecutive_failures: 0,
            requests: 0,
            successes: 0,
            failures: 0,
            rejected: 0,
            window_start: now,
            opened_at: None,
            last_transition: now,
            probe_in_flight: false,
        }
    }

    fn reset_counts(&mut self, now: Instant) {
        self.generation += 1;
        self.consecutive_failures = 0;
        self.requests = 0;
        self.successes = 0;
        self.failures = 0;
        self.window_start = now;
    }

    fn transition(&mut self, to: CircuitState, now: Instant) {
        self.state = to;
        self.last_transition = now;
        self.probe_in_flight = false;
        self.opened_at = (to == CircuitState::Open).then_some(now);
        self.reset_counts(now);
    }
}

/// Admission granted by [`CircuitBreaker::acquire`].
///
/// Must be resolved with [`Permit::success`] or [`Permit::failure`]. Dropping an
/// unresolved permit records nothing and frees the half-open probe slot.
pub struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    generation: u64,
    probe: bool,
    resolved: bool,
}

impl Permit<'_> {
    pub fn success(mut self) {
        self.resolved = true;
        self.breaker.on_success(self.generation);
    }

    pub fn failure(mut self) {
        self.resolved = true;
        self.breaker.on_failure(self.generation);
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if !self.resolved && self.probe {
            self.breaker.release_probe(self.generation);
        }
    }
}

/// Failure-counting state machine guarding one provider.
///
/// Closed until `failure_threshold` consecutive failures, then open for `timeout`,
/// then half-open with exactly one probe in flight.
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerInner::new(Instant::now())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run `fut` under breaker protection.
    ///
    /// Rejected calls fail with `BreakerOpen` without polling `fut`. `Cancelled` errors
    /// are not counted as failures.
    pub async fn call<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let permit = self.acquire()?;

        let result = fut.await;
        match &result {
            Ok(_) => permit.success(),
            Err(GatewayError::Cancelled(_)) => drop(permit),
            Err(_) => permit.failure(),
        }
        result
    }

    /// Ask for admission of one call
    pub fn acquire(&self) -> Result<Permit<'_>> {
        let now = Instant::now();
        let mut inner = self.inner.lock();

        match inner.state {
            CircuitState::Closed => {
                if !self.config.interval.is_zero()
                    && now.duration_since(inner.window_start) >= self.config.interval
                {
                    inner.reset_counts(now);
                }
            }
            CircuitState::Open => {
                let ready = inner
                    .opened_at
                    .is_none_or(|opened| now.duration_since(opened) >= self.config.timeout);
                if !ready {
                    inner.rejected += 1;
                    return Err(GatewayError::BreakerOpen(self.name.clone()));
                }
                debug!("Circuit breaker {} transitioning from Open to HalfOpen", self.name);
                inner.transition(CircuitState::HalfOpen, now);
            }
            CircuitState::HalfOpen => {}
        }

        let probe = inner.state == CircuitState::HalfOpen;
        if probe {
            if inner.probe_in_flight {
                inner.rejected += 1;
                return Err(GatewayError::BreakerOpen(self.name.clone()));
            }
            inner.probe_in_flight = true;
        }
        inner.requests = inner.requests.saturating_add(1);

        Ok(Permit {
            breaker: self,
            generation: inner.generation,
            probe,
            resolved: false,
        })
    }

    fn on_success(&self, generation: u64) {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            return;
        }

        match inner.state {
            CircuitState::Closed => {
                inner.successes = inner.successes.saturating_add(1);
                inner.consecutive_failures = 0;
            }
            CircuitState::HalfOpen => {
                info!("Circuit breaker {} closed after successful probe", self.name);
                inner.transition(CircuitState::Closed, now);
            }
            CircuitState::Open => {}
        }
    }

    fn on_failure(&self, generation: u64) {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            return;
        }

        match inner.state {
            CircuitState::Closed => {
                inner.failures = inner.failures.saturating_add(1);
                inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
                if inner.consecutive_failures >= self.config.failure_threshold {
                    warn!(
                        "Circuit breaker {} opening after {} consecutive failures",
                        self.name, inner.consecutive_failures
                    );
                    inner.transition(CircuitState::Open, now);
                }
            }
            CircuitState::HalfOpen => {
                warn!("Circuit breaker {} reopening after failed probe", self.name);
                inner.transition(CircuitState::Open, now);
            }
            CircuitState::Open => {}
        }
    }

    fn release_probe(&self, generation: u64) {
        let mut inner = self.inner.lock();
        if inner.generation == generation && inner.state == CircuitState::HalfOpen {
            inner.probe_in_flight = false;
        }
    }

    /// Current state.
    ///
    /// An expired Open state is reported until the next admission moves it to HalfOpen.
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    pub fn metrics(&self) -> CircuitBreakerMetrics {
        let inner = self.inner.lock();
        CircuitBreakerMetrics {
            state: inner.state,
            consecutive_failures: inner.consecutive_failures,
            requests: inner.requests,
            successes: inner.successes,
            failures: inner.failures,
            rejected: inner.rejected,
        }
    }

    /// Force the breaker closed with cleared counters
    pub fn reset(&self) {
        let now = Instant::now();
        self.inner.lock().transition(CircuitState::Closed, now);
        debug!("Circuit breaker {} reset", self.name);
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish()
    }
}
