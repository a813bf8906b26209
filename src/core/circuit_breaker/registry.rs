//! Registry of circuit breakers keyed by provider id

use parking_lot::RwLock;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use super::breaker::CircuitBreaker;
use super::types::{CircuitBreakerConfig, CircuitBreakerMetrics, CircuitState};
use crate::utils::error::{GatewayError, Result};

/// Result of a call that may have been served by a fallback
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackOutcome<T> {
    pub value: T,
    /// Provider id that produced `value`
    pub provider_id: String,
    pub used_fallback: bool,
}

/// Lazily created circuit breakers, one per provider id
#[derive(Debug)]
pub struct CircuitBreakerRegistry {
    config: CircuitBreakerConfig,
    breakers: RwLock<HashMap<String, Arc<CircuitBreaker>>>,
}

impl CircuitBreakerRegistry {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            breakers: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Breaker for `provider_id`, created on first use
    pub fn get_or_create(&self, provider_id: &str) -> Arc<CircuitBreaker> {
        if let Some(breaker) = self.breakers.read().get(provider_id) {
            return Arc::clone(breaker);
        }

        let mut breakers = self.breakers.write();
        // another caller may have created it between the read and write locks
        if let Some(breaker) = breakers.get(provider_id) {
            return Arc::clone(breaker);
        }

        debug!("Creating circuit breaker for {}", provider_id);
        let breaker = Arc::new(CircuitBreaker::new(provider_id, self.config.clone()));
        breakers.insert(provider_id.to_string(), Arc::clone(&breaker));
        breaker
    }

    /// Run `fut` under the breaker for `provider_id`
    pub async fn execute<T, F>(&self, provider_id: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let breaker = self.get_or_create(provider_id);
        breaker.call(fut).await
    }

    /// Run `primary`, falling back on any primary error, breaker-open included.
    ///
    /// `fallback` is only invoked after the primary fails. It resolves the fallback's
    /// provider id and call, or `None` when no fallback is available, in which case the
    /// primary error is returned unchanged. When both fail the error names both causes.
    pub async fn execute_with_fallback<T, P, R, RF, F>(
        &self,
        primary_id: &str,
        primary: P,
        fallback: R,
    ) -> Result<FallbackOutcome<T>>
    where
        P: Future<Output = Result<T>>,
        R: FnOnce() -> RF,
        RF: Future<Output = Option<(String, F)>>,
        F: Future<Output = Result<T>>,
    {
        let primary_error = match self.execute(primary_id, primary).await {
            Ok(value) => {
                return Ok(FallbackOutcome {
                    value,
                    provider_id: primary_id.to_string(),
                    used_fallback: false,
                });
            }
            Err(e) => e,
        };

        if matches!(primary_error, GatewayError::Cancelled(_)) {
            return Err(primary_error);
        }
        let Some((fallback_id, fallback_fut)) = fallback().await else {
            return Err(primary_error);
        };

        warn!(
            "Provider {} failed ({}), trying fallback {}",
            primary_id, primary_error, fallback_id
        );

        match self.execute(&fallback_id, fallback_fut).await {
            Ok(value) => Ok(FallbackOutcome {
                value,
                provider_id: fallback_id,
                used_fallback: true,
            }),
            Err(fallback_error) => Err(GatewayError::fallback_failed(primary_error, fallback_error)),
        }
    }

    /// State of `provider_id`, if a breaker exists
    pub fn state(&self, provider_id: &str) -> Option<CircuitState> {
        self.breakers.read().get(provider_id).map(|b| b.state())
    }

    pub fn metrics(&self, provider_id: &str) -> Option<CircuitBreakerMetrics> {
        self.breakers.read().get(provider_id).map(|b| b.metrics())
    }

    /// Metrics of every known breaker, sorted by provider id
    pub fn snapshot(&self) -> Vec<(String, CircuitBreakerMetrics)> {
        let mut snapshot: Vec<_> = self
            .breakers
            .read()
            .iter()
            .map(|(id, breaker)| (id.clone(), breaker.metrics()))
            .collect();
        snapshot.sort_by(|a, b| a.0.cmp(&b.0));
        snapshot
    }

    pub fn len(&self) -> usize {
        self.breakers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakers.read().is_empty()
    }
}

impl Default for CircuitBreakerRegistry {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}
