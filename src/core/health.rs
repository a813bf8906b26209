//! Health reporting for the gateway and its providers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio::time::Instant;

use crate::core::circuit_breaker::{CircuitBreakerMetrics, CircuitState};
use crate::utils::error::Result;

/// Health status levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Fully operational
    Healthy,
    /// Serving, with a non-critical component or provider impaired
    Degraded,
    /// A critical component is unreachable
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
        }
    }
}

/// Result of checking one component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub response_time_ms: u64,
    pub error: Option<String>,
}

impl ComponentHealth {
    /// Run `check` and time it; an error marks the component unhealthy
    pub async fn check<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Future<Output = Result<()>>,
    {
        let started = Instant::now();
        let result = check.await;
        let response_time_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(()) => Self {
                name: name.into(),
                status: HealthStatus::Healthy,
                response_time_ms,
                error: None,
            },
            Err(e) => Self {
                name: name.into(),
                status: HealthStatus::Unhealthy,
                response_time_ms,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Breaker view of one provider
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub provider_id: String,
    pub state: CircuitState,
    /// Whether the provider currently admits calls
    pub available: bool,
    pub metrics: CircuitBreakerMetrics,
}

impl ProviderStatus {
    pub fn new(provider_id: String, metrics: CircuitBreakerMetrics) -> Self {
        Self {
            provider_id,
            state: metrics.state,
            available: metrics.state != CircuitState::Open,
            metrics,
        }
    }
}

/// Aggregated gateway health
#[derive(Debug, Clone, Serialize)]
pub struct GatewayHealth {
    pub status: HealthStatus,
    pub components: Vec<ComponentHealth>,
    pub providers: Vec<ProviderStatus>,
    pub timestamp: DateTime<Utc>,
}

impl GatewayHealth {
    /// Combine component checks and provider states.
    ///
    /// Components named in `critical` make the gateway unhealthy when they fail. Any
    /// other failure, or an open breaker, only degrades it.
    pub fn aggregate(
        components: Vec<ComponentHealth>,
        providers: Vec<ProviderStatus>,
        critical: &[&str],
    ) -> Self {
        let critical_down = components.iter().any(|c| {
            c.status == HealthStatus::Unhealthy && critical.contains(&c.name.as_str())
        });
        let impaired = components.iter().any(|c| c.status != HealthStatus::Healthy)
            || providers.iter().any(|p| !p.available);

        let status = if critical_down {
            HealthStatus::Unhealthy
        } else if impaired {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        Self {
            status,
            components,
            providers,
            timestamp: Utc::now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::GatewayError;

    fn metrics(state: CircuitState) -> CircuitBreakerMetrics {
        CircuitBreakerMetrics {
            state,
            consecutive_failures: 0,
            requests: 0,
            successes: 0,
            failures: 0,
            rejected: 0,
        }
    }

    #[tokio::test]
    async fn test_component_check_records_error() {
        let ok = ComponentHealth::check("storage", async { Ok(()) }).await;
        assert_eq!(ok.status, HealthStatus::Healthy);
        assert!(ok.error.is_none());

        let down = ComponentHealth::check("cache", async {
            Err(GatewayError::Cache("connection refused".to_string()))
        })
        .await;
        assert_eq!(down.status, HealthStatus::Unhealthy);
        assert!(down.error.unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_aggregate_status() {
        let storage_ok = ComponentHealth::check("storage", async { Ok(()) }).await;
        let cache_down = ComponentHealth::check("cache", async {
            Err(GatewayError::Cache("down".to_string()))
        })
        .await;
        let storage_down = ComponentHealth::check("storage", async {
            Err(GatewayError::internal("down"))
        })
        .await;

        let healthy = GatewayHealth::aggregate(
            vec![storage_ok.clone()],
            vec![ProviderStatus::new("a".into(), metrics(CircuitState::HalfOpen))],
            &["storage"],
        );
        assert!(healthy.is_healthy());

        let open = GatewayHealth::aggregate(
            vec![storage_ok.clone()],
            vec![ProviderStatus::new("a".into(), metrics(CircuitState::Open))],
            &["storage"],
        );
        assert_eq!(open.status, HealthStatus::Degraded);
        assert!(!open.providers[0].available);

        let degraded = GatewayHealth::aggregate(vec![storage_ok, cache_down.clone()], vec![], &["storage"]);
        assert_eq!(degraded.status, HealthStatus::Degraded);

        let unhealthy = GatewayHealth::aggregate(vec![storage_down, cache_down], vec![], &["storage"]);
        assert_eq!(unhealthy.status, HealthStatus::Unhealthy);
        assert_eq!(unhealthy.status.as_str(), "unhealthy");
    }
}
