//! Top-level gateway configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Gateway configuration, one field per section of the YAML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Persistent and key-value storage
    #[serde(default)]
    pub storage: StorageConfig,
    /// Secret store and credential cache
    #[serde(default)]
    pub vault: VaultConfig,
    /// Response cache
    #[serde(default)]
    pub cache: CacheConfig,
    /// Per-provider circuit breakers
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerSettings,
    /// Request pipeline
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Encryption at rest
    #[serde(default)]
    pub security: SecurityConfig,
    /// Default model bootstrap
    #[serde(default)]
    pub seed: SeedConfig,
}

/// Default model bootstrap
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Create the default model set at startup
    #[serde(default)]
    pub enabled: bool,
}
