//! Configuration management for the Gateway
//!
//! This module handles loading, validation, and management of all gateway configuration.

mod loader;
pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{GatewayError, Result};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct for the Gateway
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Gateway configuration
    pub gateway: GatewayConfig,
}

impl Config {
    /// Load configuration from file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GatewayError::Config(format!("Failed to read config file: {}", e)))?;

        let gateway: GatewayConfig = serde_yaml::from_str(&content)
            .map_err(|e| GatewayError::Config(format!("Failed to parse config: {}", e)))?;

        let config = Self { gateway };
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let gateway = GatewayConfig::from_env()?;
        let config = Self { gateway };

        config.validate()?;
        Ok(config)
    }

    /// Load from an optional file, then apply environment overrides
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let mut gateway = match path {
            Some(path) => {
                info!("Loading configuration from: {:?}", path);
                let content = tokio::fs::read_to_string(path).await.map_err(|e| {
                    GatewayError::Config(format!("Failed to read config file: {}", e))
                })?;
                serde_yaml::from_str(&content)
                    .map_err(|e| GatewayError::Config(format!("Failed to parse config: {}", e)))?
            }
            None => GatewayConfig::default(),
        };
        gateway.apply_env_overrides(|key| std::env::var(key).ok())?;

        let config = Self { gateway };
        config.validate()?;
        Ok(config)
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.gateway.storage
    }

    pub fn vault(&self) -> &VaultConfig {
        &self.gateway.vault
    }

    pub fn cache(&self) -> &CacheConfig {
        &self.gateway.cache
    }

    pub fn circuit_breaker(&self) -> &CircuitBreakerSettings {
        &self.gateway.circuit_breaker
    }

    pub fn pipeline(&self) -> &PipelineConfig {
        &self.gateway.pipeline
    }

    pub fn logging(&self) -> &LoggingConfig {
        &self.gateway.logging
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");
        self.gateway
            .validate()
            .map_err(|e| GatewayError::Config(format!("Invalid configuration: {}", e)))
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.gateway)
            .map_err(|e| GatewayError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    // ==================== File Loading Tests ====================

    #[tokio::test]
    async fn test_from_file_with_partial_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
security:
  master_key: "file-key"
cache:
  ttl: 120
circuit_breaker:
  failure_threshold: 3
pipeline:
  fallbacks:
    claude-opus-4-5-20251101: claude-sonnet-4-5-20250929
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).await.unwrap();
        assert_eq!(config.cache().ttl, 120);
        assert_eq!(config.circuit_breaker().failure_threshold, 3);
        assert_eq!(config.circuit_breaker().timeout, 60);
        assert_eq!(config.vault().credential_cache_ttl, 300);
        assert_eq!(
            config
                .pipeline()
                .fallbacks
                .get("claude-opus-4-5-20251101")
                .map(String::as_str),
            Some("claude-sonnet-4-5-20250929")
        );
    }

    #[tokio::test]
    async fn test_from_file_missing_master_key_fails_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cache:\n  ttl: 60").unwrap();

        let err = Config::from_file(file.path()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[tokio::test]
    async fn test_from_file_missing_file() {
        let err = Config::from_file("/nonexistent/gateway.yaml")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Config(msg) if msg.contains("read")));
    }

    // ==================== Environment Override Tests ====================

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("ENCRYPTION_KEY", "env-key"),
            ("REDIS_URL", "redis://cache:6379"),
            ("VAULT_ADDR", "http://vault:8200"),
            ("CACHE_TTL", "900"),
            ("CIRCUIT_BREAKER_TIMEOUT", "30"),
            ("CIRCUIT_BREAKER_INTERVAL", "45"),
        ]
        .into_iter()
        .collect();

        let mut gateway = GatewayConfig::default();
        gateway
            .apply_env_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(gateway.security.master_key, "env-key");
        assert!(gateway.storage.redis.enabled);
        assert_eq!(gateway.storage.redis.url, "redis://cache:6379");
        assert_eq!(gateway.vault.address.as_deref(), Some("http://vault:8200"));
        assert_eq!(gateway.cache.ttl, 900);
        assert_eq!(gateway.circuit_breaker.timeout, 30);
        assert_eq!(gateway.circuit_breaker.interval, 45);
    }

    #[test]
    fn test_env_override_invalid_number() {
        let mut gateway = GatewayConfig::default();
        let err = gateway
            .apply_env_overrides(|key| (key == "CACHE_TTL").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, GatewayError::Config(msg) if msg.contains("CACHE_TTL")));
    }

    #[test]
    fn test_debug_hides_master_key() {
        let mut config = Config::default();
        config.gateway.security.master_key = "super-secret".to_string();
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
