//! Validators for each configuration section

use super::trait_def::Validate;
use crate::config::models::*;
use tracing::debug;

impl Validate for GatewayConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating gateway configuration");

        self.storage.validate()?;
        self.vault.validate()?;
        self.cache.validate()?;
        self.circuit_breaker.validate()?;
        self.pipeline.validate()?;
        self.security.validate()?;
        Ok(())
    }
}

impl Validate for StorageConfig {
    fn validate(&self) -> Result<(), String> {
        self.database.validate()?;
        self.redis.validate()?;
        Ok(())
    }
}

impl Validate for DatabaseConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }

        if self.url.is_empty() {
            return Err("Database URL cannot be empty".to_string());
        }

        let supported = ["sqlite:", "postgres://", "postgresql://"];
        if !supported.iter().any(|prefix| self.url.starts_with(prefix)) {
            return Err("Only SQLite and PostgreSQL databases are supported".to_string());
        }

        if self.max_connections == 0 {
            return Err("Database max connections must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for RedisConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }

        if !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err("Redis URL must start with redis:// or rediss://".to_string());
        }

        Ok(())
    }
}

impl Validate for VaultConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(address) = &self.address {
            url::Url::parse(address).map_err(|e| format!("Invalid vault address: {}", e))?;
        }

        if self.credential_cache_ttl == 0 {
            return Err("Credential cache TTL must be greater than 0".to_string());
        }

        if self.sweep_interval == 0 {
            return Err("Credential sweep interval must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for CacheConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.ttl == 0 {
            return Err("Cache TTL must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for CircuitBreakerSettings {
    fn validate(&self) -> Result<(), String> {
        if self.failure_threshold == 0 {
            return Err("Circuit breaker failure threshold must be greater than 0".to_string());
        }

        if self.timeout == 0 {
            return Err("Circuit breaker timeout must be greater than 0".to_string());
        }

        if self.interval == 0 {
            return Err("Circuit breaker interval must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for PipelineConfig {
    fn validate(&self) -> Result<(), String> {
        if self.request_timeout == 0 {
            return Err("Request timeout must be greater than 0".to_string());
        }

        for (primary, fallback) in &self.fallbacks {
            if primary == fallback {
                return Err(format!("Model '{}' cannot be its own fallback", primary));
            }
        }

        Ok(())
    }
}

impl Validate for SecurityConfig {
    fn validate(&self) -> Result<(), String> {
        if self.master_key.trim().is_empty() {
            return Err("Encryption master key cannot be empty".to_string());
        }

        Ok(())
    }
}
