//! Configuration loading from environment variables

use super::models::*;
use crate::utils::error::{GatewayError, Result};
use std::env;
use std::str::FromStr;
use tracing::debug;

impl GatewayConfig {
    /// Load configuration from environment variables on top of defaults
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment variables");
        let mut config = Self::default();
        config.apply_env_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Override fields with values produced by `lookup`, keyed by variable name
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Storage
        if let Some(url) = lookup("DATABASE_URL") {
            self.storage.database.url = url;
            self.storage.database.enabled = true;
        }
        if let Some(max_conn) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.storage.database.max_connections = parse_var("DATABASE_MAX_CONNECTIONS", &max_conn)?;
        }
        if let Some(url) = lookup("REDIS_URL") {
            self.storage.redis.url = url;
            self.storage.redis.enabled = true;
        }

        // Secret store
        if let Some(addr) = lookup("VAULT_ADDR") {
            self.vault.address = Some(addr);
        }
        if let Some(token) = lookup("VAULT_TOKEN") {
            self.vault.token = Some(token);
        }

        // Security
        if let Some(key) = lookup("ENCRYPTION_KEY") {
            self.security.master_key = key;
        }

        // Cache
        if let Some(ttl) = lookup("CACHE_TTL") {
            self.cache.ttl = parse_var("CACHE_TTL", &ttl)?;
        }

        // Circuit breaker
        if let Some(interval) = lookup("CIRCUIT_BREAKER_INTERVAL") {
            self.circuit_breaker.interval = parse_var("CIRCUIT_BREAKER_INTERVAL", &interval)?;
        }
        if let Some(timeout) = lookup("CIRCUIT_BREAKER_TIMEOUT") {
            self.circuit_breaker.timeout = parse_var("CIRCUIT_BREAKER_TIMEOUT", &timeout)?;
        }
        if let Some(threshold) = lookup("CIRCUIT_BREAKER_THRESHOLD") {
            self.circuit_breaker.failure_threshold =
                parse_var("CIRCUIT_BREAKER_THRESHOLD", &threshold)?;
        }

        // Logging
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| GatewayError::Config(format!("Invalid {}: {}", name, e)))
}
