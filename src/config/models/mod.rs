//! Configuration data models
//!
//! This module defines all configuration structures used throughout the gateway.

#![allow(missing_docs)]

pub mod cache;
pub mod circuit_breaker;
pub mod gateway;
pub mod logging;
pub mod pipeline;
pub mod security;
pub mod storage;
pub mod vault;

// Re-export all configuration types
pub use cache::*;
pub use circuit_breaker::*;
pub use gateway::*;
pub use logging::*;
pub use pipeline::*;
pub use security::*;
pub use storage::*;
pub use vault::*;

/// Default connection timeout in seconds
pub fn default_connection_timeout() -> u64 {
    5
}

pub fn default_max_connections() -> u32 {
    10
}

pub fn default_database_url() -> String {
    "sqlite://llmgate.db?mode=rwc".to_string()
}

pub fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

pub fn default_cache_ttl() -> u64 {
    3600 // 1 hour
}

pub fn default_cache_max_entries() -> usize {
    10_000
}

pub fn default_credential_cache_ttl() -> u64 {
    300 // 5 minutes
}

pub fn default_sweep_interval() -> u64 {
    60
}

pub fn default_vault_timeout() -> u64 {
    10
}

pub fn default_failure_threshold() -> u32 {
    5
}

pub fn default_breaker_timeout() -> u64 {
    60
}

pub fn default_breaker_interval() -> u64 {
    60
}

pub fn default_request_timeout() -> u64 {
    120
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_true() -> bool {
    true
}
