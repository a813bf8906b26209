//! Response cache over a key-value store

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::key::{cache_key, is_cacheable};
use crate::config::CacheConfig;
use crate::core::types::{CompletionRequest, CompletionResponse};
use crate::storage::CacheStore;

/// Content-addressed cache of deterministic completions.
///
/// The cache never fails a request: read, decode and write errors are logged and
/// treated as misses.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
    enabled: bool,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            enabled: true,
        }
    }

    pub fn from_config(store: Arc<dyn CacheStore>, config: &CacheConfig) -> Self {
        Self {
            store,
            ttl: Duration::from_secs(config.ttl),
            enabled: config.enabled,
        }
    }

    /// A cache that never hits and never writes
    pub fn disabled(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            ttl: Duration::ZERO,
            enabled: false,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn key(&self, model_id: &str, request: &CompletionRequest) -> String {
        cache_key(model_id, request)
    }

    pub fn is_cacheable(&self, request: &CompletionRequest) -> bool {
        self.enabled && is_cacheable(request)
    }

    /// Reachability of the backing store, checked even when caching is disabled
    pub async fn health_check(&self) -> crate::utils::error::Result<()> {
        self.store.health_check().await
    }

    pub async fn get(&self, key: &str) -> Option<CompletionResponse> {
        if !self.enabled {
            return None;
        }

        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Response cache read failed for {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(response) => {
                debug!("Response cache hit: {}", key);
                Some(response)
            }
            Err(e) => {
                warn!("Discarding undecodable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Store a response with the configured TTL
    pub async fn put(&self, key: &str, response: &CompletionResponse) {
        self.put_with_ttl(key, response, self.ttl).await;
    }

    pub async fn put_with_ttl(&self, key: &str, response: &CompletionResponse, ttl: Duration) {
        if !self.enabled || ttl.is_zero() {
            return;
        }

        let raw = match serde_json::to_string(response) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to encode response for cache: {}", e);
                return;
            }
        };

        if let Err(e) = self.store.set(key, &raw, ttl).await {
            warn!("Response cache write failed for {}: {}", key, e);
        }
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("ttl", &self.ttl)
            .field("enabled", &self.enabled)
            .finish()
    }
}
