//! Credential custody: encryption at rest plus cached secret store reads

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::cache::CredentialCache;
use super::cipher::KeyCipher;
use super::secret_store::{SecretData, SecretStore};
use crate::config::VaultConfig;
use crate::core::models::Credentials;
use crate::utils::error::{GatewayError, Result};

/// Encrypts provider keys and serves credentials from an external secret store.
///
/// Fetched credentials are cached per path for a bounded time. A background sweep
/// removes expired entries until [`CredentialVault::shutdown`] is called.
pub struct CredentialVault {
    cipher: KeyCipher,
    store: Arc<dyn SecretStore>,
    cache: Arc<CredentialCache>,
    shutdown: CancellationToken,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl CredentialVault {
    /// Create a vault and start its expiry sweep.
    ///
    /// Must be called within a tokio runtime.
    pub fn new(
        cipher: KeyCipher,
        store: Arc<dyn SecretStore>,
        cache_ttl: Duration,
        sweep_interval: Duration,
    ) -> Self {
        let cache = Arc::new(CredentialCache::new(cache_ttl));
        let shutdown = CancellationToken::new();
        let sweeper = spawn_sweeper(Arc::clone(&cache), sweep_interval, shutdown.clone());

        Self {
            cipher,
            store,
            cache,
            shutdown,
            sweeper: Mutex::new(Some(sweeper)),
        }
    }

    pub fn from_config(master_key: &str, store: Arc<dyn SecretStore>, config: &VaultConfig) -> Self {
        Self::new(
            KeyCipher::new(master_key.as_bytes()),
            store,
            Duration::from_secs(config.credential_cache_ttl),
            Duration::from_secs(config.sweep_interval.max(1)),
        )
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        self.cipher.encrypt(plaintext)
    }

    pub fn decrypt(&self, ciphertext: &str) -> Result<String> {
        self.cipher.decrypt(ciphertext)
    }

    /// Credentials stored at `path`, served from cache when fresh
    pub async fn fetch_credentials(&self, path: &str) -> Result<Credentials> {
        if let Some(credentials) = self.cache.get(path) {
            debug!("Credential cache hit for {}", path);
            return Ok(credentials);
        }

        let data = self
            .store
            .read(path)
            .await?
            .ok_or_else(|| GatewayError::VaultPathNotFound(path.to_string()))?;

        let credentials = parse_credentials(path, &data)?;
        self.cache.insert(path, credentials.clone());
        debug!("Cached credentials for {}", path);

        Ok(credentials)
    }

    /// Number of cached credential entries
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    /// Stop the expiry sweep and wait for it to exit
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let handle = self.sweeper.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Credential sweep task ended abnormally: {}", e);
            }
        }
        self.cache.clear();
        info!("Credential vault shut down");
    }
}

impl Drop for CredentialVault {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl std::fmt::Debug for CredentialVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVault")
            .field("store", &self.store)
            .field("cache", &self.cache)
            .finish()
    }
}

fn spawn_sweeper(
    cache: Arc<CredentialCache>,
    period: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    let removed = cache.purge_expired();
                    if removed > 0 {
                        debug!("Evicted {} expired credential entries", removed);
                    }
                }
            }
        }
    })
}

/// Validate a secret payload and convert it into credentials
fn parse_credentials(path: &str, data: &SecretData) -> Result<Credentials> {
    let api_key = match data.get("api_key") {
        Some(Value::String(key)) if !key.trim().is_empty() => key.clone(),
        _ => {
            return Err(GatewayError::InvalidCredentials(format!(
                "secret at {} has no api_key",
                path
            )));
        }
    };

    let base_url = match data.get("base_url") {
        Some(Value::String(url)) if !url.is_empty() => Some(url.clone()),
        _ => None,
    };

    let headers = match data.get("headers") {
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(name, value)| value.as_str().map(|v| (name.clone(), v.to_string())))
            .collect(),
        _ => HashMap::new(),
    };

    let extra_keys = match data.get("api_keys") {
        Some(Value::Array(keys)) => keys
            .iter()
            .filter_map(|k| k.as_str())
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    Ok(Credentials {
        api_key,
        extra_keys,
        base_url,
        headers,
    })
}
