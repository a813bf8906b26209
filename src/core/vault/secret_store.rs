//! External secret stores holding provider credentials

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

use crate::config::VaultConfig;
use crate::utils::error::{GatewayError, Result};

/// Secret payload as stored at a path
pub type SecretData = Map<String, Value>;

/// Read-only access to a key/value secret store.
///
/// `Ok(None)` means the path does not exist; transport and server failures are errors.
#[async_trait]
pub trait SecretStore: Send + Sync + std::fmt::Debug {
    async fn read(&self, path: &str) -> Result<Option<SecretData>>;
}

/// Vault-compatible HTTP secret store
#[derive(Debug, Clone)]
pub struct HttpSecretStore {
    client: Client,
    address: String,
    token: Option<String>,
}

impl HttpSecretStore {
    /// Create a store for `address` (e.g. `http://127.0.0.1:8200`)
    pub fn new(address: impl Into<String>, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::config(format!("Failed to build vault client: {}", e)))?;

        Ok(Self {
            client,
            address: address.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Build from configuration; `None` when no address is configured
    pub fn from_config(config: &VaultConfig) -> Result<Option<Self>> {
        match &config.address {
            Some(address) if !address.trim().is_empty() => Ok(Some(Self::new(
                address.clone(),
                config.token.clone(),
                Duration::from_secs(config.request_timeout),
            )?)),
            _ => Ok(None),
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/v1/{}", self.address, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl SecretStore for HttpSecretStore {
    async fn read(&self, path: &str) -> Result<Option<SecretData>> {
        let url = self.url_for(path);
        debug!("Reading secret from {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.header("X-Vault-Token", token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::VaultReadFailed(format!("request to {} failed: {}", path, e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(GatewayError::VaultReadFailed(format!(
                "secret store returned {} for {}",
                status, path
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::VaultReadFailed(format!("invalid response for {}: {}", path, e)))?;

        Ok(extract_secret_data(body))
    }
}

/// Pull the secret map out of a KV v1 (`data`) or KV v2 (`data.data`) response
fn extract_secret_data(body: Value) -> Option<SecretData> {
    let Value::Object(mut root) = body else {
        return None;
    };
    let Some(Value::Object(mut data)) = root.remove("data") else {
        return None;
    };

    // KV v2 nests the secret under data.data next to a metadata object
    if data.contains_key("metadata") {
        if let Some(Value::Object(inner)) = data.remove("data") {
            return Some(inner);
        }
        return None;
    }

    Some(data)
}

/// In-process secret store, used for local development and tests
#[derive(Debug, Default)]
pub struct InMemorySecretStore {
    secrets: DashMap<String, SecretData>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a secret, replacing any existing one at `path`
    pub fn put(&self, path: impl Into<String>, data: Value) {
        if let Value::Object(map) = data {
            self.secrets.insert(path.into(), map);
        }
    }

    pub fn remove(&self, path: &str) {
        self.secrets.remove(path);
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn read(&self, path: &str) -> Result<Option<SecretData>> {
        Ok(self.secrets.get(path).map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_kv_v1() {
        let data = extract_secret_data(json!({"data": {"api_key": "k"}})).unwrap();
        assert_eq!(data["api_key"], "k");
    }

    #[test]
    fn test_extract_kv_v2() {
        let body = json!({
            "data": {
                "data": {"api_key": "k2"},
                "metadata": {"version": 3}
            }
        });
        let data = extract_secret_data(body).unwrap();
        assert_eq!(data["api_key"], "k2");
        assert!(!data.contains_key("metadata"));
    }

    #[test]
    fn test_extract_missing_data() {
        assert!(extract_secret_data(json!({"errors": []})).is_none());
        assert!(extract_secret_data(json!("plain")).is_none());
    }

    #[test]
    fn test_url_for_trims_slashes() {
        let store = HttpSecretStore::new("http://vault:8200/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(store.url_for("/secret/m1"), "http://vault:8200/v1/secret/m1");
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemorySecretStore::new();
        store.put("secret/a", json!({"api_key": "x"}));
        assert!(store.read("secret/a").await.unwrap().is_some());
        assert!(store.read("secret/b").await.unwrap().is_none());
        store.remove("secret/a");
        assert!(store.read("secret/a").await.unwrap().is_none());
    }
}
