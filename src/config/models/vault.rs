//! Secret store configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Secret store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Secret store address, e.g. `http://127.0.0.1:8200`. Unset disables the HTTP store.
    #[serde(default)]
    pub address: Option<String>,
    /// Access token sent as `X-Vault-Token`
    #[serde(default)]
    pub token: Option<String>,
    /// Lifetime of a cached credential in seconds
    #[serde(default = "default_credential_cache_ttl")]
    pub credential_cache_ttl: u64,
    /// Interval of the expiry sweep in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval: u64,
    /// Request timeout in seconds
    #[serde(default = "default_vault_timeout")]
    pub request_timeout: u64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            address: None,
            token: None,
            credential_cache_ttl: default_credential_cache_ttl(),
            sweep_interval: default_sweep_interval(),
            request_timeout: default_vault_timeout(),
        }
    }
}
