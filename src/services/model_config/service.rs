//! Model configuration service implementation

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::models::{
    CreateModelPayload, Credentials, DEFAULT_QUOTA_DAILY, DEFAULT_QUOTA_MONTHLY, LogUsagePayload,
    ModelConfig, ModelFilter, ModelStatus, QuotaStatus, UpdateModelPayload, UsageRecord,
};
use crate::core::providers::ProviderType;
use crate::core::quota::QuotaLedger;
use crate::core::traits::{ModelChangeListener, ModelConfigSource};
use crate::core::vault::CredentialVault;
use crate::storage::ModelStore;
use crate::utils::error::{GatewayError, Result};

/// Owns model configurations and their credentials
#[derive(Clone)]
pub struct ModelConfigService {
    models: Arc<dyn ModelStore>,
    vault: Arc<CredentialVault>,
    ledger: QuotaLedger,
    listeners: Arc<RwLock<Vec<Weak<dyn ModelChangeListener>>>>,
}

impl ModelConfigService {
    pub fn new(models: Arc<dyn ModelStore>, vault: Arc<CredentialVault>, ledger: QuotaLedger) -> Self {
        Self {
            models,
            vault,
            ledger,
            listeners: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Register `listener` for update and delete notifications.
    ///
    /// Only a weak reference is kept; dropped listeners are pruned on the next change.
    pub fn subscribe(&self, listener: Weak<dyn ModelChangeListener>) {
        self.listeners.write().push(listener);
    }

    fn notify_changed(&self, model_id: Uuid) {
        let mut listeners = self.listeners.write();
        listeners.retain(|listener| match listener.upgrade() {
            Some(listener) => {
                listener.model_changed(model_id);
                true
            }
            None => false,
        });
    }

    pub fn vault(&self) -> &Arc<CredentialVault> {
        &self.vault
    }

    pub fn ledger(&self) -> &QuotaLedger {
        &self.ledger
    }

    /// Create a model. The API key is encrypted before it is stored.
    pub async fn create_model(&self, payload: CreateModelPayload) -> Result<ModelConfig> {
        let name = payload.name.trim();
        if name.is_empty() {
            return Err(GatewayError::bad_request("model name is required"));
        }
        if payload.provider.trim().is_empty() {
            return Err(GatewayError::bad_request("provider is required"));
        }
        if payload.api_key.is_empty() {
            return Err(GatewayError::bad_request("api key is required"));
        }
        let provider = payload.provider.parse::<ProviderType>()?;

        let quota_daily = payload.quota_daily.unwrap_or(DEFAULT_QUOTA_DAILY);
        let quota_monthly = payload.quota_monthly.unwrap_or(DEFAULT_QUOTA_MONTHLY);
        validate_limits(quota_daily, quota_monthly, payload.cost_per_1k_tokens)?;

        if self.models.get_by_name(name).await?.is_some() {
            return Err(GatewayError::conflict("model with this name already exists"));
        }

        let now = Utc::now();
        let model = ModelConfig {
            id: Uuid::new_v4(),
            name: name.to_string(),
            provider: provider.as_str().to_string(),
            model_id: if payload.model_id.is_empty() {
                name.to_string()
            } else {
                payload.model_id
            },
            base_url: payload.base_url,
            encrypted_api_key: self.vault.encrypt(&payload.api_key)?,
            config: payload.config,
            quota_daily,
            quota_monthly,
            cost_per_1k_tokens: payload.cost_per_1k_tokens,
            status: ModelStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let model = self.models.insert(model).await.map_err(|e| match e {
            GatewayError::Conflict(_) => {
                GatewayError::conflict("model with this name already exists")
            }
            other => other,
        })?;
        info!("Created model {} ({})", model.name, model.id);
        Ok(model)
    }

    /// Look up by UUID first, then by name
    pub async fn get_model(&self, id_or_name: &str) -> Result<ModelConfig> {
        self.models
            .find(id_or_name)
            .await?
            .ok_or_else(|| GatewayError::ModelNotFound(id_or_name.to_string()))
    }

    /// One page of models, newest first, with the total match count
    pub async fn list_models(&self, filter: ModelFilter) -> Result<(Vec<ModelConfig>, u64)> {
        self.models.list(&filter.normalized()).await
    }

    /// Apply the fields present in `payload`
    pub async fn update_model(&self, payload: UpdateModelPayload) -> Result<ModelConfig> {
        if payload.id.trim().is_empty() {
            return Err(GatewayError::bad_request("invalid model ID format"));
        }
        let mut model = self.get_model(&payload.id).await?;

        if let Some(name) = payload.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(GatewayError::bad_request("model name is required"));
            }
            if name != model.name {
                if self.models.get_by_name(name).await?.is_some() {
                    return Err(GatewayError::conflict("model with this name already exists"));
                }
                model.name = name.to_string();
            }
        }
        if let Some(status) = payload.status {
            if !model.status.can_transition_to(status) {
                return Err(GatewayError::bad_request(format!(
                    "invalid status transition: {} -> {}",
                    model.status, status
                )));
            }
            model.status = status;
        }
        if let Some(base_url) = payload.base_url {
            model.base_url = base_url;
        }
        if let Some(config) = payload.config {
            model.config = config;
        }
        if let Some(quota_daily) = payload.quota_daily {
            model.quota_daily = quota_daily;
        }
        if let Some(quota_monthly) = payload.quota_monthly {
            model.quota_monthly = quota_monthly;
        }
        if let Some(cost) = payload.cost_per_1k_tokens {
            model.cost_per_1k_tokens = cost;
        }
        validate_limits(model.quota_daily, model.quota_monthly, model.cost_per_1k_tokens)?;
        model.updated_at = Utc::now();

        let model = self.models.update(model).await?;
        self.notify_changed(model.id);
        info!("Updated model {} ({})", model.name, model.id);
        Ok(model)
    }

    /// Hard delete
    pub async fn delete_model(&self, id_or_name: &str) -> Result<()> {
        let model = self.get_model(id_or_name).await?;
        if !self.models.delete(model.id).await? {
            return Err(GatewayError::ModelNotFound(id_or_name.to_string()));
        }
        self.notify_changed(model.id);
        info!("Deleted model {} ({})", model.name, model.id);
        Ok(())
    }

    /// Decrypted credentials for an active model
    pub async fn get_credentials(&self, id_or_name: &str) -> Result<Credentials> {
        let model = self.get_model(id_or_name).await?;
        self.credentials_for(&model).await
    }

    /// Credentials from the secret store when a vault path is configured, otherwise from the
    /// stored encrypted key
    pub async fn credentials_for(&self, model: &ModelConfig) -> Result<Credentials> {
        if !model.is_active() {
            return Err(GatewayError::ModelInactive(format!(
                "{} ({})",
                model.name, model.status
            )));
        }

        let mut credentials = match model.vault_path() {
            Some(path) => {
                debug!("Fetching credentials for {} from {}", model.name, path);
                self.vault.fetch_credentials(path).await?
            }
            None => Credentials::new(self.vault.decrypt(&model.encrypted_api_key)?),
        };

        if credentials.base_url.is_none() && !model.base_url.is_empty() {
            credentials.base_url = Some(model.base_url.clone());
        }

        if let Some(path) = model.api_keys_path() {
            let pool = self.vault.fetch_credentials(path).await?;
            credentials.extra_keys.extend(pool.key_pool());
        }

        Ok(credentials)
    }

    /// Quota status in the local time zone
    pub async fn check_quota(&self, id_or_name: &str) -> Result<QuotaStatus> {
        self.ledger.check(id_or_name).await
    }

    /// Append a usage record for an existing model
    pub async fn log_usage(&self, payload: LogUsagePayload) -> Result<UsageRecord> {
        self.ledger.record_usage(payload).await
    }
}

#[async_trait]
impl ModelConfigSource for ModelConfigService {
    async fn resolve_model(&self, id_or_name: &str) -> Result<Option<ModelConfig>> {
        self.models.find(id_or_name).await
    }

    async fn credentials(&self, model: &ModelConfig) -> Result<Credentials> {
        self.credentials_for(model).await
    }
}

impl std::fmt::Debug for ModelConfigService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfigService")
            .field("vault", &self.vault)
            .finish()
    }
}

fn validate_limits(quota_daily: i64, quota_monthly: i64, cost_per_1k_tokens: f64) -> Result<()> {
    if quota_daily < 0 || quota_monthly < 0 {
        return Err(GatewayError::bad_request("quotas must not be negative"));
    }
    if !cost_per_1k_tokens.is_finite() || cost_per_1k_tokens < 0.0 {
        return Err(GatewayError::bad_request("cost per 1k tokens must not be negative"));
    }
    Ok(())
}
