//! Model configuration entries

use crate::utils::error::GatewayError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Config map key naming a secret-store path that holds the model's credentials
pub const CONFIG_VAULT_PATH: &str = "vault_path";

/// Config map key naming a secret-store path holding additional keys for balancing
pub const CONFIG_API_KEYS_PATH: &str = "api_keys_path";

/// Default daily quota in tokens
pub const DEFAULT_QUOTA_DAILY: i64 = 100_000;

/// Default monthly quota in tokens
pub const DEFAULT_QUOTA_MONTHLY: i64 = 3_000_000;

/// Lifecycle status of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    Active,
    Disabled,
    Deprecated,
}

impl ModelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelStatus::Active => "active",
            ModelStatus::Disabled => "disabled",
            ModelStatus::Deprecated => "deprecated",
        }
    }

    /// Whether an explicit update may move a model from `self` to `next`.
    ///
    /// Statuses only move forward (active, disabled, deprecated). Reactivation is allowed
    /// because it only ever happens through an explicit update.
    pub fn can_transition_to(&self, next: ModelStatus) -> bool {
        match (self, next) {
            (current, next) if *current == next => true,
            (_, ModelStatus::Active) => true,
            (ModelStatus::Active, _) => true,
            (ModelStatus::Disabled, ModelStatus::Deprecated) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelStatus {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(ModelStatus::Active),
            "disabled" => Ok(ModelStatus::Disabled),
            "deprecated" => Ok(ModelStatus::Deprecated),
            other => Err(GatewayError::bad_request(format!(
                "invalid model status: {}",
                other
            ))),
        }
    }
}

/// A named model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub id: Uuid,
    pub name: String,
    /// Provider type, e.g. `anthropic`
    pub provider: String,
    /// Provider-side model id
    pub model_id: String,
    pub base_url: String,
    /// AES-GCM ciphertext of the API key, base64
    pub encrypted_api_key: String,
    pub config: HashMap<String, String>,
    /// Daily quota in tokens, 0 means unlimited
    pub quota_daily: i64,
    /// Monthly quota in tokens, 0 means unlimited
    pub quota_monthly: i64,
    pub cost_per_1k_tokens: f64,
    pub status: ModelStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ModelConfig {
    pub fn is_active(&self) -> bool {
        self.status == ModelStatus::Active
    }

    /// Secret-store path holding this model's credentials, if configured
    pub fn vault_path(&self) -> Option<&str> {
        self.config
            .get(CONFIG_VAULT_PATH)
            .map(String::as_str)
            .filter(|p| !p.is_empty())
    }

    /// Secret-store path holding the extra key pool, if configured
    pub fn api_keys_path(&self) -> Option<&str> {
        self.config
            .get(CONFIG_API_KEYS_PATH)
            .map(String::as_str)
            .filter(|p| !p.is_empty())
    }

    /// Cost of `tokens` at the current price
    pub fn cost_for(&self, tokens: i64) -> f64 {
        tokens as f64 * self.cost_per_1k_tokens / 1000.0
    }
}

/// Payload for creating a model
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CreateModelPayload {
    pub name: String,
    pub provider: String,
    pub model_id: String,
    pub base_url: String,
    pub api_key: String,
    #[serde(default)]
    pub config: HashMap<String, String>,
    #[serde(default)]
    pub quota_daily: Option<i64>,
    #[serde(default)]
    pub quota_monthly: Option<i64>,
    #[serde(default)]
    pub cost_per_1k_tokens: f64,
}

impl fmt::Debug for CreateModelPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateModelPayload")
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field("model_id", &self.model_id)
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("config", &self.config)
            .field("quota_daily", &self.quota_daily)
            .field("quota_monthly", &self.quota_monthly)
            .field("cost_per_1k_tokens", &self.cost_per_1k_tokens)
            .finish()
    }
}

/// Payload for updating a model. Only present fields are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateModelPayload {
    /// Id or name of the model to update
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub config: Option<HashMap<String, String>>,
    #[serde(default)]
    pub quota_daily: Option<i64>,
    #[serde(default)]
    pub quota_monthly: Option<i64>,
    #[serde(default)]
    pub cost_per_1k_tokens: Option<f64>,
    #[serde(default)]
    pub status: Option<ModelStatus>,
}

/// Filter criteria for listing models
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFilter {
    pub provider: Option<String>,
    pub status: Option<ModelStatus>,
    pub page: u64,
    pub page_size: u64,
}

impl ModelFilter {
    pub const DEFAULT_PAGE_SIZE: u64 = 20;
    pub const MAX_PAGE_SIZE: u64 = 100;

    /// Clamp page to at least 1 and page size into `1..=MAX_PAGE_SIZE`
    pub fn normalized(mut self) -> Self {
        if self.page == 0 {
            self.page = 1;
        }
        if self.page_size == 0 {
            self.page_size = Self::DEFAULT_PAGE_SIZE;
        }
        self.page_size = self.page_size.min(Self::MAX_PAGE_SIZE);
        self
    }

    /// Number of rows to skip
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1) * self.page_size
    }

    /// Whether a model passes the provider and status criteria
    pub fn matches(&self, model: &ModelConfig) -> bool {
        self.provider
            .as_deref()
            .is_none_or(|p| p.eq_ignore_ascii_case(&model.provider))
            && self.status.is_none_or(|s| s == model.status)
    }
}

impl Default for ModelFilter {
    fn default() -> Self {
        Self {
            provider: None,
            status: None,
            page: 1,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}
