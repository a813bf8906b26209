use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::models::{ModelConfig, ModelStatus};

/// Model configuration database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ai_models")]
pub struct Model {
    /// Model ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Unique model name
    #[sea_orm(unique)]
    pub name: String,

    /// Provider type (anthropic, openai, ollama)
    pub provider: String,

    /// Provider-side model identifier
    pub model_id: String,

    /// Provider API base URL
    #[sea_orm(column_type = "Text")]
    pub base_url: String,

    /// AES-256-GCM encrypted API key
    #[sea_orm(column_type = "Text")]
    pub encrypted_api_key: String,

    /// Free-form configuration map (JSON object of strings)
    pub config: Json,

    /// Daily token quota, 0 for unlimited
    pub quota_daily: i64,

    /// Monthly token quota, 0 for unlimited
    pub quota_monthly: i64,

    /// Price per 1000 tokens
    #[sea_orm(column_type = "Double")]
    pub cost_per_1k_tokens: f64,

    /// Model status
    pub status: String,

    /// Creation timestamp
    pub created_at: DateTimeUtc,

    /// Last update timestamp
    pub updated_at: DateTimeUtc,
}

/// Model entity relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert to the domain model
    pub fn to_domain_model(self) -> ModelConfig {
        let config = match self.config {
            Json::Object(map) => map
                .into_iter()
                .map(|(key, value)| match value {
                    Json::String(s) => (key, s),
                    other => (key, other.to_string()),
                })
                .collect(),
            _ => HashMap::new(),
        };

        ModelConfig {
            id: self.id,
            name: self.name,
            provider: self.provider,
            model_id: self.model_id,
            base_url: self.base_url,
            encrypted_api_key: self.encrypted_api_key,
            config,
            quota_daily: self.quota_daily,
            quota_monthly: self.quota_monthly,
            cost_per_1k_tokens: self.cost_per_1k_tokens,
            // rows written outside the gateway may carry an unknown status
            status: self.status.parse().unwrap_or(ModelStatus::Disabled),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Build an active model from the domain model
    pub fn from_domain_model(model: &ModelConfig) -> ActiveModel {
        let config = model
            .config
            .iter()
            .map(|(key, value)| (key.clone(), Json::String(value.clone())))
            .collect::<serde_json::Map<_, _>>();

        ActiveModel {
            id: Set(model.id),
            name: Set(model.name.clone()),
            provider: Set(model.provider.clone()),
            model_id: Set(model.model_id.clone()),
            base_url: Set(model.base_url.clone()),
            encrypted_api_key: Set(model.encrypted_api_key.clone()),
            config: Set(Json::Object(config)),
            quota_daily: Set(model.quota_daily),
            quota_monthly: Set(model.quota_monthly),
            cost_per_1k_tokens: Set(model.cost_per_1k_tokens),
            status: Set(model.status.as_str().to_string()),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        }
    }
}
