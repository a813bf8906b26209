//! Test fixtures and data factories

use chrono::{DateTime, Utc};
use llmgate::core::models::{
    CreateModelPayload, DEFAULT_QUOTA_DAILY, DEFAULT_QUOTA_MONTHLY, ModelConfig, ModelStatus,
    UsageRecord, UsageStatus,
};
use llmgate::core::types::{CompletionRequest, Message};
use std::collections::HashMap;
use uuid::Uuid;

pub const TEST_MASTER_KEY: &str = "integration-test-master-key";

/// Factory for model configurations
pub struct ModelFactory;

impl ModelFactory {
    /// Creation payload for an Anthropic model served from `base_url`
    pub fn anthropic(name: &str, base_url: &str) -> CreateModelPayload {
        CreateModelPayload {
            name: name.to_string(),
            provider: "anthropic".to_string(),
            model_id: format!("{}-upstream", name),
            base_url: base_url.to_string(),
            api_key: "sk-ant-integration".to_string(),
            cost_per_1k_tokens: 0.003,
            ..Default::default()
        }
    }

    /// A stored model row, bypassing the service
    pub fn stored(name: &str) -> ModelConfig {
        let now = Utc::now();
        ModelConfig {
            id: Uuid::new_v4(),
            name: name.to_string(),
            provider: "openai".to_string(),
            model_id: name.to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            encrypted_api_key: "bm90LXJlYWxseS1lbmNyeXB0ZWQ=".to_string(),
            config: HashMap::from([("vault_path".to_string(), "secret/x".to_string())]),
            quota_daily: DEFAULT_QUOTA_DAILY,
            quota_monthly: DEFAULT_QUOTA_MONTHLY,
            cost_per_1k_tokens: 0.01,
            status: ModelStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn usage(model_id: Uuid, tokens: i64, status: UsageStatus, at: DateTime<Utc>) -> UsageRecord {
        UsageRecord {
            id: Uuid::new_v4(),
            model_id,
            user_id: Some("user-1".to_string()),
            session_id: None,
            prompt_hash: "0".repeat(64),
            tokens_used: tokens,
            cost: tokens as f64 * 0.01 / 1000.0,
            latency_ms: 120,
            status,
            error_message: (status != UsageStatus::Success).then(|| "failed".to_string()),
            created_at: at,
        }
    }
}

/// Factory for completion requests
pub struct RequestFactory;

impl RequestFactory {
    /// Deterministic single-turn request, eligible for caching
    pub fn deterministic(model: &str, prompt: &str) -> CompletionRequest {
        CompletionRequest::new(model, vec![Message::user(prompt)])
            .with_temperature(0.0)
            .with_max_tokens(64)
    }
}
