//! Default model bootstrap

use tracing::{error, info};

use super::service::ModelConfigService;
use crate::core::models::CreateModelPayload;
use crate::utils::error::{GatewayError, Result};

/// A model created at bootstrap
#[derive(Debug, Clone, Copy)]
pub struct SeedModel {
    pub name: &'static str,
    pub provider: &'static str,
    pub base_url: &'static str,
    pub cost_per_1k_tokens: f64,
}

const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Placeholder key stored for seeded models until a real one is configured
const PLACEHOLDER_API_KEY: &str = "DUMMY_KEY";

pub const DEFAULT_MODELS: [SeedModel; 4] = [
    SeedModel {
        name: "claude-haiku-4-5-20251001",
        provider: "anthropic",
        base_url: ANTHROPIC_BASE_URL,
        cost_per_1k_tokens: 0.00025,
    },
    SeedModel {
        name: "claude-sonnet-4-5-20250929",
        provider: "anthropic",
        base_url: ANTHROPIC_BASE_URL,
        cost_per_1k_tokens: 0.003,
    },
    SeedModel {
        name: "claude-opus-4-5-20251101",
        provider: "anthropic",
        base_url: ANTHROPIC_BASE_URL,
        cost_per_1k_tokens: 0.015,
    },
    SeedModel {
        name: "claude-3-opus-20240229",
        provider: "anthropic",
        base_url: ANTHROPIC_BASE_URL,
        cost_per_1k_tokens: 0.015,
    },
];

/// Create the default models that do not exist yet.
///
/// Existing models are left untouched. Returns the number of models created.
pub async fn seed_default_models(service: &ModelConfigService) -> Result<usize> {
    let mut created = 0;

    for seed in DEFAULT_MODELS {
        match service.get_model(seed.name).await {
            Ok(_) => continue,
            Err(GatewayError::ModelNotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let payload = CreateModelPayload {
            name: seed.name.to_string(),
            provider: seed.provider.to_string(),
            model_id: seed.name.to_string(),
            base_url: seed.base_url.to_string(),
            api_key: PLACEHOLDER_API_KEY.to_string(),
            cost_per_1k_tokens: seed.cost_per_1k_tokens,
            ..Default::default()
        };

        match service.create_model(payload).await {
            Ok(_) => {
                info!("Seeded model {}", seed.name);
                created += 1;
            }
            Err(e) => error!("Failed to seed model {}: {}", seed.name, e),
        }
    }

    Ok(created)
}
