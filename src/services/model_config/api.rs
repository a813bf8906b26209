//! Coded service responses over [`ModelConfigService`]

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use super::service::ModelConfigService;
use crate::core::models::{
    CreateModelPayload, Credentials, LogUsagePayload, ModelConfig, ModelFilter, QuotaStatus,
    UpdateModelPayload,
};
use crate::utils::error::{GatewayError, Result, ResultCode};

/// Success messages returned with each operation
pub mod messages {
    pub const MODEL_CREATED: &str = "model created successfully";
    pub const MODEL_UPDATED: &str = "model updated successfully";
    pub const MODEL_DELETED: &str = "model deleted successfully";
    pub const MODEL_RETRIEVED: &str = "model retrieved successfully";
    pub const MODELS_LISTED: &str = "models listed successfully";
    pub const CREDENTIALS_RETRIEVED: &str = "credentials retrieved successfully";
    pub const USAGE_LOGGED: &str = "usage logged successfully";
    pub const QUOTA_CHECKED: &str = "quota checked successfully";
}

/// Uniform response envelope: result code, message and optional payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    pub code: ResultCode,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ServiceResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            code: ResultCode::Success,
            message: message.to_string(),
            data: Some(data),
        }
    }

    /// Failure envelope with the error's stable public message
    pub fn failure(error: &GatewayError) -> Self {
        Self {
            code: error.result_code(),
            message: error.public_message(),
            data: None,
        }
    }

    fn from_result(result: Result<T>, message: &str) -> Self {
        match result {
            Ok(data) => Self::success(message, data),
            Err(e) => {
                if e.result_code() == ResultCode::Internal {
                    warn!("Model config operation failed: {}", e);
                }
                Self::failure(&e)
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }
}

/// A page of models with the total match count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPage {
    pub models: Vec<ModelConfig>,
    pub total: u64,
}

/// Service-response API for model configuration.
///
/// Models leave this layer with their encrypted key blanked.
#[derive(Debug, Clone)]
pub struct ModelConfigApi {
    service: Arc<ModelConfigService>,
}

impl ModelConfigApi {
    pub fn new(service: Arc<ModelConfigService>) -> Self {
        Self { service }
    }

    pub async fn create_model(&self, payload: CreateModelPayload) -> ServiceResponse<ModelConfig> {
        let result = self.service.create_model(payload).await.map(redact);
        ServiceResponse::from_result(result, messages::MODEL_CREATED)
    }

    pub async fn get_model(&self, id: &str) -> ServiceResponse<ModelConfig> {
        let result = self.service.get_model(id).await.map(redact);
        ServiceResponse::from_result(result, messages::MODEL_RETRIEVED)
    }

    pub async fn list_models(&self, filter: ModelFilter) -> ServiceResponse<ModelPage> {
        let result = self
            .service
            .list_models(filter)
            .await
            .map(|(models, total)| ModelPage {
                models: models.into_iter().map(redact).collect(),
                total,
            });
        ServiceResponse::from_result(result, messages::MODELS_LISTED)
    }

    pub async fn update_model(&self, payload: UpdateModelPayload) -> ServiceResponse<ModelConfig> {
        let result = self.service.update_model(payload).await.map(redact);
        ServiceResponse::from_result(result, messages::MODEL_UPDATED)
    }

    pub async fn delete_model(&self, id: &str) -> ServiceResponse<()> {
        let result = self.service.delete_model(id).await;
        ServiceResponse::from_result(result, messages::MODEL_DELETED)
    }

    pub async fn get_credentials(&self, model_id: &str) -> ServiceResponse<Credentials> {
        let result = self.service.get_credentials(model_id).await;
        ServiceResponse::from_result(result, messages::CREDENTIALS_RETRIEVED)
    }

    pub async fn check_quota(&self, model_id: &str) -> ServiceResponse<QuotaStatus> {
        let result = self.service.check_quota(model_id).await;
        ServiceResponse::from_result(result, messages::QUOTA_CHECKED)
    }

    pub async fn log_usage(&self, payload: LogUsagePayload) -> ServiceResponse<()> {
        let result = self.service.log_usage(payload).await.map(|_| ());
        ServiceResponse::from_result(result, messages::USAGE_LOGGED)
    }
}

fn redact(mut model: ModelConfig) -> ModelConfig {
    model.encrypted_api_key.clear();
    model
}
