//! Domain models shared by the configuration service and the request pipeline

pub mod credentials;
pub mod model;
pub mod quota;
pub mod usage;

pub use credentials::Credentials;
pub use model::{
    CONFIG_API_KEYS_PATH, CONFIG_VAULT_PATH, CreateModelPayload, DEFAULT_QUOTA_DAILY, DEFAULT_QUOTA_MONTHLY,
    ModelConfig, ModelFilter, ModelStatus, UpdateModelPayload,
};
pub use quota::QuotaStatus;
pub use usage::{LogUsagePayload, UsageRecord, UsageStatus};
