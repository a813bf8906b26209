use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::models::{UsageRecord, UsageStatus};

/// Usage log database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ai_usage_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Model the usage was recorded against
    pub model_id: Uuid,

    pub user_id: Option<String>,

    pub session_id: Option<String>,

    /// SHA-256 fingerprint of the prompt
    pub prompt_hash: String,

    pub tokens_used: i64,

    /// Cost at the model's price when recorded
    #[sea_orm(column_type = "Double")]
    pub cost: f64,

    pub latency_ms: i64,

    /// success, error or timeout
    pub status: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,

    pub created_at: DateTimeUtc,
}

/// Usage log entity relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert to the domain record
    pub fn to_domain_record(self) -> UsageRecord {
        UsageRecord {
            id: self.id,
            model_id: self.model_id,
            user_id: self.user_id,
            session_id: self.session_id,
            prompt_hash: self.prompt_hash,
            tokens_used: self.tokens_used,
            cost: self.cost,
            latency_ms: self.latency_ms,
            status: self.status.parse().unwrap_or(UsageStatus::Error),
            error_message: self.error_message,
            created_at: self.created_at,
        }
    }

    /// Build an active model from the domain record
    pub fn from_domain_record(record: &UsageRecord) -> ActiveModel {
        ActiveModel {
            id: Set(record.id),
            model_id: Set(record.model_id),
            user_id: Set(record.user_id.clone()),
            session_id: Set(record.session_id.clone()),
            prompt_hash: Set(record.prompt_hash.clone()),
            tokens_used: Set(record.tokens_used),
            cost: Set(record.cost),
            latency_ms: Set(record.latency_ms),
            status: Set(record.status.as_str().to_string()),
            error_message: Set(record.error_message.clone()),
            created_at: Set(record.created_at),
        }
    }
}
