//! Usage ledger records

use crate::utils::error::GatewayError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Outcome of a completion attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageStatus {
    Success,
    Error,
    Timeout,
}

impl UsageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageStatus::Success => "success",
            UsageStatus::Error => "error",
            UsageStatus::Timeout => "timeout",
        }
    }
}

impl fmt::Display for UsageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UsageStatus {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "success" => Ok(UsageStatus::Success),
            "error" => Ok(UsageStatus::Error),
            "timeout" => Ok(UsageStatus::Timeout),
            other => Err(GatewayError::bad_request(format!(
                "invalid usage status: {}",
                other
            ))),
        }
    }
}

/// One immutable ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub id: Uuid,
    pub model_id: Uuid,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    /// SHA-256 hex of the prompt, never the prompt itself
    pub prompt_hash: String,
    pub tokens_used: i64,
    pub cost: f64,
    pub latency_ms: i64,
    pub status: UsageStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for appending a usage record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogUsagePayload {
    /// Model id or name
    pub model_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub prompt_hash: String,
    pub tokens_used: i64,
    #[serde(default)]
    pub latency_ms: i64,
    pub status: UsageStatus,
    #[serde(default)]
    pub error_message: Option<String>,
    /// Event time; defaults to now
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl LogUsagePayload {
    pub fn success(model_id: impl Into<String>, tokens_used: i64) -> Self {
        Self {
            model_id: model_id.into(),
            user_id: None,
            session_id: None,
            prompt_hash: String::new(),
            tokens_used,
            latency_ms: 0,
            status: UsageStatus::Success,
            error_message: None,
            created_at: None,
        }
    }

    pub fn failure(
        model_id: impl Into<String>,
        status: UsageStatus,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            error_message: Some(error_message.into()),
            ..Self::success(model_id, 0)
        }
    }

    pub fn with_latency_ms(mut self, latency_ms: i64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_prompt_hash(mut self, prompt_hash: impl Into<String>) -> Self {
        self.prompt_hash = prompt_hash.into();
        self
    }

    pub fn with_caller(mut self, user_id: Option<String>, session_id: Option<String>) -> Self {
        self.user_id = user_id;
        self.session_id = session_id;
        self
    }

    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}
