//! Structured result codes for errors
//!
//! Every error surfaced to a caller is reduced to a [`ResultCode`] and a stable,
//! kind-derived message. Library error text is never forwarded verbatim.

use super::types::GatewayError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result code carried by every service and completion response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultCode {
    Success,
    BadRequest,
    NotFound,
    Conflict,
    RateLimited,
    Unauthorized,
    Internal,
    Unavailable,
}

impl ResultCode {
    /// Numeric status in the HTTP status space
    pub fn status(&self) -> u16 {
        match self {
            ResultCode::Success => 200,
            ResultCode::BadRequest => 400,
            ResultCode::Unauthorized => 401,
            ResultCode::NotFound => 404,
            ResultCode::Conflict => 409,
            ResultCode::RateLimited => 429,
            ResultCode::Internal => 500,
            ResultCode::Unavailable => 503,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResultCode::Success)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResultCode::Success => "SUCCESS",
            ResultCode::BadRequest => "BAD_REQUEST",
            ResultCode::NotFound => "NOT_FOUND",
            ResultCode::Conflict => "CONFLICT",
            ResultCode::RateLimited => "RATE_LIMITED",
            ResultCode::Unauthorized => "UNAUTHORIZED",
            ResultCode::Internal => "INTERNAL",
            ResultCode::Unavailable => "UNAVAILABLE",
        };
        f.write_str(s)
    }
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: ResultCode,
    pub error_code: String,
    pub message: String,
}

impl GatewayError {
    /// Map the error to its result code, error code and client-safe message
    fn classify(&self) -> (ResultCode, &'static str, String) {
        match self {
            GatewayError::BadRequest(_) => (ResultCode::BadRequest, "BAD_REQUEST", self.to_string()),
            GatewayError::NotFound(_) => (ResultCode::NotFound, "NOT_FOUND", self.to_string()),
            GatewayError::Conflict(_) => (ResultCode::Conflict, "CONFLICT", self.to_string()),
            GatewayError::QuotaExceeded(model) => (
                ResultCode::RateLimited,
                "QUOTA_EXCEEDED",
                format!("quota exceeded for model: {}", model),
            ),
            GatewayError::Unauthorized(_) => {
                (ResultCode::Unauthorized, "UNAUTHORIZED", self.to_string())
            }
            GatewayError::VaultPathNotFound(path) => (
                ResultCode::NotFound,
                "VAULT_PATH_NOT_FOUND",
                format!("vault path not found: {}", path),
            ),
            GatewayError::ModelNotFound(_) => (
                ResultCode::NotFound,
                "MODEL_NOT_FOUND",
                "model not found".to_string(),
            ),
            GatewayError::ModelInactive(_) => (
                ResultCode::BadRequest,
                "MODEL_INACTIVE",
                "model is not active".to_string(),
            ),
            GatewayError::UnsupportedProvider(provider) => (
                ResultCode::BadRequest,
                "UNSUPPORTED_PROVIDER",
                format!("unsupported provider: {}", provider),
            ),
            GatewayError::BreakerOpen(_) => (
                ResultCode::Unavailable,
                "CIRCUIT_BREAKER_OPEN",
                "provider temporarily unavailable".to_string(),
            ),
            GatewayError::FallbackFailed { primary, fallback } => {
                let code = if primary.is_breaker_open() && fallback.is_breaker_open() {
                    ResultCode::Unavailable
                } else {
                    ResultCode::Internal
                };
                (
                    code,
                    "FALLBACK_FAILED",
                    format!(
                        "primary error: {}, fallback error: {}",
                        primary.public_message(),
                        fallback.public_message()
                    ),
                )
            }
            GatewayError::Timeout(_) => (
                ResultCode::Unavailable,
                "TIMEOUT",
                "request timed out".to_string(),
            ),
            GatewayError::Cancelled(_) => (
                ResultCode::Unavailable,
                "CANCELLED",
                "request cancelled".to_string(),
            ),
            GatewayError::InvalidCredentials(_) => (
                ResultCode::Internal,
                "INVALID_CREDENTIALS",
                "invalid credentials from vault".to_string(),
            ),
            GatewayError::VaultReadFailed(_) => (
                ResultCode::Internal,
                "VAULT_READ_FAILED",
                "failed to read from vault".to_string(),
            ),
            GatewayError::InvalidCiphertext(_) | GatewayError::Crypto(_) => (
                ResultCode::Internal,
                "CRYPTO_ERROR",
                "credential decryption failed".to_string(),
            ),
            GatewayError::Provider(_) | GatewayError::HttpClient(_) => (
                ResultCode::Internal,
                "PROVIDER_ERROR",
                "provider request failed".to_string(),
            ),
            GatewayError::Database(_) => (
                ResultCode::Internal,
                "DATABASE_ERROR",
                "database operation failed".to_string(),
            ),
            #[cfg(feature = "redis")]
            GatewayError::Redis(_) => (
                ResultCode::Internal,
                "CACHE_ERROR",
                "cache operation failed".to_string(),
            ),
            GatewayError::Cache(_) => (
                ResultCode::Internal,
                "CACHE_ERROR",
                "cache operation failed".to_string(),
            ),
            GatewayError::Config(_) => (
                ResultCode::Internal,
                "CONFIG_ERROR",
                "gateway misconfigured".to_string(),
            ),
            GatewayError::Serialization(_) | GatewayError::Yaml(_) => (
                ResultCode::Internal,
                "SERIALIZATION_ERROR",
                "serialization failed".to_string(),
            ),
            GatewayError::Io(_) | GatewayError::Internal(_) => (
                ResultCode::Internal,
                "INTERNAL_ERROR",
                "internal error".to_string(),
            ),
        }
    }

    /// Result code for this error
    pub fn result_code(&self) -> ResultCode {
        self.classify().0
    }

    /// Stable, client-safe message for this error
    pub fn public_message(&self) -> String {
        self.classify().2
    }

    /// Build the structured response body
    pub fn to_response(&self) -> ErrorResponse {
        let (code, error_code, message) = self.classify();
        ErrorResponse {
            code,
            error_code: error_code.to_string(),
            message,
        }
    }
}
