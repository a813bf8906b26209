//! Helper functions for creating specific error types

use super::types::GatewayError;

/// Helper functions for creating specific errors
impl GatewayError {
    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    pub fn quota_exceeded<S: Into<String>>(message: S) -> Self {
        Self::QuotaExceeded(message.into())
    }

    pub fn unauthorized<S: Into<String>>(message: S) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn invalid_ciphertext<S: Into<String>>(message: S) -> Self {
        Self::InvalidCiphertext(message.into())
    }

    pub fn provider<S: Into<String>>(message: S) -> Self {
        Self::Provider(message.into())
    }

    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    pub fn cancelled<S: Into<String>>(message: S) -> Self {
        Self::Cancelled(message.into())
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Combine a primary and a fallback failure into one error
    pub fn fallback_failed(primary: GatewayError, fallback: GatewayError) -> Self {
        Self::FallbackFailed {
            primary: Box::new(primary),
            fallback: Box::new(fallback),
        }
    }

    /// Whether the error came from an open breaker rather than a provider call
    pub fn is_breaker_open(&self) -> bool {
        matches!(self, Self::BreakerOpen(_))
    }

    /// Whether the error is a deadline expiry
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::HttpClient(e) => e.is_timeout(),
            Self::FallbackFailed { primary, fallback } => {
                primary.is_timeout() && fallback.is_timeout()
            }
            _ => false,
        }
    }
}
