//! Error types for the Gateway

use thiserror::Error;

/// Result type alias for the Gateway
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Main error type for the Gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Redis errors
    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or missing request fields
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict errors
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The quota ledger denied the request
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Unauthorized errors
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Ciphertext could not be decoded or failed authentication
    #[error("Invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    /// Encryption itself failed
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Secret payload is missing a required field
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Secret store could not be read
    #[error("Vault read failed: {0}")]
    VaultReadFailed(String),

    /// Secret store has nothing at the requested path
    #[error("Vault path not found: {0}")]
    VaultPathNotFound(String),

    /// Model id or name does not resolve to a configuration
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Model exists but is not active
    #[error("Model is not active: {0}")]
    ModelInactive(String),

    /// Routing cannot match the provider type
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Fast-fail from an open circuit breaker
    #[error("Circuit breaker is open for provider: {0}")]
    BreakerOpen(String),

    /// Provider invocation failed
    #[error("Provider error: {0}")]
    Provider(String),

    /// Primary and fallback both failed
    #[error("primary error: {primary}, fallback error: {fallback}")]
    FallbackFailed {
        primary: Box<GatewayError>,
        fallback: Box<GatewayError>,
    },

    /// Cache errors
    #[error("Cache error: {0}")]
    Cache(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// The caller cancelled the request
    #[error("Request cancelled: {0}")]
    Cancelled(String),
}
