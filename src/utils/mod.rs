//! Utility modules for the gateway
//!
//! - **error**: crate-wide error type and result codes
//! - **logging**: tracing subscriber setup and secret masking
//! - **hashing**: content fingerprints

pub mod error;
pub mod hashing;
pub mod logging;

use uuid::Uuid;

/// Generate a unique request ID
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}
