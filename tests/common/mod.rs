//! Common test utilities for llmgate
//!
//! This module provides shared test infrastructure for all tests:
//! - In-memory SQLite database support
//! - Test fixtures and data factories
//!
//! # Usage
//!
//! ```rust
//! use crate::common::{database, fixtures};
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let db = database::TestDatabase::new().await;
//!     let payload = fixtures::ModelFactory::anthropic("m1", "http://localhost");
//!     // ...
//! }
//! ```

pub mod database;
pub mod fixtures;

// Re-export commonly used items
pub use database::TestDatabase;
pub use fixtures::{ModelFactory, RequestFactory};

/// Skip test if environment variable is not set
#[macro_export]
macro_rules! skip_without_env {
    ($var:expr) => {
        if std::env::var($var).is_err() {
            eprintln!("Skipping test: {} environment variable not set", $var);
            return;
        }
    };
}

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a result is Err
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
