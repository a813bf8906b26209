//! Error Handling utilities
//!
//! This module provides the crate-wide error type and its mapping to result codes.

pub mod error;

pub use error::*;
