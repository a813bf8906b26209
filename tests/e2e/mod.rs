//! End-to-end tests for llmgate
//!
//! These tests verify complete request flows against real providers.
//! Run with: cargo test --all-features -- --ignored
//!
//! Required environment variables:
//! - ANTHROPIC_API_KEY: For Anthropic tests

pub mod anthropic;
