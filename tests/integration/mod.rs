//! Integration tests for llmgate
//!
//! These tests verify the interaction between multiple components
//! against real storage and mocked HTTP upstreams.

pub mod config_tests;
pub mod database_tests;
pub mod gateway_tests;
pub mod secret_store_tests;
