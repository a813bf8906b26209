//! Services module
//!
//! Business logic owning model configuration and credentials

pub mod model_config;

pub use model_config::{ModelConfigApi, ModelConfigService, ServiceResponse, seed_default_models};
