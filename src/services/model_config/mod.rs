//! Model configuration management
//!
//! [`ModelConfigService`] owns model configurations, their encrypted keys and usage
//! logging. [`ModelConfigApi`] exposes the same operations as coded service responses.

mod api;
mod seeding;
mod service;


pub use api::{ModelConfigApi, ServiceResponse, messages};
pub use seeding::{DEFAULT_MODELS, SeedModel, seed_default_models};
pub use service::ModelConfigService;
