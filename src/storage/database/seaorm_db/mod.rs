// Module declarations
mod connection;
mod model_ops;
mod types;
mod usage_ops;

// Re-export public types
pub use types::{DatabaseBackendType, SeaOrmDatabase};
