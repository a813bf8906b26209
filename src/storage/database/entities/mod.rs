/// Model configuration entity module
pub mod ai_model;
/// Usage log entity module
pub mod usage_log;

pub use ai_model::Entity as AiModel;
pub use usage_log::Entity as UsageLog;
