//! Traits at the seams between the pipeline and its collaborators

pub mod provider;
pub mod source;

pub use provider::{LLMProvider, ProviderInfo, StreamCallback};
pub use source::{ModelChangeListener, ModelConfigSource};
