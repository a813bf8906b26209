//! Shared request and response types

pub mod completion;

pub use completion::{
    CompletionRequest, CompletionResponse, Message, MessageRole, StreamChunk, Usage,
};
