//! Deterministic cache keys for completion requests

use sha2::{Digest, Sha256};

use crate::core::types::CompletionRequest;

/// Prefix of every completion cache key
pub const CACHE_KEY_PREFIX: &str = "cache:completion:";

/// Whether a request may be served from or written to the cache.
///
/// Only temperature 0 is treated as deterministic.
pub fn is_cacheable(request: &CompletionRequest) -> bool {
    request.temperature == 0.0
}

/// Cache key for `request` against the resolved model `model_id`.
///
/// Covers every message role and content in order, temperature, max tokens, top-p and
/// stop sequences. Variable-length fields are length-prefixed so distinct inputs never
/// concatenate to the same byte stream.
pub fn cache_key(model_id: &str, request: &CompletionRequest) -> String {
    let mut hasher = Sha256::new();

    write_field(&mut hasher, model_id.as_bytes());
    hasher.update((request.messages.len() as u64).to_be_bytes());
    for message in &request.messages {
        write_field(&mut hasher, message.role.as_str().as_bytes());
        write_field(&mut hasher, message.content.as_bytes());
    }

    // -0.0 and 0.0 are the same temperature
    let temperature = if request.temperature == 0.0 {
        0.0f32
    } else {
        request.temperature
    };
    hasher.update(temperature.to_bits().to_be_bytes());
    hasher.update(request.max_tokens.to_be_bytes());
    match request.top_p {
        Some(top_p) => {
            hasher.update([1u8]);
            hasher.update(top_p.to_bits().to_be_bytes());
        }
        None => hasher.update([0u8]),
    }

    hasher.update((request.stop_sequences.len() as u64).to_be_bytes());
    for stop in &request.stop_sequences {
        write_field(&mut hasher, stop.as_bytes());
    }

    format!("{}{}", CACHE_KEY_PREFIX, hex::encode(hasher.finalize()))
}

fn write_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}
