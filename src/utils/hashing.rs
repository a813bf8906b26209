//! Content fingerprints

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of the input
pub fn sha256_hex(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    hex::encode(hasher.finalize())
}
