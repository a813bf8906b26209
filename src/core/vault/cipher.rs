//! AES-256-GCM encryption of API keys at rest

use crate::utils::error::{GatewayError, Result};
use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit},
};
use base64::{Engine as _, engine::general_purpose};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;

/// AES-256-GCM nonce size (96 bits / 12 bytes as recommended by NIST)
const AES_GCM_NONCE_SIZE: usize = 12;

/// AES-GCM authentication tag size
const AES_GCM_TAG_SIZE: usize = 16;

/// Authenticated cipher keyed by a master secret.
///
/// The output format is base64(nonce || ciphertext || tag):
/// - nonce: 12 bytes, freshly random for every encryption
/// - ciphertext: same length as the plaintext
/// - tag: 16 bytes
#[derive(Clone)]
pub struct KeyCipher {
    cipher: Aes256Gcm,
}

impl KeyCipher {
    /// Build a cipher from a master secret of any length.
    ///
    /// The secret is hashed with SHA-256 to obtain the 256-bit key.
    pub fn new(master_secret: &[u8]) -> Self {
        let derived_key = derive_key(master_secret);
        let cipher_key = Key::<Aes256Gcm>::from_slice(&derived_key);
        Self {
            cipher: Aes256Gcm::new(cipher_key),
        }
    }

    /// Encrypt a plaintext string
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let mut nonce_bytes = [0u8; AES_GCM_NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| GatewayError::Crypto(format!("Encryption failed: {}", e)))?;

        let mut output = Vec::with_capacity(AES_GCM_NONCE_SIZE + ciphertext.len());
        output.extend_from_slice(&nonce_bytes);
        output.extend_from_slice(&ciphertext);

        Ok(general_purpose::STANDARD.encode(&output))
    }

    /// Decrypt a value produced by [`KeyCipher::encrypt`].
    ///
    /// Fails with `InvalidCiphertext` on malformed input, truncation, a wrong key or tampering.
    pub fn decrypt(&self, encoded: &str) -> Result<String> {
        let encrypted_bytes = general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| GatewayError::invalid_ciphertext(format!("not valid base64: {}", e)))?;

        if encrypted_bytes.len() < AES_GCM_NONCE_SIZE + AES_GCM_TAG_SIZE {
            return Err(GatewayError::invalid_ciphertext("ciphertext too short"));
        }

        let (nonce_bytes, ciphertext) = encrypted_bytes.split_at(AES_GCM_NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| GatewayError::invalid_ciphertext("authentication failed"))?;

        String::from_utf8(plaintext)
            .map_err(|_| GatewayError::invalid_ciphertext("plaintext is not valid UTF-8"))
    }
}

impl fmt::Debug for KeyCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyCipher { .. }")
    }
}

/// Derive a 256-bit key from arbitrary-length input using SHA-256
fn derive_key(key: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(key);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Round Trip Tests ====================

    #[test]
    fn test_encrypt_decrypt() {
        let cipher = KeyCipher::new(b"my_secret_encryption_key_123456");
        let plaintext = "sk-ant-REDACTED";

        let encrypted = cipher.encrypt(plaintext).unwrap();
        assert_ne!(encrypted, plaintext);
        assert!(!encrypted.contains(plaintext));

        assert_eq!(cipher.decrypt(&encrypted).unwrap(), plaintext);
    }

    #[test]
    fn test_round_trip_edge_plaintexts() {
        let cipher = KeyCipher::new(b"k");
        for plaintext in ["", "a", "ключ-🔑", &"x".repeat(4096)] {
            let encrypted = cipher.encrypt(plaintext).unwrap();
            assert_eq!(cipher.decrypt(&encrypted).unwrap(), plaintext);
        }
    }

    #[test]
    fn test_any_length_master_secret() {
        for secret in [&b""[..], b"short", &[7u8; 200][..]] {
            let cipher = KeyCipher::new(secret);
            let encrypted = cipher.encrypt("value").unwrap();
            assert_eq!(cipher.decrypt(&encrypted).unwrap(), "value");
        }
    }

    #[test]
    fn test_fresh_nonce_per_encryption() {
        let cipher = KeyCipher::new(b"test_key_for_nonce_uniqueness!!");
        let first = cipher.encrypt("same message").unwrap();
        let second = cipher.encrypt("same message").unwrap();
        assert_ne!(first, second);
    }

    // ==================== Failure Tests ====================

    #[test]
    fn test_wrong_key_rejected() {
        let encrypted = KeyCipher::new(b"correct").encrypt("secret").unwrap();
        let result = KeyCipher::new(b"wrong").decrypt(&encrypted);
        assert!(matches!(result, Err(GatewayError::InvalidCiphertext(_))));
    }

    #[test]
    fn test_tampered_data_rejected() {
        let cipher = KeyCipher::new(b"key_for_tamper_test");
        let encrypted = cipher.encrypt("important").unwrap();
        let mut bytes = general_purpose::STANDARD.decode(&encrypted).unwrap();

        for index in [0, AES_GCM_NONCE_SIZE, bytes.len() - 1] {
            let original = bytes[index];
            bytes[index] ^= 0x01;
            let tampered = general_purpose::STANDARD.encode(&bytes);
            assert!(matches!(
                cipher.decrypt(&tampered),
                Err(GatewayError::InvalidCiphertext(_))
            ));
            bytes[index] = original;
        }
    }

    #[test]
    fn test_truncated_data_rejected() {
        let cipher = KeyCipher::new(b"test_key");
        let encrypted = cipher.encrypt("payload").unwrap();
        let bytes = general_purpose::STANDARD.decode(&encrypted).unwrap();

        for len in [0, 5, AES_GCM_NONCE_SIZE, AES_GCM_NONCE_SIZE + 15, bytes.len() - 1] {
            let truncated = general_purpose::STANDARD.encode(&bytes[..len]);
            assert!(matches!(
                cipher.decrypt(&truncated),
                Err(GatewayError::InvalidCiphertext(_))
            ));
        }
    }

    #[test]
    fn test_non_base64_rejected() {
        let cipher = KeyCipher::new(b"test_key");
        assert!(matches!(
            cipher.decrypt("not base64 at all!"),
            Err(GatewayError::InvalidCiphertext(_))
        ));
    }
}
