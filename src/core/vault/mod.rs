//! Credential custody
//!
//! Provider API keys are encrypted at rest with AES-256-GCM and decrypted credentials
//! fetched from the secret store are cached for a bounded time.

pub mod cache;
pub mod cipher;
pub mod secret_store;
#[allow(clippy::module_inception)]
pub mod vault;

pub use cache::CredentialCache;
pub use cipher::KeyCipher;
pub use secret_store::{HttpSecretStore, InMemorySecretStore, SecretData, SecretStore};
pub use vault::CredentialVault;
