use aes_gcm::aead::{OsRng, rand_core::RngCore};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};
use crate::error::{AppError, Result};

/// The size of the AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;

const FINGERPRINT_CONTEXT: &str = "facegate 2026-01 deployment key fingerprint";

/// The deployment key that seals every template.
///
/// Built once at startup from `Config` and shared read-only; it is never
/// rotated while the process runs.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DeploymentKey([u8; KEY_SIZE]);

impl DeploymentKey {
    /// Creates a new `DeploymentKey` from a byte array.
    pub fn new(key: [u8; KEY_SIZE]) -> Self {
        Self(key)
    }

    /// Creates a `DeploymentKey` from a byte slice of exactly `KEY_SIZE` bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let key: [u8; KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| AppError::Crypto("Invalid deployment key size".to_string()))?;
        Ok(Self(key))
    }

    /// Returns a reference to the key as a byte array.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// A one-way fingerprint of the key, safe to persist and log.
    pub fn fingerprint(&self) -> [u8; 32] {
        blake3::derive_key(FINGERPRINT_CONTEXT, &self.0)
    }

    /// Compares a stored fingerprint against this key in constant time.
    pub fn matches_fingerprint(&self, stored: &[u8]) -> bool {
        let ours = self.fingerprint();
        stored.len() == ours.len() && bool::from(ours[..].ct_eq(stored))
    }
}

impl std::fmt::Debug for DeploymentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DeploymentKey(..)")
    }
}

/// Generates a new random AES-256 deployment key.
pub fn generate_key() -> DeploymentKey {
    let mut key = [0u8; KEY_SIZE];
    OsRng.fill_bytes(&mut key);
    DeploymentKey::new(key)
}
