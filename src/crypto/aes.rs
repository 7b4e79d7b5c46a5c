use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use aes_gcm::aead::rand_core::RngCore;
use crate::crypto::key::DeploymentKey;
use crate::error::{AppError, Result};

/// The size of the AES-GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;
/// The size of the AES-GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Generates a new random AES-GCM nonce.
pub fn generate_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Encrypts a plaintext using AES-256-GCM.
///
/// The output is sealed as `[ciphertext || tag || nonce]` with a fresh
/// 12-byte nonce at the end.
pub fn seal(key: &DeploymentKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let nonce_bytes = generate_nonce();
    let nonce = Nonce::from(nonce_bytes);

    let mut sealed = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| AppError::Crypto("Encryption failed".to_string()))?;

    sealed.extend_from_slice(&nonce_bytes);
    Ok(sealed)
}

/// Decrypts a `[ciphertext || tag || nonce]` buffer produced by [`seal`].
///
/// Fails on truncated input, a tampered buffer, or a different key.
pub fn open(key: &DeploymentKey, sealed: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < NONCE_SIZE + TAG_SIZE {
        return Err(AppError::Crypto("Ciphertext too short".to_string()));
    }

    let (ciphertext, nonce) = sealed.split_at(sealed.len() - NONCE_SIZE);
    let nonce_arr: [u8; NONCE_SIZE] = nonce
        .try_into()
        .map_err(|_| AppError::Crypto("Invalid nonce size".to_string()))?;

    let cipher = Aes256Gcm::new(key.as_bytes().into());
    cipher
        .decrypt(&Nonce::from(nonce_arr), ciphertext)
        .map_err(|_| AppError::Crypto("Decryption failed".to_string()))
}
