use crate::crypto::{aes, key::DeploymentKey};
use crate::error::{AppError, Result};
use crate::models::template::Embedding;

fn encoding() -> bincode::config::Configuration {
    bincode::config::standard()
}

/// Serializes an embedding to its canonical byte form and seals it.
pub fn encrypt(vector: &[f32], key: &DeploymentKey) -> Result<Vec<u8>> {
    let plaintext = bincode::serde::encode_to_vec(vector, encoding())
        .map_err(|e| AppError::Crypto(format!("Vector encoding failed: {}", e)))?;

    aes::seal(key, &plaintext)
}

/// Opens a sealed embedding and decodes it.
///
/// Trailing bytes after the encoded vector are treated as corruption.
pub fn decrypt(ciphertext: &[u8], key: &DeploymentKey) -> Result<Embedding> {
    let plaintext = aes::open(key, ciphertext)?;

    let (vector, consumed): (Embedding, usize) =
        bincode::serde::decode_from_slice(&plaintext, encoding())
            .map_err(|_| AppError::Crypto("Vector decoding failed".to_string()))?;

    if consumed != plaintext.len() {
        return Err(AppError::Crypto("Trailing bytes after vector".to_string()));
    }

    Ok(vector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::key::generate_key;

    #[test]
    fn round_trip_preserves_every_component() {
        let key = generate_key();
        let vector = vec![0.25f32, -1.5, 3.0e-7, f32::MAX, -0.0];

        let sealed = encrypt(&vector, &key).unwrap();
        let opened = decrypt(&sealed, &key).unwrap();

        assert_eq!(opened.len(), vector.len());
        for (a, b) in opened.iter().zip(&vector) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn wrong_key_fails_closed() {
        let k1 = generate_key();
        let k2 = generate_key();
        let sealed = encrypt(&[1.0, 2.0, 3.0], &k1).unwrap();

        assert!(matches!(decrypt(&sealed, &k2), Err(AppError::Crypto(_))));
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let key = generate_key();
        let mut sealed = encrypt(&[1.0, 2.0, 3.0], &key).unwrap();
        let middle = sealed.len() / 2;
        sealed[middle] ^= 0xFF;

        assert!(matches!(decrypt(&sealed, &key), Err(AppError::Crypto(_))));
    }

    #[test]
    fn sealed_non_vector_is_rejected() {
        let key = generate_key();
        let sealed = aes::seal(&key, &[0xFF, 0xFF, 0xFF]).unwrap();

        assert!(matches!(decrypt(&sealed, &key), Err(AppError::Crypto(_))));
    }

    #[test]
    fn error_message_carries_no_payload() {
        let k1 = generate_key();
        let k2 = generate_key();
        let sealed = encrypt(&[42.0], &k1).unwrap();

        let message = decrypt(&sealed, &k2).unwrap_err().to_string();
        assert!(!message.contains("42"));
        assert!(!message.contains(&hex::encode(&sealed)));
    }
}
