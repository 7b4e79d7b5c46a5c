use crate::crypto::token::SESSION_ID_LEN;
use crate::error::{AppError, Result};

/// Validates a session id taken from a path segment.
///
/// Issued ids are unpadded URL-safe base64, so anything else cannot name a
/// session and is rejected before it reaches the store.
pub fn validate_session_id(session_id: &str) -> Result<()> {
    if session_id.len() != SESSION_ID_LEN
        || !session_id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return Err(AppError::Validation("Malformed session id".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::token::generate_session_id;

    #[test]
    fn issued_ids_are_accepted() {
        for _ in 0..32 {
            assert!(validate_session_id(&generate_session_id()).is_ok());
        }
    }

    #[test]
    fn malformed_ids_are_rejected() {
        assert!(validate_session_id("").is_err());
        assert!(validate_session_id("never-issued").is_err());
        assert!(validate_session_id(&"a".repeat(SESSION_ID_LEN + 1)).is_err());
        assert!(validate_session_id(&format!("{}=", "a".repeat(SESSION_ID_LEN - 1))).is_err());
        assert!(validate_session_id("aéééé").is_err());
    }
}
