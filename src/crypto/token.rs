use rand::RngCore;
use rand::rngs::OsRng;
use base64::{Engine as _, engine::general_purpose};

/// The size of a session token in bytes.
const SESSION_TOKEN_SIZE: usize = 32;
/// The length of an encoded session id.
pub const SESSION_ID_LEN: usize = 43;
/// Characters of a session id kept in log lines.
const REDACTED_LEN: usize = 8;

/// Generates a new random session id.
///
/// # Returns
///
/// A URL-safe base64-encoded token carrying 256 bits of OS randomness.
pub fn generate_session_id() -> String {
    let mut token = [0u8; SESSION_TOKEN_SIZE];
    OsRng.fill_bytes(&mut token);

    general_purpose::URL_SAFE_NO_PAD.encode(token)
}

/// Shortens a session id for log lines.
///
/// Ids arrive from clients, so the cut is made on a character boundary.
pub fn redact(session_id: &str) -> &str {
    match session_id.char_indices().nth(REDACTED_LEN) {
        Some((end, _)) => &session_id[..end],
        None => session_id,
    }
}
